// ==========================================
// 校园碳足迹核算系统 - 碳足迹领域模型
// ==========================================
// 排放量 = 用量 × 排放因子，全部使用定点小数 (rust_decimal)
// 红线: 总排放量在构造时一次性计算，之后不可修改
// ==========================================

use crate::domain::school_info::VehicleCounts;
use crate::domain::types::EmissionCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// EmissionFactors - 排放因子
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionFactors {
    pub electricity: Decimal, // 每 MWh 用电
    pub shuttle_bus: Decimal,
    pub car: Decimal,
    pub motorcycle: Decimal,
}

impl EmissionFactors {
    /// 系统默认排放因子: 用电 0.84 / 校车 0.01 / 汽车 0.02 / 摩托车 0.01
    pub fn defaults() -> Self {
        Self {
            electricity: Decimal::new(84, 2),
            shuttle_bus: Decimal::new(1, 2),
            car: Decimal::new(2, 2),
            motorcycle: Decimal::new(1, 2),
        }
    }

    /// 按类别取因子
    pub fn factor(&self, category: EmissionCategory) -> Decimal {
        match category {
            EmissionCategory::Electricity => self.electricity,
            EmissionCategory::ShuttleBus => self.shuttle_bus,
            EmissionCategory::Car => self.car,
            EmissionCategory::Motorcycle => self.motorcycle,
        }
    }

    /// 按类别替换因子
    pub fn with_factor(mut self, category: EmissionCategory, value: Decimal) -> Self {
        match category {
            EmissionCategory::Electricity => self.electricity = value,
            EmissionCategory::ShuttleBus => self.shuttle_bus = value,
            EmissionCategory::Car => self.car = value,
            EmissionCategory::Motorcycle => self.motorcycle = value,
        }
        self
    }
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self::defaults()
    }
}

// ==========================================
// FactorOverrides - 调用方可选覆写的排放因子
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorOverrides {
    pub electricity: Option<Decimal>,
    pub shuttle_bus: Option<Decimal>,
    pub car: Option<Decimal>,
    pub motorcycle: Option<Decimal>,
}

impl FactorOverrides {
    /// 合并默认因子：有覆写取覆写，否则取默认
    pub fn resolve(&self, defaults: &EmissionFactors) -> EmissionFactors {
        EmissionFactors {
            electricity: self.electricity.unwrap_or(defaults.electricity),
            shuttle_bus: self.shuttle_bus.unwrap_or(defaults.shuttle_bus),
            car: self.car.unwrap_or(defaults.car),
            motorcycle: self.motorcycle.unwrap_or(defaults.motorcycle),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.electricity.is_none()
            && self.shuttle_bus.is_none()
            && self.car.is_none()
            && self.motorcycle.is_none()
    }
}

// ==========================================
// YearUsage - 单年核算输入
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YearUsage {
    pub total_electricity_kwh: Decimal, // 当年电表用量合计 (kWh)
    pub vehicles: VehicleCounts,        // 入校车辆数
}

// ==========================================
// CarbonFootprint - 年度碳足迹 (不可变值对象)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarbonFootprint {
    year: i32,
    electricity_emission: Decimal,
    shuttle_bus_emission: Decimal,
    car_emission: Decimal,
    motorcycle_emission: Decimal,
    total_emission: Decimal,
}

impl CarbonFootprint {
    /// 由四个类别排放量构造，总量在此处求和
    ///
    /// # 返回
    /// - None: 总量溢出
    pub fn new(
        year: i32,
        electricity_emission: Decimal,
        shuttle_bus_emission: Decimal,
        car_emission: Decimal,
        motorcycle_emission: Decimal,
    ) -> Option<Self> {
        let total_emission = electricity_emission
            .checked_add(shuttle_bus_emission)?
            .checked_add(car_emission)?
            .checked_add(motorcycle_emission)?;
        Some(Self {
            year,
            electricity_emission,
            shuttle_bus_emission,
            car_emission,
            motorcycle_emission,
            total_emission,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn electricity_emission(&self) -> Decimal {
        self.electricity_emission
    }

    pub fn shuttle_bus_emission(&self) -> Decimal {
        self.shuttle_bus_emission
    }

    pub fn car_emission(&self) -> Decimal {
        self.car_emission
    }

    pub fn motorcycle_emission(&self) -> Decimal {
        self.motorcycle_emission
    }

    pub fn total_emission(&self) -> Decimal {
        self.total_emission
    }

    /// 按类别取排放量
    pub fn emission(&self, category: EmissionCategory) -> Decimal {
        match category {
            EmissionCategory::Electricity => self.electricity_emission,
            EmissionCategory::ShuttleBus => self.shuttle_bus_emission,
            EmissionCategory::Car => self.car_emission,
            EmissionCategory::Motorcycle => self.motorcycle_emission,
        }
    }
}
