// ==========================================
// 校园碳足迹核算系统 - 核算参数
// ==========================================
// 组织常量（校车规模/行驶距离/工作日）与默认排放因子
// 存储: config_kv 表（见 config_keys），缺省时使用 Default
// ==========================================

use crate::domain::carbon_footprint::EmissionFactors;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// CalculatorConfig - 碳足迹核算参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    // ===== 校车 =====
    pub shuttle_bus_count: i64,                // 校车数量
    pub shuttle_bus_trips_per_day: i64,        // 每日班次
    pub shuttle_bus_distance_per_day_km: Decimal, // 每日行驶距离 (km)

    // ===== 入校车辆 =====
    pub car_distance_per_day_km: Decimal,        // 汽车每日单程距离 (km)
    pub motorcycle_distance_per_day_km: Decimal, // 摩托车每日单程距离 (km)

    // ===== 通用 =====
    pub work_days_per_year: i64, // 年工作日

    /// 调用方未覆写时使用的排放因子
    pub default_factors: EmissionFactors,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            shuttle_bus_count: 8,
            shuttle_bus_trips_per_day: 5,
            shuttle_bus_distance_per_day_km: Decimal::from(5),
            car_distance_per_day_km: Decimal::new(15, 1),
            motorcycle_distance_per_day_km: Decimal::from(6),
            work_days_per_year: 261,
            default_factors: EmissionFactors::defaults(),
        }
    }
}
