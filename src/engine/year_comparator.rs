// ==========================================
// 校园碳足迹核算系统 - 年度对比
// ==========================================
// 职责: 当年 vs 上一年排放量差值与百分比（纯函数）
// 百分比保留两位小数，银行家舍入；上一年为 0 时百分比记 0
// ==========================================

use crate::domain::carbon_footprint::CarbonFootprint;
use crate::domain::types::EmissionCategory;
use crate::engine::error::{FootprintError, FootprintResult};
use rust_decimal::Decimal;
use serde::Serialize;

const PERCENTAGE_DP: u32 = 2;

// ==========================================
// EmissionComparison - 分项差值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmissionComparison {
    pub total_emission_change: Decimal,
    pub total_emission_change_percentage: Decimal,
    pub electricity_emission_change: Decimal,
    pub electricity_emission_change_percentage: Decimal,
    pub shuttle_bus_emission_change: Decimal,
    pub shuttle_bus_emission_change_percentage: Decimal,
    pub car_emission_change: Decimal,
    pub car_emission_change_percentage: Decimal,
    pub motorcycle_emission_change: Decimal,
    pub motorcycle_emission_change_percentage: Decimal,
    /// 当年总量严格小于上一年
    pub is_improvement: bool,
}

// ==========================================
// YearComparison - 年度对比结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearComparison {
    pub current_year: i32,
    pub previous_year: i32,
    pub current_year_data: Option<CarbonFootprint>,
    pub previous_year_data: Option<CarbonFootprint>,
    pub has_comparison: bool,
    pub comparison: Option<EmissionComparison>,
}

/// 年度对比器
pub struct YearComparator;

impl YearComparator {
    /// 组装对比结果
    ///
    /// # 参数
    /// - `current` / `previous`: 缺失的一侧为 None，此时不计算差值
    ///
    /// # 返回
    /// - Err(Overflow): 差值或百分比超出 Decimal 表示范围
    pub fn compare(
        current_year: i32,
        current: Option<CarbonFootprint>,
        previous: Option<CarbonFootprint>,
    ) -> FootprintResult<YearComparison> {
        let comparison = match (&current, &previous) {
            (Some(cur), Some(prev)) => Some(
                Self::compare_emissions(cur, prev)
                    .ok_or(FootprintError::Overflow { year: current_year })?,
            ),
            _ => None,
        };

        Ok(YearComparison {
            current_year,
            previous_year: current_year - 1,
            current_year_data: current,
            previous_year_data: previous,
            has_comparison: comparison.is_some(),
            comparison,
        })
    }

    fn compare_emissions(
        current: &CarbonFootprint,
        previous: &CarbonFootprint,
    ) -> Option<EmissionComparison> {
        let delta = |cur: Decimal, prev: Decimal| -> Option<(Decimal, Decimal)> {
            Some((cur.checked_sub(prev)?, change_percentage(cur, prev)?))
        };

        let (total_change, total_pct) = delta(current.total_emission(), previous.total_emission())?;
        let [electricity, shuttle_bus, car, motorcycle] = EmissionCategory::ALL
            .map(|category| delta(current.emission(category), previous.emission(category)));
        let (electricity, shuttle_bus, car, motorcycle) =
            (electricity?, shuttle_bus?, car?, motorcycle?);

        Some(EmissionComparison {
            total_emission_change: total_change,
            total_emission_change_percentage: total_pct,
            electricity_emission_change: electricity.0,
            electricity_emission_change_percentage: electricity.1,
            shuttle_bus_emission_change: shuttle_bus.0,
            shuttle_bus_emission_change_percentage: shuttle_bus.1,
            car_emission_change: car.0,
            car_emission_change_percentage: car.1,
            motorcycle_emission_change: motorcycle.0,
            motorcycle_emission_change_percentage: motorcycle.1,
            is_improvement: current.total_emission() < previous.total_emission(),
        })
    }
}

/// 变化百分比，溢出时返回 None
pub fn change_percentage(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return Some(Decimal::ZERO);
    }
    let pct = current
        .checked_sub(previous)?
        .checked_div(previous)?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    Some(pct.round_dp(PERCENTAGE_DP))
}
