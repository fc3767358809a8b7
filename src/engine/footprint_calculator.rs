// ==========================================
// 校园碳足迹核算系统 - 碳足迹计算器
// ==========================================
// 职责: 单年用量 → 四类排放量（纯函数，无 I/O）
// 红线: 不拒绝负值输入，不做舍入
// ==========================================

use crate::config::CalculatorConfig;
use crate::domain::carbon_footprint::{CarbonFootprint, EmissionFactors, YearUsage};
use crate::engine::error::{FootprintError, FootprintResult};
use rust_decimal::Decimal;

const KWH_PER_MWH: i64 = 1000;
const DISTANCE_SCALE: i64 = 100;
const ROUND_TRIP: i64 = 2;

/// 计算单年碳足迹
///
/// # 公式
/// - 用电: kwh / 1000 × f_e
/// - 校车: 车辆数 × 班次 × 距离 × 工作日 / 100 × f_s
/// - 汽车/摩托车: 入校数 × 2 × 距离 × 工作日 / 100 × f
///
/// # 返回
/// - Err(Overflow): 任一中间结果超出 Decimal 表示范围
pub fn compute(
    year: i32,
    usage: &YearUsage,
    config: &CalculatorConfig,
    factors: &EmissionFactors,
) -> FootprintResult<CarbonFootprint> {
    let overflow = || FootprintError::Overflow { year };
    let work_days = Decimal::from(config.work_days_per_year);

    let electricity_emission = usage
        .total_electricity_kwh
        .checked_div(Decimal::from(KWH_PER_MWH))
        .and_then(|mwh| mwh.checked_mul(factors.electricity))
        .ok_or_else(overflow)?;

    let shuttle_bus_emission = scaled_emission(
        &[
            Decimal::from(config.shuttle_bus_count),
            Decimal::from(config.shuttle_bus_trips_per_day),
            config.shuttle_bus_distance_per_day_km,
            work_days,
        ],
        factors.shuttle_bus,
    )
    .ok_or_else(overflow)?;

    let car_emission = commute_emission(
        usage.vehicles.cars_entering,
        config.car_distance_per_day_km,
        work_days,
        factors.car,
    )
    .ok_or_else(overflow)?;

    let motorcycle_emission = commute_emission(
        usage.vehicles.motorcycles_entering,
        config.motorcycle_distance_per_day_km,
        work_days,
        factors.motorcycle,
    )
    .ok_or_else(overflow)?;

    CarbonFootprint::new(
        year,
        electricity_emission,
        shuttle_bus_emission,
        car_emission,
        motorcycle_emission,
    )
    .ok_or_else(overflow)
}

// 往返通勤
fn commute_emission(
    vehicle_count: i64,
    distance_per_day_km: Decimal,
    work_days: Decimal,
    factor: Decimal,
) -> Option<Decimal> {
    scaled_emission(
        &[
            Decimal::from(vehicle_count),
            Decimal::from(ROUND_TRIP),
            distance_per_day_km,
            work_days,
        ],
        factor,
    )
}

// 连乘 / 100 × 因子，溢出返回 None
fn scaled_emission(terms: &[Decimal], factor: Decimal) -> Option<Decimal> {
    terms
        .iter()
        .try_fold(Decimal::ONE, |acc, term| acc.checked_mul(*term))?
        .checked_div(Decimal::from(DISTANCE_SCALE))?
        .checked_mul(factor)
}
