// ==========================================
// 校园碳足迹核算系统 - 电表读数领域模型
// ==========================================
// 用量 = (末读数 - 初读数) × 倍率(kWh)
// 对齐: electric_record 表（小数以 TEXT 存储）
// ==========================================

use crate::domain::error::DomainError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ElectricRecord - 楼宇月度电表读数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricRecord {
    pub electric_id: String,
    pub building_id: String,
    pub record_date: NaiveDate,
    pub initial_meter_value: Decimal,
    pub final_meter_value: Decimal,
    pub kwh_value: Decimal,
    pub usage: Decimal, // 派生字段，随读数重算
    pub created_at: DateTime<Utc>,
}

impl ElectricRecord {
    /// 创建电表读数
    ///
    /// # 校验
    /// - 初读数 >= 0
    /// - 末读数 >= 初读数
    /// - 倍率 > 0
    pub fn create(
        record_date: NaiveDate,
        initial_meter_value: Decimal,
        final_meter_value: Decimal,
        kwh_value: Decimal,
        building_id: &str,
    ) -> Result<Self, DomainError> {
        validate_readings(initial_meter_value, final_meter_value, kwh_value)?;
        let usage = usage_of(initial_meter_value, final_meter_value, kwh_value)?;

        Ok(Self {
            electric_id: Uuid::new_v4().to_string(),
            building_id: building_id.to_string(),
            record_date,
            initial_meter_value,
            final_meter_value,
            kwh_value,
            usage,
            created_at: Utc::now(),
        })
    }

    /// 更新读数并重算用量
    pub fn update(
        &mut self,
        record_date: NaiveDate,
        initial_meter_value: Decimal,
        final_meter_value: Decimal,
        kwh_value: Decimal,
    ) -> Result<(), DomainError> {
        validate_readings(initial_meter_value, final_meter_value, kwh_value)?;
        let usage = usage_of(initial_meter_value, final_meter_value, kwh_value)?;

        self.record_date = record_date;
        self.initial_meter_value = initial_meter_value;
        self.final_meter_value = final_meter_value;
        self.kwh_value = kwh_value;
        self.usage = usage;
        Ok(())
    }
}

// 读数已校验为 0 <= 初 <= 末，只有乘法可能溢出
fn usage_of(
    initial_meter_value: Decimal,
    final_meter_value: Decimal,
    kwh_value: Decimal,
) -> Result<Decimal, DomainError> {
    (final_meter_value - initial_meter_value)
        .checked_mul(kwh_value)
        .ok_or_else(|| DomainError::field("usage", "用量超出可表示范围"))
}

fn validate_readings(
    initial_meter_value: Decimal,
    final_meter_value: Decimal,
    kwh_value: Decimal,
) -> Result<(), DomainError> {
    if initial_meter_value < Decimal::ZERO {
        return Err(DomainError::negative(
            "initial_meter_value",
            initial_meter_value,
        ));
    }
    if final_meter_value < initial_meter_value {
        return Err(DomainError::field(
            "final_meter_value",
            format!(
                "末读数 {} 不能小于初读数 {}",
                final_meter_value, initial_meter_value
            ),
        ));
    }
    if kwh_value <= Decimal::ZERO {
        return Err(DomainError::field(
            "kwh_value",
            format!("倍率必须为正数: {}", kwh_value),
        ));
    }
    Ok(())
}

// ==========================================
// ElectricMonthlyTotal - 月度用电汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricMonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total_kwh_value: Decimal,
    pub total_usage: Decimal,
}

impl ElectricMonthlyTotal {
    /// 月份显示格式: MM/YYYY
    pub fn formatted_month(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_usage_is_derived() {
        let rec = ElectricRecord::create(date(), d("100"), d("150.5"), d("40"), "B1").unwrap();
        assert_eq!(rec.usage, d("2020.0"));
    }

    #[test]
    fn test_reading_validation() {
        assert!(ElectricRecord::create(date(), d("-1"), d("5"), d("1"), "B1").is_err());
        assert!(ElectricRecord::create(date(), d("10"), d("5"), d("1"), "B1").is_err());
        assert!(ElectricRecord::create(date(), d("1"), d("5"), d("0"), "B1").is_err());
        assert!(ElectricRecord::create(date(), d("0"), d("0"), d("1"), "B1").is_ok());
    }

    #[test]
    fn test_update_recomputes_usage() {
        let mut rec = ElectricRecord::create(date(), d("0"), d("10"), d("2"), "B1").unwrap();
        assert_eq!(rec.usage, d("20"));
        rec.update(date(), d("5"), d("25"), d("3")).unwrap();
        assert_eq!(rec.usage, d("60"));

        // 校验失败时不修改原值
        assert!(rec.update(date(), d("30"), d("25"), d("3")).is_err());
        assert_eq!(rec.usage, d("60"));
    }

    #[test]
    fn test_usage_overflow_is_error() {
        let err = ElectricRecord::create(date(), d("0"), Decimal::MAX, d("2"), "B1").unwrap_err();
        assert!(matches!(err, DomainError::FieldValueError { ref field, .. } if field == "usage"));

        let mut rec = ElectricRecord::create(date(), d("0"), d("10"), d("2"), "B1").unwrap();
        assert!(rec.update(date(), d("0"), Decimal::MAX, d("2")).is_err());
        assert_eq!(rec.usage, d("20"));
    }

    #[test]
    fn test_formatted_month() {
        let total = ElectricMonthlyTotal {
            year: 2024,
            month: 3,
            total_kwh_value: d("1"),
            total_usage: d("2"),
        };
        assert_eq!(total.formatted_month(), "03/2024");
    }
}
