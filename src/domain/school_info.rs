// ==========================================
// 校园碳足迹核算系统 - 学校信息领域模型
// ==========================================
// 学校信息按年份唯一，承载入校车辆统计
// 对齐: school_info 表（车辆统计列可空）
// ==========================================

use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 学校信息允许的最早年份
pub const MIN_SCHOOL_INFO_YEAR: i32 = 2000;

// ==========================================
// CampusVehicleEntry - 入校车辆统计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampusVehicleEntry {
    pub cars_managed_by_university: i32, // 学校自有车辆
    pub cars_entering_university: i32,   // 每日入校汽车
    pub motorcycles_entering_university: i32, // 每日入校摩托车
}

impl CampusVehicleEntry {
    /// 创建车辆统计，三个数值均不得为负
    pub fn create(
        cars_managed_by_university: i32,
        cars_entering_university: i32,
        motorcycles_entering_university: i32,
    ) -> Result<Self, DomainError> {
        check_non_negative("cars_managed_by_university", cars_managed_by_university)?;
        check_non_negative("cars_entering_university", cars_entering_university)?;
        check_non_negative(
            "motorcycles_entering_university",
            motorcycles_entering_university,
        )?;

        Ok(Self {
            cars_managed_by_university,
            cars_entering_university,
            motorcycles_entering_university,
        })
    }

    pub fn update_cars_managed_by_university(&mut self, value: i32) -> Result<(), DomainError> {
        check_non_negative("cars_managed_by_university", value)?;
        self.cars_managed_by_university = value;
        Ok(())
    }

    pub fn update_cars_entering_university(&mut self, value: i32) -> Result<(), DomainError> {
        check_non_negative("cars_entering_university", value)?;
        self.cars_entering_university = value;
        Ok(())
    }

    pub fn update_motorcycles_entering_university(
        &mut self,
        value: i32,
    ) -> Result<(), DomainError> {
        check_non_negative("motorcycles_entering_university", value)?;
        self.motorcycles_entering_university = value;
        Ok(())
    }
}

// ==========================================
// VehicleCounts - 核算用入校车辆数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VehicleCounts {
    pub cars_entering: i64,
    pub motorcycles_entering: i64,
}

impl From<&CampusVehicleEntry> for VehicleCounts {
    fn from(entry: &CampusVehicleEntry) -> Self {
        Self {
            cars_entering: i64::from(entry.cars_entering_university),
            motorcycles_entering: i64::from(entry.motorcycles_entering_university),
        }
    }
}

// ==========================================
// SchoolInfo - 年度学校信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolInfo {
    pub school_info_id: String,
    pub year: i32,
    pub number_of_people: i32,
    pub vehicles: Option<CampusVehicleEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SchoolInfo {
    /// 创建学校信息
    ///
    /// # 校验
    /// - number_of_people >= 0
    /// - year >= 2000
    pub fn create(number_of_people: i32, year: i32) -> Result<Self, DomainError> {
        check_non_negative("number_of_people", number_of_people)?;
        if year < MIN_SCHOOL_INFO_YEAR {
            return Err(DomainError::YearOutOfRange {
                year,
                min: MIN_SCHOOL_INFO_YEAR,
            });
        }

        let now = Utc::now();
        Ok(Self {
            school_info_id: Uuid::new_v4().to_string(),
            year,
            number_of_people,
            vehicles: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_number_of_people(&mut self, number_of_people: i32) -> Result<(), DomainError> {
        check_non_negative("number_of_people", number_of_people)?;
        self.number_of_people = number_of_people;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn assign_vehicle_entry(&mut self, entry: CampusVehicleEntry) {
        self.vehicles = Some(entry);
        self.updated_at = Utc::now();
    }

    /// 核算用车辆数（无车辆统计时按 0 计）
    pub fn vehicle_counts(&self) -> VehicleCounts {
        self.vehicles
            .as_ref()
            .map(VehicleCounts::from)
            .unwrap_or_default()
    }
}

fn check_non_negative(field: &str, value: i32) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::negative(field, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_school_info_validation() {
        assert!(SchoolInfo::create(1200, 2024).is_ok());
        assert_eq!(
            SchoolInfo::create(10, 1999).unwrap_err(),
            DomainError::YearOutOfRange { year: 1999, min: 2000 }
        );
        assert!(matches!(
            SchoolInfo::create(-1, 2024),
            Err(DomainError::NegativeValue { .. })
        ));
    }

    #[test]
    fn test_vehicle_entry_validation() {
        assert!(CampusVehicleEntry::create(0, 0, 0).is_ok());
        assert!(CampusVehicleEntry::create(-1, 0, 0).is_err());
        assert!(CampusVehicleEntry::create(0, -1, 0).is_err());
        assert!(CampusVehicleEntry::create(0, 0, -1).is_err());

        let mut entry = CampusVehicleEntry::create(3, 400, 120).unwrap();
        assert!(entry.update_cars_entering_university(-5).is_err());
        assert_eq!(entry.cars_entering_university, 400);
        entry.update_motorcycles_entering_university(90).unwrap();
        assert_eq!(entry.motorcycles_entering_university, 90);
    }

    #[test]
    fn test_vehicle_counts_default_to_zero() {
        let mut info = SchoolInfo::create(500, 2023).unwrap();
        assert_eq!(info.vehicle_counts(), VehicleCounts::default());

        info.assign_vehicle_entry(CampusVehicleEntry::create(2, 100, 40).unwrap());
        let counts = info.vehicle_counts();
        assert_eq!(counts.cars_entering, 100);
        assert_eq!(counts.motorcycles_entering, 40);
    }
}
