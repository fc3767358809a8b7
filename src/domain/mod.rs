// ==========================================
// 校园碳足迹核算系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、构造校验
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod building;
pub mod carbon_footprint;
pub mod electric;
pub mod error;
pub mod school_info;
pub mod types;

// 重导出核心类型
pub use building::Building;
pub use carbon_footprint::{CarbonFootprint, EmissionFactors, FactorOverrides, YearUsage};
pub use electric::{ElectricMonthlyTotal, ElectricRecord};
pub use error::DomainError;
pub use school_info::{CampusVehicleEntry, SchoolInfo, VehicleCounts, MIN_SCHOOL_INFO_YEAR};
pub use types::{EmissionCategory, MissingYearPolicy};
