// ==========================================
// 校园碳足迹核算系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行/上层服务调用
// ==========================================

pub mod carbon_footprint_api;
pub mod config_api;
pub mod dto;
pub mod electricity_api;
pub mod error;
pub mod import_api;
pub mod school_info_api;

// 重导出核心类型
pub use carbon_footprint_api::CarbonFootprintApi;
pub use config_api::{ConfigApi, ConfigItem};
pub use electricity_api::ElectricityApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use school_info_api::SchoolInfoApi;
