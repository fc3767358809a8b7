// ==========================================
// 校园碳足迹核算系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 年度碳排放核算、区间汇总、年度对比
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 核算规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 核算参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EmissionCategory, MissingYearPolicy};

// 领域实体
pub use domain::{
    Building, CampusVehicleEntry, CarbonFootprint, ElectricMonthlyTotal, ElectricRecord,
    EmissionFactors, FactorOverrides, SchoolInfo, VehicleCounts, YearUsage,
};

// 配置
pub use config::{CalculatorConfig, CalculatorConfigReader, ConfigManager};

// 引擎
pub use engine::{
    CarbonFootprintService, EmissionComparison, FootprintDataSource, FootprintError,
    FootprintRepositories, YearComparator, YearComparison,
};

// API
pub use api::{ApiError, ApiResult, CarbonFootprintApi, ElectricityApi, SchoolInfoApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "校园碳足迹核算系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
