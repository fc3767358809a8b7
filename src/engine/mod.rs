// ==========================================
// 校园碳足迹核算系统 - 引擎层
// ==========================================
// 职责: 碳足迹核算、区间汇总、年度对比
// 红线: Engine 不拼 SQL，数据经由 FootprintDataSource 读取
// ==========================================

pub mod carbon_footprint_service;
pub mod data_source;
pub mod error;
pub mod footprint_calculator;
pub mod year_comparator;

// 重导出核心引擎
pub use carbon_footprint_service::CarbonFootprintService;
pub use data_source::{FootprintDataSource, FootprintRepositories};
pub use error::{FootprintError, FootprintResult};
pub use footprint_calculator::compute;
pub use year_comparator::{change_percentage, EmissionComparison, YearComparator, YearComparison};
