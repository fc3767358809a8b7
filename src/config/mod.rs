// ==========================================
// 校园碳足迹核算系统 - 配置层
// ==========================================
// 职责: 核算参数管理,支持 config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod calculator_config;
pub mod calculator_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use calculator_config::CalculatorConfig;
pub use calculator_config_trait::CalculatorConfigReader;
pub use config_manager::{config_keys, factor_key, integer_bounds, ConfigManager};
