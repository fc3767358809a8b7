// ==========================================
// 校园碳足迹核算系统 - 核算参数读取 Trait
// ==========================================
// 职责: 定义核算所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::calculator_config::CalculatorConfig;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// CalculatorConfigReader Trait
// ==========================================
// 实现者:
// - ConfigManager（从 config_kv 表读取，每次请求重新读取）
// - CalculatorConfig（固定参数，测试/离线场景）
#[async_trait]
pub trait CalculatorConfigReader: Send + Sync {
    /// 获取核算参数
    ///
    /// # 默认值
    /// - 缺失或无法解析的配置项回退为 CalculatorConfig::default() 中的对应值
    async fn get_calculator_config(&self) -> Result<CalculatorConfig, Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl CalculatorConfigReader for CalculatorConfig {
    async fn get_calculator_config(&self) -> Result<CalculatorConfig, Box<dyn Error + Send + Sync>> {
        Ok(*self)
    }
}
