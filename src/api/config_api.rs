// ==========================================
// 校园碳足迹核算系统 - 配置管理 API
// ==========================================
// 职责: 核算参数查询、更新、快照管理
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{config_keys, factor_key, integer_bounds, ConfigManager};
use crate::config::CalculatorConfig;
use crate::domain::types::EmissionCategory;

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================

/// 配置管理API
///
/// 职责：
/// 1. 核算参数查询（生效值，含默认回退）
/// 2. 单项 / 整体更新
/// 3. 配置快照管理
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    /// 创建新的ConfigApi实例
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询当前生效的核算参数
    pub fn get_calculator_config(&self) -> ApiResult<CalculatorConfig> {
        self.config_manager
            .load_calculator_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    /// 更新单个核算参数
    ///
    /// # 参数
    /// - key: 配置键（仅接受 carbon.* 已知键）
    /// - value: 配置值（整数键须在 integer_bounds 范围内，其余须为非负小数）
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        let key = key.trim();
        let kind = value_kind(key)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知配置键: {}", key)))?;

        let valid = match kind {
            ValueKind::Integer => value
                .trim()
                .parse::<i64>()
                .map(|v| integer_in_bounds(key, v))
                .unwrap_or(false),
            ValueKind::Decimal => Decimal::from_str(value.trim())
                .map(|v| v >= Decimal::ZERO)
                .unwrap_or(false),
        };
        if !valid {
            return Err(ApiError::InvalidInput(format!(
                "配置值无效: {}={}",
                key, value
            )));
        }

        self.config_manager
            .update_config(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    /// 整体写入核算参数
    ///
    /// # 返回
    /// - Err(InvalidInput): 整数项超出范围或小数项为负
    pub fn save_calculator_config(&self, config: &CalculatorConfig) -> ApiResult<()> {
        let integers = [
            (config_keys::SHUTTLE_BUS_COUNT, config.shuttle_bus_count),
            (config_keys::SHUTTLE_BUS_TRIPS_PER_DAY, config.shuttle_bus_trips_per_day),
            (config_keys::WORK_DAYS_PER_YEAR, config.work_days_per_year),
        ];
        if let Some((key, value)) = integers.iter().find(|(k, v)| !integer_in_bounds(k, *v)) {
            return Err(ApiError::InvalidInput(format!("配置值无效: {}={}", key, value)));
        }

        let mut decimals = [
            config.shuttle_bus_distance_per_day_km,
            config.car_distance_per_day_km,
            config.motorcycle_distance_per_day_km,
        ]
        .into_iter()
        .chain(EmissionCategory::ALL.map(|c| config.default_factors.factor(c)));
        if decimals.any(|v| v < Decimal::ZERO) {
            return Err(ApiError::InvalidInput("核算参数不能为负".to_string()));
        }

        self.config_manager
            .save_calculator_config(config)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        info!("核算参数已整体更新");
        Ok(())
    }

    /// 获取配置快照
    ///
    /// # 返回
    /// - Ok(String): 配置快照JSON
    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        self.config_manager
            .get_config_snapshot()
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 从快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置数量
    pub fn restore_from_snapshot(&self, snapshot_json: &str) -> ApiResult<usize> {
        if snapshot_json.trim().is_empty() {
            return Err(ApiError::InvalidInput("快照JSON不能为空".to_string()));
        }

        let count = self
            .config_manager
            .restore_config_from_snapshot(snapshot_json)
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        info!(restored = count, "已从快照恢复配置");
        Ok(count)
    }
}

// ==========================================
// DTO 类型定义
// ==========================================

/// 配置项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    /// 配置键
    pub key: String,

    /// 配置值
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Integer,
    Decimal,
}

fn integer_in_bounds(key: &str, value: i64) -> bool {
    integer_bounds(key).map_or(false, |bounds| bounds.contains(&value))
}

fn value_kind(key: &str) -> Option<ValueKind> {
    match key {
        config_keys::SHUTTLE_BUS_COUNT
        | config_keys::SHUTTLE_BUS_TRIPS_PER_DAY
        | config_keys::WORK_DAYS_PER_YEAR => Some(ValueKind::Integer),
        config_keys::SHUTTLE_BUS_DISTANCE_PER_DAY_KM
        | config_keys::CAR_DISTANCE_PER_DAY_KM
        | config_keys::MOTORCYCLE_DISTANCE_PER_DAY_KM => Some(ValueKind::Decimal),
        _ if EmissionCategory::ALL.iter().any(|c| factor_key(*c) == key) => {
            Some(ValueKind::Decimal)
        }
        _ => None,
    }
}
