// ==========================================
// 校园碳足迹核算系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::calculator_config::CalculatorConfig;
use crate::config::calculator_config_trait::CalculatorConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::EmissionCategory;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const SHUTTLE_BUS_COUNT: &str = "carbon.shuttle_bus_count";
    pub const SHUTTLE_BUS_TRIPS_PER_DAY: &str = "carbon.shuttle_bus_trips_per_day";
    pub const SHUTTLE_BUS_DISTANCE_PER_DAY_KM: &str = "carbon.shuttle_bus_distance_per_day_km";
    pub const CAR_DISTANCE_PER_DAY_KM: &str = "carbon.car_distance_per_day_km";
    pub const MOTORCYCLE_DISTANCE_PER_DAY_KM: &str = "carbon.motorcycle_distance_per_day_km";
    pub const WORK_DAYS_PER_YEAR: &str = "carbon.work_days_per_year";

    /// 排放因子键前缀: carbon.factor.{electricity|shuttle_bus|car|motorcycle}
    pub const FACTOR_PREFIX: &str = "carbon.factor.";
}

/// 整数配置项的合法取值范围（非整数键返回 None）
///
/// - 校车数量 / 每日班次: 0..=10000
/// - 年工作日: 0..=366
pub fn integer_bounds(key: &str) -> Option<RangeInclusive<i64>> {
    match key {
        config_keys::SHUTTLE_BUS_COUNT | config_keys::SHUTTLE_BUS_TRIPS_PER_DAY => {
            Some(0..=MAX_FLEET_VALUE)
        }
        config_keys::WORK_DAYS_PER_YEAR => Some(0..=MAX_WORK_DAYS_PER_YEAR),
        _ => None,
    }
}

const MAX_FLEET_VALUE: i64 = 10_000;
const MAX_WORK_DAYS_PER_YEAR: i64 = 366;

/// 排放因子配置键
pub fn factor_key(category: EmissionCategory) -> String {
    format!("{}{}", config_keys::FACTOR_PREFIX, category.key_suffix())
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn update_config(&self, key: &str, value: &str) -> ConfigResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err("配置键不能为空".into());
        }

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value.trim()],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 将完整核算参数写入 config_kv
    pub fn save_calculator_config(&self, config: &CalculatorConfig) -> ConfigResult<()> {
        self.update_config(
            config_keys::SHUTTLE_BUS_COUNT,
            &config.shuttle_bus_count.to_string(),
        )?;
        self.update_config(
            config_keys::SHUTTLE_BUS_TRIPS_PER_DAY,
            &config.shuttle_bus_trips_per_day.to_string(),
        )?;
        self.update_config(
            config_keys::SHUTTLE_BUS_DISTANCE_PER_DAY_KM,
            &config.shuttle_bus_distance_per_day_km.to_string(),
        )?;
        self.update_config(
            config_keys::CAR_DISTANCE_PER_DAY_KM,
            &config.car_distance_per_day_km.to_string(),
        )?;
        self.update_config(
            config_keys::MOTORCYCLE_DISTANCE_PER_DAY_KM,
            &config.motorcycle_distance_per_day_km.to_string(),
        )?;
        self.update_config(
            config_keys::WORK_DAYS_PER_YEAR,
            &config.work_days_per_year.to_string(),
        )?;
        for category in EmissionCategory::ALL {
            self.update_config(
                &factor_key(category),
                &config.default_factors.factor(category).to_string(),
            )?;
        }
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    // ===== 解析辅助 =====

    fn get_integer_or_default(&self, key: &str, default: i64) -> ConfigResult<i64> {
        let bounds = integer_bounds(key).unwrap_or(0..=i64::MAX);
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(v) if bounds.contains(&v) => Ok(v),
                _ => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    fn get_decimal_or_default(&self, key: &str, default: Decimal) -> ConfigResult<Decimal> {
        match self.get_config_value(key)? {
            Some(raw) => match Decimal::from_str(raw.trim()) {
                Ok(v) if v >= Decimal::ZERO => Ok(v),
                _ => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 读取核算参数（逐项回退默认值）
    pub fn load_calculator_config(&self) -> ConfigResult<CalculatorConfig> {
        let defaults = CalculatorConfig::default();

        let mut factors = defaults.default_factors;
        for category in EmissionCategory::ALL {
            let value =
                self.get_decimal_or_default(&factor_key(category), factors.factor(category))?;
            factors = factors.with_factor(category, value);
        }

        Ok(CalculatorConfig {
            shuttle_bus_count: self
                .get_integer_or_default(config_keys::SHUTTLE_BUS_COUNT, defaults.shuttle_bus_count)?,
            shuttle_bus_trips_per_day: self.get_integer_or_default(
                config_keys::SHUTTLE_BUS_TRIPS_PER_DAY,
                defaults.shuttle_bus_trips_per_day,
            )?,
            shuttle_bus_distance_per_day_km: self.get_decimal_or_default(
                config_keys::SHUTTLE_BUS_DISTANCE_PER_DAY_KM,
                defaults.shuttle_bus_distance_per_day_km,
            )?,
            car_distance_per_day_km: self.get_decimal_or_default(
                config_keys::CAR_DISTANCE_PER_DAY_KM,
                defaults.car_distance_per_day_km,
            )?,
            motorcycle_distance_per_day_km: self.get_decimal_or_default(
                config_keys::MOTORCYCLE_DISTANCE_PER_DAY_KM,
                defaults.motorcycle_distance_per_day_km,
            )?,
            work_days_per_year: self.get_integer_or_default(
                config_keys::WORK_DAYS_PER_YEAR,
                defaults.work_days_per_year,
            )?,
            default_factors: factors,
        })
    }
}

// ==========================================
// CalculatorConfigReader Trait 实现
// ==========================================
#[async_trait]
impl CalculatorConfigReader for ConfigManager {
    async fn get_calculator_config(&self) -> ConfigResult<CalculatorConfig> {
        self.load_calculator_config()
    }
}
