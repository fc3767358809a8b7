// ==========================================
// 校园碳足迹核算系统 - 领域类型定义
// ==========================================
// 排放类别 / 缺失年份策略
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 排放类别 (Emission Category)
// ==========================================
// 每个类别对应一个独立可覆写的排放因子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmissionCategory {
    Electricity, // 用电
    ShuttleBus,  // 校车
    Car,         // 入校汽车
    Motorcycle,  // 入校摩托车
}

impl EmissionCategory {
    /// 全部类别（固定顺序）
    pub const ALL: [EmissionCategory; 4] = [
        EmissionCategory::Electricity,
        EmissionCategory::ShuttleBus,
        EmissionCategory::Car,
        EmissionCategory::Motorcycle,
    ];

    /// 配置键后缀 (config_kv 中 `carbon.factor.{suffix}`)
    pub fn key_suffix(&self) -> &'static str {
        match self {
            EmissionCategory::Electricity => "electricity",
            EmissionCategory::ShuttleBus => "shuttle_bus",
            EmissionCategory::Car => "car",
            EmissionCategory::Motorcycle => "motorcycle",
        }
    }
}

impl fmt::Display for EmissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmissionCategory::Electricity => write!(f, "ELECTRICITY"),
            EmissionCategory::ShuttleBus => write!(f, "SHUTTLE_BUS"),
            EmissionCategory::Car => write!(f, "CAR"),
            EmissionCategory::Motorcycle => write!(f, "MOTORCYCLE"),
        }
    }
}

// ==========================================
// 缺失年份策略 (Missing Year Policy)
// ==========================================
// 区间核算时某年缺少学校信息的处理方式
// - Skip: 跳过该年，不报错（区间报表默认）
// - Fail: 立即返回 YearDataNotFound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissingYearPolicy {
    #[default]
    Skip,
    Fail,
}

impl fmt::Display for MissingYearPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingYearPolicy::Skip => write!(f, "SKIP"),
            MissingYearPolicy::Fail => write!(f, "FAIL"),
        }
    }
}

impl MissingYearPolicy {
    /// 从字符串解析（大小写不敏感，未知值回退为 Skip）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "FAIL" => MissingYearPolicy::Fail,
            _ => MissingYearPolicy::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_year_policy_parse() {
        assert_eq!(MissingYearPolicy::from_str("fail"), MissingYearPolicy::Fail);
        assert_eq!(MissingYearPolicy::from_str(" SKIP "), MissingYearPolicy::Skip);
        assert_eq!(MissingYearPolicy::from_str("whatever"), MissingYearPolicy::Skip);
        assert_eq!(MissingYearPolicy::default(), MissingYearPolicy::Skip);
    }

    #[test]
    fn test_emission_category_serde() {
        let json = serde_json::to_string(&EmissionCategory::ShuttleBus).unwrap();
        assert_eq!(json, "\"SHUTTLE_BUS\"");
        assert_eq!(EmissionCategory::ShuttleBus.to_string(), "SHUTTLE_BUS");
        assert_eq!(EmissionCategory::ALL.len(), 4);
    }
}
