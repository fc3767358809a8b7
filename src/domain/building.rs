// ==========================================
// 校园碳足迹核算系统 - 楼宇领域模型
// ==========================================
// 楼宇名称唯一（导入时按工作表名匹配楼宇）
// ==========================================

use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub building_id: String,
    pub name: String,
    pub e_meter_code: Option<String>, // 电表编号
    pub g_meter_code: Option<String>, // 燃气表编号
    pub created_at: DateTime<Utc>,
}

impl Building {
    /// 创建楼宇（名称去除首尾空白后不得为空）
    pub fn create(
        name: &str,
        e_meter_code: Option<String>,
        g_meter_code: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::field("name", "楼宇名称不能为空"));
        }

        Ok(Self {
            building_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            e_meter_code: e_meter_code.filter(|c| !c.trim().is_empty()),
            g_meter_code: g_meter_code.filter(|c| !c.trim().is_empty()),
            created_at: Utc::now(),
        })
    }
}
