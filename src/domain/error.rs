// ==========================================
// 校园碳足迹核算系统 - 领域层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 领域校验错误
///
/// 实体构造/更新时的字段校验失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("字段值不能为负 (field={field}): {value}")]
    NegativeValue { field: String, value: String },

    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    #[error("年份必须不早于 {min}: {year}")]
    YearOutOfRange { year: i32, min: i32 },
}

impl DomainError {
    pub(crate) fn negative(field: &str, value: impl ToString) -> Self {
        DomainError::NegativeValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        DomainError::FieldValueError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
