// ==========================================
// 校园碳足迹核算系统 - 引擎层错误类型
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FootprintError {
    /// 该年度无学校信息，无法核算
    #[error("年度数据不存在: year={year}")]
    YearDataNotFound { year: i32 },

    #[error("数据源读取失败: {0}")]
    DataSource(#[from] RepositoryError),

    #[error("核算参数读取失败: {0}")]
    Config(String),

    /// 排放因子或核算参数过大，结果超出表示范围
    #[error("排放量计算溢出: year={year}")]
    Overflow { year: i32 },
}

pub type FootprintResult<T> = Result<T, FootprintError>;
