// ==========================================
// 校园碳足迹核算系统 - 核算数据源
// ==========================================
// 职责: 定义核算引擎读取用量的接口，并提供基于 Repository 的实现
// 红线: 引擎不拼 SQL，只经由本接口读取
// ==========================================

use crate::domain::school_info::VehicleCounts;
use crate::repository::{ElectricRepository, RepositoryResult, SchoolInfoRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

// ==========================================
// FootprintDataSource Trait
// ==========================================
#[async_trait]
pub trait FootprintDataSource: Send + Sync {
    /// 区间内用电量合计（闭区间，kWh）
    async fn total_electricity_usage(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Decimal>;

    /// 年度入校车辆数
    ///
    /// # 返回
    /// - None: 该年度无学校信息
    /// - Some: 有学校信息（无车辆记录时计数为 0）
    async fn vehicle_counts_for_year(&self, year: i32) -> RepositoryResult<Option<VehicleCounts>>;
}

/// 核算仓储集合
///
/// 聚合碳足迹核算所需的 Repository。
///
/// # 包含的仓储
/// - `electric_repo`: 电表读数
/// - `school_info_repo`: 年度学校信息
#[derive(Clone)]
pub struct FootprintRepositories {
    pub electric_repo: Arc<ElectricRepository>,
    pub school_info_repo: Arc<SchoolInfoRepository>,
}

impl FootprintRepositories {
    pub fn new(
        electric_repo: Arc<ElectricRepository>,
        school_info_repo: Arc<SchoolInfoRepository>,
    ) -> Self {
        Self {
            electric_repo,
            school_info_repo,
        }
    }
}

#[async_trait]
impl FootprintDataSource for FootprintRepositories {
    async fn total_electricity_usage(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Decimal> {
        self.electric_repo.sum_usage_by_date_range(start, end)
    }

    async fn vehicle_counts_for_year(&self, year: i32) -> RepositoryResult<Option<VehicleCounts>> {
        Ok(self
            .school_info_repo
            .find_by_year(year)?
            .map(|info| info.vehicle_counts()))
    }
}
