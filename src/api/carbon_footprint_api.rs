// ==========================================
// 校园碳足迹核算系统 - 碳足迹 API
// ==========================================
// 职责: 入参校验、错误转换、DTO 组装
// 红线: 不缓存核算结果，每次请求重新计算
// ==========================================

use std::sync::Arc;

use chrono::{Datelike, Local};
use tracing::info;

use crate::api::dto::{
    CarbonFootprintDto, DashboardResponse, DashboardSummary, GetCarbonFootprintByPeriodRequest,
    GetCarbonFootprintByYearRequest, GetDashboardRequest, GetYearComparisonRequest,
    YearComparisonDto,
};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::MissingYearPolicy;
use crate::engine::CarbonFootprintService;

/// 允许查询的年份范围
pub const MIN_QUERY_YEAR: i32 = 2000;
pub const MAX_QUERY_YEAR: i32 = 2100;

const DASHBOARD_TITLE: &str = "Carbon Footprint Dashboard";

// ==========================================
// CarbonFootprintApi - 碳足迹 API
// ==========================================

/// 碳足迹API
///
/// 职责：
/// 1. 单年核算
/// 2. 区间核算（缺少学校信息的年份跳过）
/// 3. 当年 vs 上一年对比
/// 4. 驾驶舱摘要
pub struct CarbonFootprintApi {
    service: Arc<CarbonFootprintService>,
}

impl CarbonFootprintApi {
    /// 创建新的CarbonFootprintApi实例
    pub fn new(service: Arc<CarbonFootprintService>) -> Self {
        Self { service }
    }

    /// 按年份查询碳足迹
    ///
    /// # 返回
    /// - Err(InvalidInput): 年份超出 2000..=2100
    /// - Err(NotFound): 该年度无学校信息
    pub async fn get_by_year(
        &self,
        request: &GetCarbonFootprintByYearRequest,
    ) -> ApiResult<CarbonFootprintDto> {
        if !(MIN_QUERY_YEAR..=MAX_QUERY_YEAR).contains(&request.year) {
            return Err(ApiError::InvalidInput(format!(
                "年份必须在 {} 到 {} 之间: {}",
                MIN_QUERY_YEAR, MAX_QUERY_YEAR, request.year
            )));
        }

        let footprint = self
            .service
            .calculate_for_year(request.year, &request.emission_factors)
            .await?;
        Ok(CarbonFootprintDto::from(&footprint))
    }

    /// 按日期区间查询碳足迹（逐年）
    pub async fn get_by_period(
        &self,
        request: &GetCarbonFootprintByPeriodRequest,
    ) -> ApiResult<Vec<CarbonFootprintDto>> {
        if request.end_date < request.start_date {
            return Err(ApiError::InvalidInput(
                "end date must be after start date".to_string(),
            ));
        }

        let footprints = self
            .service
            .calculate_for_period(
                request.start_date,
                request.end_date,
                &request.emission_factors,
                MissingYearPolicy::Skip,
            )
            .await?;
        Ok(footprints.iter().map(CarbonFootprintDto::from).collect())
    }

    /// 当年与上一年对比（当年取本地日期）
    pub async fn get_year_comparison(
        &self,
        request: &GetYearComparisonRequest,
    ) -> ApiResult<YearComparisonDto> {
        let current_year = Local::now().year();
        self.compare(current_year, request).await
    }

    /// 指定年份与上一年对比
    pub async fn compare(
        &self,
        current_year: i32,
        request: &GetYearComparisonRequest,
    ) -> ApiResult<YearComparisonDto> {
        let comparison = self
            .service
            .compare_years(current_year, &request.emission_factors)
            .await?;
        Ok(YearComparisonDto::from(comparison))
    }

    /// 驾驶舱（对比年份与生成时间取自同一本地时刻）
    pub async fn get_dashboard(&self, request: &GetDashboardRequest) -> ApiResult<DashboardResponse> {
        let now = Local::now();
        let comparison = self
            .compare(
                now.year(),
                &GetYearComparisonRequest {
                    emission_factors: request.emission_factors,
                },
            )
            .await?;
        let summary = DashboardSummary::from(&comparison);

        info!(
            current_year = comparison.current_year,
            has_comparison = comparison.has_comparison,
            "驾驶舱数据已生成"
        );

        Ok(DashboardResponse {
            title: DASHBOARD_TITLE.to_string(),
            last_updated: now,
            comparison,
            summary,
        })
    }
}
