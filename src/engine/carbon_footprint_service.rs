// ==========================================
// 校园碳足迹核算系统 - 碳足迹核算服务
// ==========================================
// 职责: 单年核算 / 区间汇总 / 年度对比
// 红线: 每次请求重新计算，不缓存结果
// ==========================================

use crate::config::{CalculatorConfig, CalculatorConfigReader};
use crate::domain::carbon_footprint::{CarbonFootprint, EmissionFactors, FactorOverrides, YearUsage};
use crate::domain::types::MissingYearPolicy;
use crate::engine::data_source::FootprintDataSource;
use crate::engine::error::{FootprintError, FootprintResult};
use crate::engine::footprint_calculator;
use crate::engine::year_comparator::{YearComparator, YearComparison};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info, instrument};

// ==========================================
// CarbonFootprintService
// ==========================================
pub struct CarbonFootprintService {
    data_source: Arc<dyn FootprintDataSource>,
    config_reader: Arc<dyn CalculatorConfigReader>,
}

impl CarbonFootprintService {
    /// 创建核算服务
    ///
    /// # 参数
    /// - data_source: 用量数据源（生产环境为 FootprintRepositories）
    /// - config_reader: 核算参数读取器（每次核算前读取）
    pub fn new(
        data_source: Arc<dyn FootprintDataSource>,
        config_reader: Arc<dyn CalculatorConfigReader>,
    ) -> Self {
        Self {
            data_source,
            config_reader,
        }
    }

    async fn load_config(&self) -> FootprintResult<CalculatorConfig> {
        self.config_reader
            .get_calculator_config()
            .await
            .map_err(|e| FootprintError::Config(e.to_string()))
    }

    /// 单年核算
    ///
    /// # 返回
    /// - Err(YearDataNotFound): 该年度无学校信息
    #[instrument(skip(self, overrides), fields(year = year))]
    pub async fn calculate_for_year(
        &self,
        year: i32,
        overrides: &FactorOverrides,
    ) -> FootprintResult<CarbonFootprint> {
        let config = self.load_config().await?;
        let factors = overrides.resolve(&config.default_factors);
        self.calculate_with(year, &config, &factors).await
    }

    /// 区间核算（按年升序，逐年顺序计算）
    ///
    /// # 参数
    /// - policy: 缺少学校信息年份的处理方式
    ///
    /// # 返回
    /// - end_date 早于 start_date 时返回空列表
    #[instrument(skip(self, overrides), fields(start = %start_date, end = %end_date, policy = %policy))]
    pub async fn calculate_for_period(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        overrides: &FactorOverrides,
        policy: MissingYearPolicy,
    ) -> FootprintResult<Vec<CarbonFootprint>> {
        let config = self.load_config().await?;
        let factors = overrides.resolve(&config.default_factors);

        let mut results = Vec::new();
        for year in start_date.year()..=end_date.year() {
            match self.calculate_with(year, &config, &factors).await {
                Ok(footprint) => results.push(footprint),
                Err(FootprintError::YearDataNotFound { year })
                    if policy == MissingYearPolicy::Skip =>
                {
                    debug!(year, "年度无学校信息，跳过");
                }
                Err(e) => return Err(e),
            }
        }

        info!(years = results.len(), "区间核算完成");
        Ok(results)
    }

    /// 当年与上一年对比
    ///
    /// 任一侧缺少学校信息时该侧为空，不视为错误
    #[instrument(skip(self, overrides), fields(current_year = current_year))]
    pub async fn compare_years(
        &self,
        current_year: i32,
        overrides: &FactorOverrides,
    ) -> FootprintResult<YearComparison> {
        let config = self.load_config().await?;
        let factors = overrides.resolve(&config.default_factors);

        let current = self.calculate_optional(current_year, &config, &factors).await?;
        let previous = self
            .calculate_optional(current_year - 1, &config, &factors)
            .await?;

        YearComparator::compare(current_year, current, previous)
    }

    // ===== 内部 =====

    async fn calculate_optional(
        &self,
        year: i32,
        config: &CalculatorConfig,
        factors: &EmissionFactors,
    ) -> FootprintResult<Option<CarbonFootprint>> {
        match self.calculate_with(year, config, factors).await {
            Ok(footprint) => Ok(Some(footprint)),
            Err(FootprintError::YearDataNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn calculate_with(
        &self,
        year: i32,
        config: &CalculatorConfig,
        factors: &EmissionFactors,
    ) -> FootprintResult<CarbonFootprint> {
        let (start, end) = year_bounds(year)?;
        let total_electricity_kwh = self.data_source.total_electricity_usage(start, end).await?;

        let vehicles = self
            .data_source
            .vehicle_counts_for_year(year)
            .await?
            .ok_or(FootprintError::YearDataNotFound { year })?;

        let usage = YearUsage {
            total_electricity_kwh,
            vehicles,
        };
        footprint_calculator::compute(year, &usage, config, factors)
    }
}

// 1 月 1 日 ~ 12 月 31 日
fn year_bounds(year: i32) -> FootprintResult<(NaiveDate, NaiveDate)> {
    match (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(FootprintError::YearDataNotFound { year }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::school_info::VehicleCounts;
    use crate::repository::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// 内存数据源: 年度 → (用电量, 车辆数)
    #[derive(Default)]
    struct FakeDataSource {
        years: HashMap<i32, (Decimal, Option<VehicleCounts>)>,
        broken_year: Option<i32>,
    }

    impl FakeDataSource {
        fn with_year(mut self, year: i32, kwh: &str, vehicles: Option<VehicleCounts>) -> Self {
            self.years.insert(year, (d(kwh), vehicles));
            self
        }
    }

    #[async_trait]
    impl FootprintDataSource for FakeDataSource {
        async fn total_electricity_usage(
            &self,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> RepositoryResult<Decimal> {
            if self.broken_year == Some(start.year()) {
                return Err(RepositoryError::LockError("poisoned".to_string()));
            }
            Ok(self
                .years
                .get(&start.year())
                .map(|(kwh, _)| *kwh)
                .unwrap_or(Decimal::ZERO))
        }

        async fn vehicle_counts_for_year(
            &self,
            year: i32,
        ) -> RepositoryResult<Option<VehicleCounts>> {
            Ok(self.years.get(&year).and_then(|(_, v)| *v))
        }
    }

    fn counts(cars: i64, motorcycles: i64) -> Option<VehicleCounts> {
        Some(VehicleCounts {
            cars_entering: cars,
            motorcycles_entering: motorcycles,
        })
    }

    fn service(source: FakeDataSource) -> CarbonFootprintService {
        CarbonFootprintService::new(Arc::new(source), Arc::new(CalculatorConfig::default()))
    }

    #[tokio::test]
    async fn test_calculate_for_year_default_factors() {
        let svc = service(FakeDataSource::default().with_year(2024, "1000", counts(0, 0)));
        let fp = svc
            .calculate_for_year(2024, &FactorOverrides::default())
            .await
            .unwrap();
        assert_eq!(fp.electricity_emission(), d("0.84"));
        assert_eq!(fp.shuttle_bus_emission(), d("5.22"));
        assert_eq!(fp.total_emission(), d("6.06"));
    }

    #[tokio::test]
    async fn test_calculate_for_year_with_override() {
        let svc = service(FakeDataSource::default().with_year(2024, "2000", counts(0, 0)));
        let overrides = FactorOverrides {
            electricity: Some(d("1.0")),
            ..Default::default()
        };
        let fp = svc.calculate_for_year(2024, &overrides).await.unwrap();
        assert_eq!(fp.electricity_emission(), d("2.0"));
    }

    #[tokio::test]
    async fn test_calculate_for_year_missing_school_info() {
        let svc = service(FakeDataSource::default());
        let err = svc
            .calculate_for_year(2024, &FactorOverrides::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FootprintError::YearDataNotFound { year: 2024 }));
    }

    #[tokio::test]
    async fn test_period_skips_missing_middle_year() {
        let source = FakeDataSource::default()
            .with_year(2021, "100", counts(1, 1))
            .with_year(2023, "300", counts(3, 3));
        let svc = service(source);

        let results = svc
            .calculate_for_period(
                date(2021, 3, 1),
                date(2023, 6, 30),
                &FactorOverrides::default(),
                MissingYearPolicy::Skip,
            )
            .await
            .unwrap();

        let years: Vec<i32> = results.iter().map(|fp| fp.year()).collect();
        assert_eq!(years, vec![2021, 2023]);
    }

    #[tokio::test]
    async fn test_period_fail_policy_returns_first_missing_year() {
        let source = FakeDataSource::default()
            .with_year(2021, "100", counts(1, 1))
            .with_year(2023, "300", counts(3, 3));
        let svc = service(source);

        let err = svc
            .calculate_for_period(
                date(2021, 1, 1),
                date(2023, 12, 31),
                &FactorOverrides::default(),
                MissingYearPolicy::Fail,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FootprintError::YearDataNotFound { year: 2022 }));
    }

    #[tokio::test]
    async fn test_period_without_data_is_empty() {
        let svc = service(FakeDataSource::default());
        let results = svc
            .calculate_for_period(
                date(2019, 1, 1),
                date(2022, 12, 31),
                &FactorOverrides::default(),
                MissingYearPolicy::Skip,
            )
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_period_reversed_range_is_empty() {
        let svc = service(FakeDataSource::default().with_year(2022, "1", counts(0, 0)));
        let results = svc
            .calculate_for_period(
                date(2023, 1, 1),
                date(2022, 1, 1),
                &FactorOverrides::default(),
                MissingYearPolicy::Fail,
            )
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_period_propagates_data_source_error() {
        let mut source = FakeDataSource::default()
            .with_year(2021, "100", counts(1, 1))
            .with_year(2022, "100", counts(1, 1));
        source.broken_year = Some(2022);
        let svc = service(source);

        let err = svc
            .calculate_for_period(
                date(2021, 1, 1),
                date(2022, 12, 31),
                &FactorOverrides::default(),
                MissingYearPolicy::Skip,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FootprintError::DataSource(_)));
    }

    #[tokio::test]
    async fn test_school_info_without_vehicles_counts_zero() {
        let svc = service(FakeDataSource::default().with_year(
            2024,
            "0",
            Some(VehicleCounts::default()),
        ));
        let fp = svc
            .calculate_for_year(2024, &FactorOverrides::default())
            .await
            .unwrap();
        assert_eq!(fp.car_emission(), Decimal::ZERO);
        assert_eq!(fp.motorcycle_emission(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_compare_years_missing_previous() {
        let svc = service(FakeDataSource::default().with_year(2024, "1000", counts(1, 1)));
        let result = svc
            .compare_years(2024, &FactorOverrides::default())
            .await
            .unwrap();
        assert_eq!(result.previous_year, 2023);
        assert!(result.current_year_data.is_some());
        assert!(result.previous_year_data.is_none());
        assert!(!result.has_comparison);
    }

    #[tokio::test]
    async fn test_compare_years_missing_current() {
        let svc = service(FakeDataSource::default().with_year(2023, "1000", counts(1, 1)));
        let result = svc
            .compare_years(2024, &FactorOverrides::default())
            .await
            .unwrap();
        assert!(result.current_year_data.is_none());
        assert!(result.previous_year_data.is_some());
        assert!(!result.has_comparison);
        assert!(result.comparison.is_none());
    }

    #[tokio::test]
    async fn test_overflowing_override_is_error() {
        let svc = service(FakeDataSource::default().with_year(2024, "2000", counts(0, 0)));
        let overrides = FactorOverrides {
            electricity: Some(Decimal::MAX),
            ..Default::default()
        };
        let err = svc.calculate_for_year(2024, &overrides).await.unwrap_err();
        assert!(matches!(err, FootprintError::Overflow { year: 2024 }));
    }

    #[tokio::test]
    async fn test_compare_years_both_present() {
        let source = FakeDataSource::default()
            .with_year(2024, "1000", counts(10, 0))
            .with_year(2023, "2000", counts(10, 0));
        let svc = service(source);
        let result = svc
            .compare_years(2024, &FactorOverrides::default())
            .await
            .unwrap();
        let cmp = result.comparison.unwrap();
        assert!(result.has_comparison);
        assert!(cmp.is_improvement);
        assert_eq!(cmp.electricity_emission_change, d("-0.84"));
        assert_eq!(cmp.electricity_emission_change_percentage, d("-50"));
        assert_eq!(cmp.car_emission_change, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_config_reader_values_are_used() {
        let config = CalculatorConfig {
            shuttle_bus_count: 0,
            ..CalculatorConfig::default()
        };
        let svc = CarbonFootprintService::new(
            Arc::new(FakeDataSource::default().with_year(2024, "0", counts(0, 0))),
            Arc::new(config),
        );
        let fp = svc
            .calculate_for_year(2024, &FactorOverrides::default())
            .await
            .unwrap();
        assert_eq!(fp.total_emission(), Decimal::ZERO);
    }
}
