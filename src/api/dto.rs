// ==========================================
// 校园碳足迹核算系统 - API 数据传输对象
// ==========================================
// 请求对象全部可反序列化；排放因子覆写字段缺省时使用配置值
// ==========================================

use crate::domain::carbon_footprint::{CarbonFootprint, FactorOverrides};
use crate::domain::school_info::CampusVehicleEntry;
use crate::engine::year_comparator::{EmissionComparison, YearComparison};
use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// 碳足迹
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonFootprintDto {
    pub year: i32,
    pub electricity_emission: Decimal,
    pub shuttle_bus_emission: Decimal,
    pub car_emission: Decimal,
    pub motorcycle_emission: Decimal,
    pub total_emission: Decimal,
}

impl From<&CarbonFootprint> for CarbonFootprintDto {
    fn from(fp: &CarbonFootprint) -> Self {
        Self {
            year: fp.year(),
            electricity_emission: fp.electricity_emission(),
            shuttle_bus_emission: fp.shuttle_bus_emission(),
            car_emission: fp.car_emission(),
            motorcycle_emission: fp.motorcycle_emission(),
            total_emission: fp.total_emission(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetCarbonFootprintByYearRequest {
    pub year: i32,
    #[serde(default)]
    pub emission_factors: FactorOverrides,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCarbonFootprintByPeriodRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub emission_factors: FactorOverrides,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetYearComparisonRequest {
    #[serde(default)]
    pub emission_factors: FactorOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearComparisonDto {
    pub current_year: i32,
    pub previous_year: i32,
    pub current_year_data: Option<CarbonFootprintDto>,
    pub previous_year_data: Option<CarbonFootprintDto>,
    pub has_comparison: bool,
    pub comparison: Option<EmissionComparison>,
}

impl From<YearComparison> for YearComparisonDto {
    fn from(cmp: YearComparison) -> Self {
        Self {
            current_year: cmp.current_year,
            previous_year: cmp.previous_year,
            current_year_data: cmp.current_year_data.as_ref().map(CarbonFootprintDto::from),
            previous_year_data: cmp.previous_year_data.as_ref().map(CarbonFootprintDto::from),
            has_comparison: cmp.has_comparison,
            comparison: cmp.comparison,
        }
    }
}

// ==========================================
// 驾驶舱
// ==========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetDashboardRequest {
    #[serde(default)]
    pub emission_factors: FactorOverrides,
}

/// 驾驶舱摘要（缺失部分按 0 / false）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub current_year_total: Decimal,
    pub previous_year_total: Decimal,
    pub has_improved: bool,
    pub change_percentage: Decimal,
}

impl From<&YearComparisonDto> for DashboardSummary {
    fn from(cmp: &YearComparisonDto) -> Self {
        let total = |data: &Option<CarbonFootprintDto>| {
            data.as_ref()
                .map(|fp| fp.total_emission)
                .unwrap_or(Decimal::ZERO)
        };
        Self {
            current_year_total: total(&cmp.current_year_data),
            previous_year_total: total(&cmp.previous_year_data),
            has_improved: cmp
                .comparison
                .as_ref()
                .map(|c| c.is_improvement)
                .unwrap_or(false),
            change_percentage: cmp
                .comparison
                .as_ref()
                .map(|c| c.total_emission_change_percentage)
                .unwrap_or(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub title: String,
    pub last_updated: DateTime<Local>,
    pub comparison: YearComparisonDto,
    pub summary: DashboardSummary,
}

// ==========================================
// 学校信息
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampusVehicleEntryDto {
    pub cars_managed_by_university: i32,
    pub cars_entering_university: i32,
    pub motorcycles_entering_university: i32,
}

impl From<CampusVehicleEntry> for CampusVehicleEntryDto {
    fn from(entry: CampusVehicleEntry) -> Self {
        Self {
            cars_managed_by_university: entry.cars_managed_by_university,
            cars_entering_university: entry.cars_entering_university,
            motorcycles_entering_university: entry.motorcycles_entering_university,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchoolInfoRequest {
    pub number_of_people: i32,
    pub year: i32,
    #[serde(default)]
    pub vehicles: Option<CampusVehicleEntryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSchoolInfoRequest {
    pub number_of_people: i32,
    #[serde(default)]
    pub vehicles: Option<CampusVehicleEntryDto>,
}

// ==========================================
// 楼宇 / 电表读数
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBuildingRequest {
    pub name: String,
    #[serde(default)]
    pub e_meter_code: Option<String>,
    #[serde(default)]
    pub g_meter_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateElectricRecordRequest {
    pub building_id: String,
    pub record_date: NaiveDate,
    pub initial_meter_value: Decimal,
    pub final_meter_value: Decimal,
    pub kwh_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateElectricRecordRequest {
    pub record_date: NaiveDate,
    pub initial_meter_value: Decimal,
    pub final_meter_value: Decimal,
    pub kwh_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListElectricRecordsRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub building_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetMonthlyTotalsRequest {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// 月度汇总（附 MM/YYYY 显示字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectricMonthlyTotalDto {
    pub year: i32,
    pub month: u32,
    pub formatted_month: String,
    pub total_kwh_value: Decimal,
    pub total_usage: Decimal,
}

// ==========================================
// 导入
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct ImportElectricityResponse {
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
    pub elapsed_ms: i64,
}
