// ==========================================
// API 层集成测试
// ==========================================
// 测试目标: 通过 AppState 装配的 API 验证输入校验、业务规则与错误映射
// ==========================================


use carbonwise::api::dto::{
    CampusVehicleEntryDto, CreateBuildingRequest, CreateElectricRecordRequest,
    CreateSchoolInfoRequest, GetCarbonFootprintByPeriodRequest, GetCarbonFootprintByYearRequest,
    GetDashboardRequest, GetMonthlyTotalsRequest, GetYearComparisonRequest,
    ListElectricRecordsRequest, UpdateElectricRecordRequest, UpdateSchoolInfoRequest,
};
use carbonwise::api::ApiError;
use carbonwise::app::AppState;
use carbonwise::config::config_keys;
use carbonwise::domain::{Building, FactorOverrides};
use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use test_helpers::{create_test_db, d, date};

fn create_state() -> (tempfile::NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    (temp_file, state)
}

fn school_info_request(year: i32, vehicles: Option<(i32, i32, i32)>) -> CreateSchoolInfoRequest {
    CreateSchoolInfoRequest {
        number_of_people: 1200,
        year,
        vehicles: vehicles.map(|(managed, cars, motorcycles)| CampusVehicleEntryDto {
            cars_managed_by_university: managed,
            cars_entering_university: cars,
            motorcycles_entering_university: motorcycles,
        }),
    }
}

fn create_building(state: &AppState, name: &str) -> Building {
    state
        .electricity_api
        .create_building(&CreateBuildingRequest {
            name: name.to_string(),
            e_meter_code: None,
            g_meter_code: None,
        })
        .unwrap()
}

fn reading_request(
    building: &Building,
    record_date: chrono::NaiveDate,
    final_value: &str,
) -> CreateElectricRecordRequest {
    CreateElectricRecordRequest {
        building_id: building.building_id.clone(),
        record_date,
        initial_meter_value: d("0"),
        final_meter_value: d(final_value),
        kwh_value: d("1"),
    }
}

// ==========================================
// 碳足迹查询
// ==========================================

#[tokio::test]
async fn test_get_by_year_rejects_out_of_range_year() {
    let (_temp_file, state) = create_state();

    for year in [1999, 2101] {
        let err = state
            .carbon_footprint_api
            .get_by_year(&GetCarbonFootprintByYearRequest {
                year,
                emission_factors: FactorOverrides::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "year {}", year);
    }
}

#[tokio::test]
async fn test_get_by_year_without_school_info_is_not_found() {
    let (_temp_file, state) = create_state();

    let err = state
        .carbon_footprint_api
        .get_by_year(&GetCarbonFootprintByYearRequest {
            year: 2024,
            emission_factors: FactorOverrides::default(),
        })
        .await
        .unwrap_err();

    match err {
        ApiError::NotFound(msg) => assert_eq!(msg, "School information for year 2024 not found"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_by_year_end_to_end() {
    let (_temp_file, state) = create_state();
    let library = create_building(&state, "Library");
    state
        .electricity_api
        .create_record(&reading_request(&library, date(2024, 4, 30), "1000"))
        .unwrap();
    state
        .school_info_api
        .create(&school_info_request(2024, Some((1, 10, 4))))
        .unwrap();

    let dto = state
        .carbon_footprint_api
        .get_by_year(&GetCarbonFootprintByYearRequest {
            year: 2024,
            emission_factors: FactorOverrides::default(),
        })
        .await
        .unwrap();

    assert_eq!(dto.year, 2024);
    assert_eq!(dto.electricity_emission, d("0.84"));
    assert_eq!(dto.total_emission, d("8.8788"));
}

#[tokio::test]
async fn test_get_by_period_validates_range() {
    let (_temp_file, state) = create_state();

    let err = state
        .carbon_footprint_api
        .get_by_period(&GetCarbonFootprintByPeriodRequest {
            start_date: date(2024, 6, 1),
            end_date: date(2024, 1, 1),
            emission_factors: FactorOverrides::default(),
        })
        .await
        .unwrap_err();
    match err {
        ApiError::InvalidInput(msg) => assert_eq!(msg, "end date must be after start date"),
        other => panic!("unexpected error: {:?}", other),
    }

    // 同一天合法，无数据时返回空
    let empty = state
        .carbon_footprint_api
        .get_by_period(&GetCarbonFootprintByPeriodRequest {
            start_date: date(2024, 6, 1),
            end_date: date(2024, 6, 1),
            emission_factors: FactorOverrides::default(),
        })
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_compare_specific_year() {
    let (_temp_file, state) = create_state();
    state
        .school_info_api
        .create(&school_info_request(2024, None))
        .unwrap();

    let result = state
        .carbon_footprint_api
        .compare(
            2024,
            &GetYearComparisonRequest {
                emission_factors: FactorOverrides::default(),
            },
        )
        .await
        .unwrap();

    assert_eq!(result.previous_year, 2023);
    assert!(result.current_year_data.is_some());
    assert!(result.previous_year_data.is_none());
    assert!(!result.has_comparison);
}

#[tokio::test]
async fn test_dashboard_summary() {
    let (_temp_file, state) = create_state();
    let current_year = Local::now().year();
    state
        .school_info_api
        .create(&school_info_request(current_year, None))
        .unwrap();
    state
        .school_info_api
        .create(&school_info_request(current_year - 1, Some((0, 10, 0))))
        .unwrap();

    let dashboard = state
        .carbon_footprint_api
        .get_dashboard(&GetDashboardRequest {
            emission_factors: FactorOverrides::default(),
        })
        .await
        .unwrap();

    assert_eq!(dashboard.title, "Carbon Footprint Dashboard");
    assert_eq!(dashboard.comparison.current_year, current_year);
    assert_eq!(dashboard.last_updated.year(), dashboard.comparison.current_year);
    assert!(dashboard.comparison.has_comparison);
    // 当年 5.22，上一年 5.22 + 1.566
    assert_eq!(dashboard.summary.current_year_total, d("5.22"));
    assert_eq!(dashboard.summary.previous_year_total, d("6.786"));
    assert!(dashboard.summary.has_improved);
    assert_eq!(dashboard.summary.change_percentage, d("-23.08"));
}

#[tokio::test]
async fn test_dashboard_without_data_defaults_to_zero() {
    let (_temp_file, state) = create_state();

    let dashboard = state
        .carbon_footprint_api
        .get_dashboard(&GetDashboardRequest::default())
        .await
        .unwrap();

    assert!(!dashboard.comparison.has_comparison);
    assert_eq!(dashboard.summary.current_year_total, d("0"));
    assert_eq!(dashboard.summary.previous_year_total, d("0"));
    assert!(!dashboard.summary.has_improved);
    assert_eq!(dashboard.summary.change_percentage, d("0"));
}

// ==========================================
// 学校信息
// ==========================================

#[test]
fn test_school_info_duplicate_year_rejected() {
    let (_temp_file, state) = create_state();
    state
        .school_info_api
        .create(&school_info_request(2024, None))
        .unwrap();

    let err = state
        .school_info_api
        .create(&school_info_request(2024, None))
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
}

#[test]
fn test_school_info_validation_errors() {
    let (_temp_file, state) = create_state();

    let err = state
        .school_info_api
        .create(&school_info_request(1999, None))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = state
        .school_info_api
        .create(&school_info_request(2024, Some((0, -1, 0))))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_school_info_update_adds_vehicles() {
    let (_temp_file, state) = create_state();
    let info = state
        .school_info_api
        .create(&school_info_request(2024, None))
        .unwrap();

    let updated = state
        .school_info_api
        .update(
            &info.school_info_id,
            &UpdateSchoolInfoRequest {
                number_of_people: 1500,
                vehicles: Some(CampusVehicleEntryDto {
                    cars_managed_by_university: 2,
                    cars_entering_university: 30,
                    motorcycles_entering_university: 90,
                }),
            },
        )
        .unwrap();
    assert_eq!(updated.number_of_people, 1500);

    let loaded = state.school_info_api.get_by_year(2024).unwrap();
    let vehicles = loaded.vehicles.expect("vehicles should be stored");
    assert_eq!(vehicles.cars_entering_university, 30);
    assert_eq!(vehicles.motorcycles_entering_university, 90);

    let err = state.school_info_api.get_by_id("missing").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 楼宇与电表读数
// ==========================================

#[test]
fn test_building_name_unique_ignoring_case() {
    let (_temp_file, state) = create_state();
    create_building(&state, "Library");

    let err = state
        .electricity_api
        .create_building(&CreateBuildingRequest {
            name: "LIBRARY".to_string(),
            e_meter_code: None,
            g_meter_code: None,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    assert_eq!(state.electricity_api.list_buildings().unwrap().len(), 1);
}

#[test]
fn test_record_requires_existing_building() {
    let (_temp_file, state) = create_state();

    let err = state
        .electricity_api
        .create_record(&CreateElectricRecordRequest {
            building_id: "missing".to_string(),
            record_date: date(2024, 1, 1),
            initial_meter_value: d("0"),
            final_meter_value: d("10"),
            kwh_value: d("1"),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_record_invalid_readings_rejected() {
    let (_temp_file, state) = create_state();
    let library = create_building(&state, "Library");

    let mut request = reading_request(&library, date(2024, 1, 1), "10");
    request.initial_meter_value = d("20");
    let err = state.electricity_api.create_record(&request).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_one_reading_per_building_per_month() {
    let (_temp_file, state) = create_state();
    let library = create_building(&state, "Library");
    let gym = create_building(&state, "Gym");

    let first = state
        .electricity_api
        .create_record(&reading_request(&library, date(2024, 3, 1), "10"))
        .unwrap();

    let err = state
        .electricity_api
        .create_record(&reading_request(&library, date(2024, 3, 28), "20"))
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

    // 其他楼宇同月不受影响
    state
        .electricity_api
        .create_record(&reading_request(&gym, date(2024, 3, 28), "20"))
        .unwrap();

    // 自身更新不与自己冲突
    let updated = state
        .electricity_api
        .update_record(
            &first.electric_id,
            &UpdateElectricRecordRequest {
                record_date: date(2024, 3, 15),
                initial_meter_value: d("0"),
                final_meter_value: d("50"),
                kwh_value: d("2"),
            },
        )
        .unwrap();
    assert_eq!(updated.usage, d("100"));
    assert_eq!(
        state.electricity_api.get_record(&first.electric_id).unwrap().usage,
        d("100")
    );
}

#[test]
fn test_list_records_and_monthly_totals() {
    let (_temp_file, state) = create_state();
    let library = create_building(&state, "Library");
    let gym = create_building(&state, "Gym");

    state
        .electricity_api
        .create_record(&reading_request(&library, date(2024, 1, 10), "10"))
        .unwrap();
    state
        .electricity_api
        .create_record(&reading_request(&library, date(2024, 2, 10), "20"))
        .unwrap();
    let gym_record = state
        .electricity_api
        .create_record(&reading_request(&gym, date(2024, 2, 12), "5"))
        .unwrap();

    let all = state
        .electricity_api
        .list_records(&ListElectricRecordsRequest {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 12, 31),
            building_id: None,
        })
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].record_date, date(2024, 2, 12));

    let library_only = state
        .electricity_api
        .list_records(&ListElectricRecordsRequest {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 12, 31),
            building_id: Some(library.building_id.clone()),
        })
        .unwrap();
    assert_eq!(library_only.len(), 2);

    let totals = state
        .electricity_api
        .monthly_totals(&GetMonthlyTotalsRequest::default())
        .unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[1].formatted_month, "02/2024");
    assert_eq!(totals[1].total_usage, d("25"));

    state
        .electricity_api
        .delete_record(&gym_record.electric_id)
        .unwrap();
    let err = state
        .electricity_api
        .get_record(&gym_record.electric_id)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 配置
// ==========================================

#[tokio::test]
async fn test_config_api_update_applies_to_calculation() {
    let (_temp_file, state) = create_state();
    state
        .school_info_api
        .create(&school_info_request(2024, None))
        .unwrap();

    let err = state
        .config_api
        .update_config("carbon.unknown", "1")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = state
        .config_api
        .update_config(config_keys::SHUTTLE_BUS_COUNT, "1.5")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    state
        .config_api
        .update_config(config_keys::SHUTTLE_BUS_COUNT, "0")
        .unwrap();
    assert_eq!(
        state.config_api.get_calculator_config().unwrap().shuttle_bus_count,
        0
    );

    let dto = state
        .carbon_footprint_api
        .get_by_year(&GetCarbonFootprintByYearRequest {
            year: 2024,
            emission_factors: FactorOverrides::default(),
        })
        .await
        .unwrap();
    assert_eq!(dto.total_emission, d("0"));
}

#[test]
fn test_config_api_rejects_out_of_range_integers() {
    let (_temp_file, state) = create_state();

    for (key, value) in [
        (config_keys::SHUTTLE_BUS_COUNT, "9223372036854775807"),
        (config_keys::SHUTTLE_BUS_TRIPS_PER_DAY, "10001"),
        (config_keys::WORK_DAYS_PER_YEAR, "367"),
    ] {
        let err = state.config_api.update_config(key, value).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "{}={}", key, value);
    }

    state
        .config_api
        .update_config(config_keys::WORK_DAYS_PER_YEAR, "366")
        .unwrap();

    let mut config = state.config_api.get_calculator_config().unwrap();
    assert_eq!(config.work_days_per_year, 366);
    config.shuttle_bus_count = i64::MAX;
    let err = state.config_api.save_calculator_config(&config).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_overflowing_factor_override_is_invalid_input() {
    let (_temp_file, state) = create_state();
    let library = create_building(&state, "Library");
    state
        .electricity_api
        .create_record(&reading_request(&library, date(2024, 1, 31), "2000"))
        .unwrap();
    state
        .school_info_api
        .create(&school_info_request(2024, None))
        .unwrap();

    let err = state
        .carbon_footprint_api
        .get_by_year(&GetCarbonFootprintByYearRequest {
            year: 2024,
            emission_factors: FactorOverrides {
                electricity: Some(Decimal::MAX),
                ..Default::default()
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_record_with_overflowing_usage_is_invalid_input() {
    let (_temp_file, state) = create_state();
    let library = create_building(&state, "Library");

    let mut request = reading_request(&library, date(2024, 1, 1), "0");
    request.final_meter_value = Decimal::MAX;
    request.kwh_value = d("2");
    let err = state.electricity_api.create_record(&request).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
