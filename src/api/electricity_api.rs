// ==========================================
// 校园碳足迹核算系统 - 用电 API
// ==========================================
// 职责: 楼宇管理、电表读数增删改查、月度汇总
// 约束: 同一楼宇每个自然月至多一条读数
// ==========================================

use std::sync::Arc;

use chrono::Datelike;
use tracing::{debug, info};

use crate::api::dto::{
    CreateBuildingRequest, CreateElectricRecordRequest, ElectricMonthlyTotalDto,
    GetMonthlyTotalsRequest, ListElectricRecordsRequest, UpdateElectricRecordRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::building::Building;
use crate::domain::electric::ElectricRecord;
use crate::repository::{BuildingRepository, ElectricRepository};

// ==========================================
// ElectricityApi - 用电 API
// ==========================================
pub struct ElectricityApi {
    building_repo: Arc<BuildingRepository>,
    electric_repo: Arc<ElectricRepository>,
}

impl ElectricityApi {
    pub fn new(building_repo: Arc<BuildingRepository>, electric_repo: Arc<ElectricRepository>) -> Self {
        Self {
            building_repo,
            electric_repo,
        }
    }

    // ==========================================
    // 楼宇
    // ==========================================

    /// 创建楼宇（名称不区分大小写唯一）
    pub fn create_building(&self, request: &CreateBuildingRequest) -> ApiResult<Building> {
        let building = Building::create(
            &request.name,
            request.e_meter_code.clone(),
            request.g_meter_code.clone(),
        )?;

        if self.building_repo.find_by_name(&building.name)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "楼宇名称已存在: {}",
                building.name
            )));
        }

        self.building_repo.insert(&building)?;
        info!(building_id = %building.building_id, name = %building.name, "楼宇已创建");
        Ok(building)
    }

    pub fn list_buildings(&self) -> ApiResult<Vec<Building>> {
        Ok(self.building_repo.list_all()?)
    }

    // ==========================================
    // 电表读数
    // ==========================================

    /// 新增读数
    ///
    /// # 返回
    /// - Err(NotFound): 楼宇不存在
    /// - Err(InvalidInput): 读数校验失败
    /// - Err(BusinessRuleViolation): 该楼宇当月已有读数
    pub fn create_record(&self, request: &CreateElectricRecordRequest) -> ApiResult<ElectricRecord> {
        self.require_building(&request.building_id)?;

        let record = ElectricRecord::create(
            request.record_date,
            request.initial_meter_value,
            request.final_meter_value,
            request.kwh_value,
            &request.building_id,
        )?;
        self.ensure_month_available(&record, None)?;

        self.electric_repo.insert(&record)?;
        info!(
            electric_id = %record.electric_id,
            building_id = %record.building_id,
            date = %record.record_date,
            usage = %record.usage,
            "电表读数已创建"
        );
        Ok(record)
    }

    /// 更新读数（用量随之重算）
    pub fn update_record(
        &self,
        electric_id: &str,
        request: &UpdateElectricRecordRequest,
    ) -> ApiResult<ElectricRecord> {
        let mut record = self
            .electric_repo
            .find_by_id(electric_id)?
            .ok_or_else(|| ApiError::NotFound(format!("电表读数(id={})不存在", electric_id)))?;

        record.update(
            request.record_date,
            request.initial_meter_value,
            request.final_meter_value,
            request.kwh_value,
        )?;
        self.ensure_month_available(&record, Some(electric_id))?;

        self.electric_repo.update(&record)?;
        info!(electric_id = %record.electric_id, usage = %record.usage, "电表读数已更新");
        Ok(record)
    }

    pub fn delete_record(&self, electric_id: &str) -> ApiResult<()> {
        self.electric_repo.delete(electric_id)?;
        info!(electric_id = electric_id, "电表读数已删除");
        Ok(())
    }

    pub fn get_record(&self, electric_id: &str) -> ApiResult<ElectricRecord> {
        self.electric_repo
            .find_by_id(electric_id)?
            .ok_or_else(|| ApiError::NotFound(format!("电表读数(id={})不存在", electric_id)))
    }

    /// 按日期区间（可选楼宇）查询读数，日期降序
    pub fn list_records(&self, request: &ListElectricRecordsRequest) -> ApiResult<Vec<ElectricRecord>> {
        if request.end_date < request.start_date {
            return Err(ApiError::InvalidInput(
                "end date must be after start date".to_string(),
            ));
        }

        let records = match request.building_id.as_deref() {
            Some(building_id) => self.electric_repo.find_by_building_and_date_range(
                building_id,
                request.start_date,
                request.end_date,
            )?,
            None => self
                .electric_repo
                .find_by_date_range(request.start_date, request.end_date)?,
        };
        debug!(count = records.len(), "电表读数查询完成");
        Ok(records)
    }

    /// 月度汇总（年、月升序）
    pub fn monthly_totals(
        &self,
        request: &GetMonthlyTotalsRequest,
    ) -> ApiResult<Vec<ElectricMonthlyTotalDto>> {
        let totals = self
            .electric_repo
            .monthly_totals(request.start_date, request.end_date)?;
        Ok(totals
            .into_iter()
            .map(|t| ElectricMonthlyTotalDto {
                formatted_month: t.formatted_month(),
                year: t.year,
                month: t.month,
                total_kwh_value: t.total_kwh_value,
                total_usage: t.total_usage,
            })
            .collect())
    }

    // ===== 内部校验 =====

    fn require_building(&self, building_id: &str) -> ApiResult<Building> {
        self.building_repo
            .find_by_id(building_id)?
            .ok_or_else(|| ApiError::NotFound(format!("楼宇(id={})不存在", building_id)))
    }

    fn ensure_month_available(
        &self,
        record: &ElectricRecord,
        exclude_id: Option<&str>,
    ) -> ApiResult<()> {
        let date = record.record_date;
        if self.electric_repo.exists_for_month(
            &record.building_id,
            date.year(),
            date.month(),
            exclude_id,
        )? {
            return Err(ApiError::BusinessRuleViolation(format!(
                "楼宇 {} 在 {:02}/{} 已有电表读数",
                record.building_id,
                date.month(),
                date.year()
            )));
        }
        Ok(())
    }
}
