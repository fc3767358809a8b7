// ==========================================
// 校园碳足迹核算系统 - 学校信息 API
// ==========================================
// 职责: 年度学校信息与入校车辆统计的增改查
// 约束: 每个年份至多一条学校信息
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::dto::{CampusVehicleEntryDto, CreateSchoolInfoRequest, UpdateSchoolInfoRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::school_info::{CampusVehicleEntry, SchoolInfo};
use crate::repository::SchoolInfoRepository;

pub struct SchoolInfoApi {
    school_info_repo: Arc<SchoolInfoRepository>,
}

impl SchoolInfoApi {
    pub fn new(school_info_repo: Arc<SchoolInfoRepository>) -> Self {
        Self { school_info_repo }
    }

    /// 创建学校信息
    ///
    /// # 返回
    /// - Err(InvalidInput): 人数为负 / 年份早于 2000 / 车辆数为负
    /// - Err(BusinessRuleViolation): 该年份已存在
    pub fn create(&self, request: &CreateSchoolInfoRequest) -> ApiResult<SchoolInfo> {
        let mut info = SchoolInfo::create(request.number_of_people, request.year)?;
        if let Some(vehicles) = request.vehicles {
            info.assign_vehicle_entry(CampusVehicleEntry::create(
                vehicles.cars_managed_by_university,
                vehicles.cars_entering_university,
                vehicles.motorcycles_entering_university,
            )?);
        }

        if self.school_info_repo.find_by_year(info.year)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "年份 {} 的学校信息已存在",
                info.year
            )));
        }

        self.school_info_repo.insert(&info)?;
        info!(year = info.year, school_info_id = %info.school_info_id, "学校信息已创建");
        Ok(info)
    }

    pub fn get_by_id(&self, school_info_id: &str) -> ApiResult<SchoolInfo> {
        self.school_info_repo
            .find_by_id(school_info_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学校信息(id={})不存在", school_info_id)))
    }

    pub fn get_by_year(&self, year: i32) -> ApiResult<SchoolInfo> {
        self.school_info_repo
            .find_by_year(year)?
            .ok_or_else(|| ApiError::NotFound(format!("年份 {} 的学校信息不存在", year)))
    }

    pub fn list(&self) -> ApiResult<Vec<SchoolInfo>> {
        Ok(self.school_info_repo.list_all()?)
    }

    /// 更新人数，并新建或更新车辆统计
    pub fn update(
        &self,
        school_info_id: &str,
        request: &UpdateSchoolInfoRequest,
    ) -> ApiResult<SchoolInfo> {
        let mut info = self.get_by_id(school_info_id)?;
        info.update_number_of_people(request.number_of_people)?;

        if let Some(vehicles) = request.vehicles {
            let entry = match info.vehicles {
                Some(mut existing) => {
                    apply_vehicle_update(&mut existing, vehicles)?;
                    existing
                }
                None => CampusVehicleEntry::create(
                    vehicles.cars_managed_by_university,
                    vehicles.cars_entering_university,
                    vehicles.motorcycles_entering_university,
                )?,
            };
            info.assign_vehicle_entry(entry);
        }

        self.school_info_repo.update(&info)?;
        info!(year = info.year, school_info_id = %info.school_info_id, "学校信息已更新");
        Ok(info)
    }
}

fn apply_vehicle_update(
    entry: &mut CampusVehicleEntry,
    vehicles: CampusVehicleEntryDto,
) -> ApiResult<()> {
    entry.update_cars_managed_by_university(vehicles.cars_managed_by_university)?;
    entry.update_cars_entering_university(vehicles.cars_entering_university)?;
    entry.update_motorcycles_entering_university(vehicles.motorcycles_entering_university)?;
    Ok(())
}
