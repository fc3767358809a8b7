// ==========================================
// 校园碳足迹核算系统 - 电表读数导入器
// ==========================================
// 流程: 文件解析 → 字段映射 → 楼宇匹配 → 领域校验 → 月度去重 → 落库
// 行级错误不终止导入，记录为 "Sheet '{sheet}', Row {n}: {reason}"
// ==========================================

use crate::domain::building::Building;
use crate::domain::electric::ElectricRecord;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{ElectricRowInput, FieldMapper};
use crate::importer::file_parser::{RawSheetRow, UniversalFileParser};
use crate::repository::{BuildingRepository, ElectricRepository};
use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

// ==========================================
// ImportReport - 导入结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub success_count: usize,
    pub imported: Vec<ElectricRecord>,
    pub errors: Vec<String>,
}

impl ImportReport {
    fn push_error(&mut self, row: &RawSheetRow, reason: impl AsRef<str>) {
        self.errors.push(format!(
            "Sheet '{}', Row {}: {}",
            row.sheet,
            row.row_number,
            reason.as_ref()
        ));
    }
}

// 行处理结果
enum RowOutcome {
    Imported(ElectricRecord),
    Rejected(String),
}

// ==========================================
// ElectricityImporter
// ==========================================
pub struct ElectricityImporter {
    building_repo: Arc<BuildingRepository>,
    electric_repo: Arc<ElectricRepository>,
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl ElectricityImporter {
    pub fn new(building_repo: Arc<BuildingRepository>, electric_repo: Arc<ElectricRepository>) -> Self {
        Self {
            building_repo,
            electric_repo,
            parser: UniversalFileParser,
            mapper: FieldMapper,
        }
    }

    /// 从文件导入电表读数
    ///
    /// # 返回
    /// - Err: 文件不存在 / 格式不支持 / 无法解析 / 数据库错误
    /// - Ok(ImportReport): 成功条数、已导入记录、行级错误
    pub async fn import_from_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportReport> {
        let started = Instant::now();
        let path = file_path.as_ref();
        let rows = self.parser.parse(path)?;

        let mut report = ImportReport::default();
        let mut building_cache: HashMap<String, Option<Building>> = HashMap::new();

        for row in &rows {
            match self.import_row(row, &mut building_cache)? {
                RowOutcome::Imported(record) => {
                    report.success_count += 1;
                    report.imported.push(record);
                }
                RowOutcome::Rejected(reason) => report.push_error(row, reason),
            }
        }

        if !report.errors.is_empty() {
            warn!(
                file = %path.display(),
                error_count = report.errors.len(),
                "部分行导入失败"
            );
        }
        info!(
            file = %path.display(),
            rows = rows.len(),
            success = report.success_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "电表读数导入完成"
        );
        Ok(report)
    }

    fn import_row(
        &self,
        row: &RawSheetRow,
        building_cache: &mut HashMap<String, Option<Building>>,
    ) -> ImportResult<RowOutcome> {
        let input: ElectricRowInput = match self.mapper.map_electric_row(row) {
            Ok(input) => input,
            Err(reason) => return Ok(RowOutcome::Rejected(reason)),
        };

        let cache_key = input.building_name.to_lowercase();
        let building = match building_cache.get(&cache_key) {
            Some(cached) => cached.clone(),
            None => {
                let found = self.building_repo.find_by_name(&input.building_name)?;
                building_cache.insert(cache_key, found.clone());
                found
            }
        };
        let Some(building) = building else {
            return Ok(RowOutcome::Rejected(format!(
                "Building '{}' not found",
                input.building_name
            )));
        };

        let record = match ElectricRecord::create(
            input.record_date,
            input.initial_meter_value,
            input.final_meter_value,
            input.kwh_value,
            &building.building_id,
        ) {
            Ok(record) => record,
            Err(e) => return Ok(RowOutcome::Rejected(e.to_string())),
        };

        let date = record.record_date;
        if self
            .electric_repo
            .exists_for_month(&building.building_id, date.year(), date.month(), None)?
        {
            return Ok(RowOutcome::Rejected(format!(
                "Building '{}' already has a reading for {:02}/{}",
                building.name,
                date.month(),
                date.year()
            )));
        }

        self.electric_repo.insert(&record)?;
        Ok(RowOutcome::Imported(record))
    }
}
