// ==========================================
// 电表读数导入API
// ==========================================
// 职责: 封装电表读数文件导入
// ==========================================

use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::ImportElectricityResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::importer::ElectricityImporter;

/// 导入API
pub struct ImportApi {
    importer: Arc<ElectricityImporter>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(importer: Arc<ElectricityImporter>) -> Self {
        Self { importer }
    }

    /// 导入电表读数
    ///
    /// # 参数
    /// - file_path: 文件路径（.xlsx/.xls/.csv）
    ///
    /// # 返回
    /// - Ok(ImportElectricityResponse): 成功条数与行级错误
    /// - Err(ApiError): 文件级错误
    pub async fn import_electricity(&self, file_path: &str) -> ApiResult<ImportElectricityResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let started = Instant::now();
        let report = self.importer.import_from_file(file_path).await?;

        Ok(ImportElectricityResponse {
            success_count: report.success_count,
            error_count: report.errors.len(),
            errors: report.errors,
            elapsed_ms: started.elapsed().as_millis() as i64,
        })
    }
}
