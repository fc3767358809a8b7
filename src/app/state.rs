// ==========================================
// 校园碳足迹核算系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{
    CarbonFootprintApi, ConfigApi, ElectricityApi, ImportApi, SchoolInfoApi,
};
use crate::config::config_manager::ConfigManager;
use crate::db::{initialize_schema, open_sqlite_connection};
use crate::engine::{CarbonFootprintService, FootprintRepositories};
use crate::importer::ElectricityImporter;
use crate::repository::{BuildingRepository, ElectricRepository, SchoolInfoRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CARBONWISE_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 碳足迹API
    pub carbon_footprint_api: Arc<CarbonFootprintApi>,

    /// 学校信息API
    pub school_info_api: Arc<SchoolInfoApi>,

    /// 用电API
    pub electricity_api: Arc<ElectricityApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 电表读数导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 可用于测试）
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并初始化 schema
    /// 2. 初始化所有Repository
    /// 3. 创建核算服务与所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        initialize_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let building_repo = Arc::new(BuildingRepository::from_connection(conn.clone()));
        let electric_repo = Arc::new(ElectricRepository::from_connection(conn.clone()));
        let school_info_repo = Arc::new(SchoolInfoRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let data_source = Arc::new(FootprintRepositories::new(
            electric_repo.clone(),
            school_info_repo.clone(),
        ));
        let footprint_service = Arc::new(CarbonFootprintService::new(
            data_source,
            config_manager.clone(),
        ));
        let importer = Arc::new(ElectricityImporter::new(
            building_repo.clone(),
            electric_repo.clone(),
        ));

        // ==========================================
        // 初始化API层
        // ==========================================
        let state = Self {
            db_path,
            carbon_footprint_api: Arc::new(CarbonFootprintApi::new(footprint_service)),
            school_info_api: Arc::new(SchoolInfoApi::new(school_info_repo)),
            electricity_api: Arc::new(ElectricityApi::new(building_repo, electric_repo)),
            config_api: Arc::new(ConfigApi::new(config_manager)),
            import_api: Arc::new(ImportApi::new(importer)),
        };

        tracing::info!("AppState初始化完成");
        Ok(state)
    }
}

/// 获取默认数据库路径
///
/// 优先级: CARBONWISE_DB_PATH 环境变量 → 用户数据目录 → ./carbonwise.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./carbonwise.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("carbonwise");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("carbonwise.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db") || std::env::var(DB_PATH_ENV).is_ok());
    }

    #[test]
    fn test_app_state_in_memory() {
        let state = AppState::new(":memory:".to_string()).unwrap();
        assert_eq!(state.db_path, ":memory:");
        assert!(state.electricity_api.list_buildings().unwrap().is_empty());
    }
}
