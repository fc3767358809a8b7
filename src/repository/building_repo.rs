// ==========================================
// 校园碳足迹核算系统 - 楼宇数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::building::Building;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// BuildingRepository - 楼宇仓储
// ==========================================
/// 楼宇仓储
/// 职责: 管理 building 表的 CRUD 操作
pub struct BuildingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BuildingRepository {
    /// 创建新的 BuildingRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增楼宇（名称重复时返回 UniqueConstraintViolation）
    pub fn insert(&self, building: &Building) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO building (building_id, name, e_meter_code, g_meter_code, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                building.building_id,
                building.name,
                building.e_meter_code,
                building.g_meter_code,
                building.created_at,
            ],
        )?;
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, building_id: &str) -> RepositoryResult<Option<Building>> {
        let conn = self.get_conn()?;
        let building = conn
            .query_row(
                r#"
                SELECT building_id, name, e_meter_code, g_meter_code, created_at
                FROM building
                WHERE building_id = ?1
                "#,
                params![building_id],
                map_building_row,
            )
            .optional()?;
        Ok(building)
    }

    /// 按名称查询（忽略大小写与首尾空白）
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Building>> {
        let conn = self.get_conn()?;
        let building = conn
            .query_row(
                r#"
                SELECT building_id, name, e_meter_code, g_meter_code, created_at
                FROM building
                WHERE name = ?1 COLLATE NOCASE
                "#,
                params![name.trim()],
                map_building_row,
            )
            .optional()?;
        Ok(building)
    }

    /// 查询全部楼宇（按名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Building>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT building_id, name, e_meter_code, g_meter_code, created_at
            FROM building
            ORDER BY name ASC
            "#,
        )?;

        let buildings = stmt
            .query_map([], map_building_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(buildings)
    }

    /// 删除楼宇（级联删除其电表读数）
    pub fn delete(&self, building_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM building WHERE building_id = ?1",
            params![building_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Building".to_string(),
                id: building_id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_building_row(row: &Row<'_>) -> SqliteResult<Building> {
    Ok(Building {
        building_id: row.get(0)?,
        name: row.get(1)?,
        e_meter_code: row.get(2)?,
        g_meter_code: row.get(3)?,
        created_at: row.get(4)?,
    })
}
