// ==========================================
// 校园碳足迹核算系统 - 学校信息数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 车辆统计三列全为 NULL 表示未登记车辆信息
// ==========================================

use crate::domain::school_info::{CampusVehicleEntry, SchoolInfo};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT school_info_id, year, number_of_people,
           cars_managed_by_university, cars_entering_university, motorcycles_entering_university,
           created_at, updated_at
    FROM school_info
"#;

// ==========================================
// SchoolInfoRepository - 学校信息仓储
// ==========================================
pub struct SchoolInfoRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SchoolInfoRepository {
    /// 创建新的 SchoolInfoRepository 实例
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

    /// 新增学校信息（同一年份重复时返回 UniqueConstraintViolation）
    pub fn insert(&self, info: &SchoolInfo) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let (managed, entering, motorcycles) = vehicle_columns(info);
        conn.execute(
            r#"
            INSERT INTO school_info (
                school_info_id, year, number_of_people,
                cars_managed_by_university, cars_entering_university, motorcycles_entering_university,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                info.school_info_id,
                info.year,
                info.number_of_people,
                managed,
                entering,
                motorcycles,
                info.created_at,
                info.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 更新学校信息（人数 + 车辆统计）
    pub fn update(&self, info: &SchoolInfo) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let (managed, entering, motorcycles) = vehicle_columns(info);
        let affected = conn.execute(
            r#"
            UPDATE school_info
            SET number_of_people = ?2,
                cars_managed_by_university = ?3,
                cars_entering_university = ?4,
                motorcycles_entering_university = ?5,
                updated_at = ?6
            WHERE school_info_id = ?1
            "#,
            params![
                info.school_info_id,
                info.number_of_people,
                managed,
                entering,
                motorcycles,
                info.updated_at,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SchoolInfo".to_string(),
                id: info.school_info_id.clone(),
            });
        }
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, school_info_id: &str) -> RepositoryResult<Option<SchoolInfo>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE school_info_id = ?1", SELECT_COLUMNS);
        let info = conn
            .query_row(&sql, params![school_info_id], map_school_info_row)
            .optional()?;
        Ok(info)
    }

    /// 按年份查询
    ///
    /// # 返回
    /// - Ok(None): 该年份未登记学校信息
    pub fn find_by_year(&self, year: i32) -> RepositoryResult<Option<SchoolInfo>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE year = ?1", SELECT_COLUMNS);
        let info = conn
            .query_row(&sql, params![year], map_school_info_row)
            .optional()?;
        Ok(info)
    }

    /// 查询全部学校信息（年份升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<SchoolInfo>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY year ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let infos = stmt
            .query_map([], map_school_info_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(infos)
    }
}

fn vehicle_columns(info: &SchoolInfo) -> (Option<i32>, Option<i32>, Option<i32>) {
    match &info.vehicles {
        Some(v) => (
            Some(v.cars_managed_by_university),
            Some(v.cars_entering_university),
            Some(v.motorcycles_entering_university),
        ),
        None => (None, None, None),
    }
}

fn map_school_info_row(row: &Row<'_>) -> SqliteResult<SchoolInfo> {
    let managed: Option<i32> = row.get(3)?;
    let entering: Option<i32> = row.get(4)?;
    let motorcycles: Option<i32> = row.get(5)?;

    let vehicles = if managed.is_none() && entering.is_none() && motorcycles.is_none() {
        None
    } else {
        Some(CampusVehicleEntry {
            cars_managed_by_university: managed.unwrap_or(0),
            cars_entering_university: entering.unwrap_or(0),
            motorcycles_entering_university: motorcycles.unwrap_or(0),
        })
    };

    Ok(SchoolInfo {
        school_info_id: row.get(0)?,
        year: row.get(1)?,
        number_of_people: row.get(2)?,
        vehicles,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
