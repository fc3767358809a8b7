// ==========================================
// 校园碳足迹核算系统 - 电表读数数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 小数以 TEXT 存取，汇总在 Rust 侧用 Decimal 完成（不用 SQL SUM 浮点）
// ==========================================

use crate::domain::electric::{ElectricMonthlyTotal, ElectricRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Datelike, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT electric_id, building_id, record_date,
           initial_meter_value, final_meter_value, kwh_value, usage,
           created_at
    FROM electric_record
"#;

// ==========================================
// ElectricRepository - 电表读数仓储
// ==========================================
/// 电表读数仓储
/// 职责: 管理 electric_record 表的 CRUD 与区间汇总
pub struct ElectricRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ElectricRepository {
    /// 创建新的 ElectricRepository 实例
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

    /// 新增读数
    pub fn insert(&self, record: &ElectricRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO electric_record (
                electric_id, building_id, record_date,
                initial_meter_value, final_meter_value, kwh_value, usage,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.electric_id,
                record.building_id,
                record.record_date,
                record.initial_meter_value.to_string(),
                record.final_meter_value.to_string(),
                record.kwh_value.to_string(),
                record.usage.to_string(),
                record.created_at,
            ],
        )?;
        Ok(())
    }

    /// 更新读数（日期/读数/倍率/用量）
    pub fn update(&self, record: &ElectricRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE electric_record
            SET record_date = ?2,
                initial_meter_value = ?3,
                final_meter_value = ?4,
                kwh_value = ?5,
                usage = ?6
            WHERE electric_id = ?1
            "#,
            params![
                record.electric_id,
                record.record_date,
                record.initial_meter_value.to_string(),
                record.final_meter_value.to_string(),
                record.kwh_value.to_string(),
                record.usage.to_string(),
            ],
        )?;
        if affected == 0 {
            return Err(not_found(&record.electric_id));
        }
        Ok(())
    }

    /// 删除读数
    pub fn delete(&self, electric_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM electric_record WHERE electric_id = ?1",
            params![electric_id],
        )?;
        if affected == 0 {
            return Err(not_found(electric_id));
        }
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, electric_id: &str) -> RepositoryResult<Option<ElectricRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE electric_id = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![electric_id], map_electric_row)
            .optional()?;
        Ok(record)
    }

    /// 按楼宇查询（日期倒序）
    pub fn find_by_building(&self, building_id: &str) -> RepositoryResult<Vec<ElectricRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE building_id = ?1 ORDER BY record_date DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![building_id], map_electric_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 按日期区间查询（闭区间，日期倒序）
    pub fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ElectricRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE record_date >= ?1 AND record_date <= ?2 ORDER BY record_date DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![start, end], map_electric_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 按楼宇 + 日期区间查询（闭区间，日期倒序）
    pub fn find_by_building_and_date_range(
        &self,
        building_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ElectricRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE building_id = ?1 AND record_date >= ?2 AND record_date <= ?3 \
             ORDER BY record_date DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![building_id, start, end], map_electric_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 区间内用量合计（闭区间）
    ///
    /// # 返回
    /// - 无记录时返回 0
    pub fn sum_usage_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Decimal> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT usage FROM electric_record WHERE record_date >= ?1 AND record_date <= ?2",
        )?;
        let usages = stmt
            .query_map(params![start, end], |row| decimal_column(row, 0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        usages
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, usage| acc.checked_add(usage))
            .ok_or_else(|| sum_overflow("usage"))
    }

    /// 楼宇在指定月份是否已有读数
    ///
    /// # 参数
    /// - `exclude_id`: 更新场景下排除自身
    pub fn exists_for_month(
        &self,
        building_id: &str,
        year: i32,
        month: u32,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let month_key = format!("{:04}-{:02}", year, month);
        let exists: Option<i64> = conn
            .query_row(
                r#"
                SELECT 1 FROM electric_record
                WHERE building_id = ?1
                  AND substr(record_date, 1, 7) = ?2
                  AND (?3 IS NULL OR electric_id <> ?3)
                LIMIT 1
                "#,
                params![building_id, month_key, exclude_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    /// 月度汇总（按年、月升序）
    ///
    /// # 参数
    /// - `start` / `end`: 可选日期边界（闭区间）
    pub fn monthly_totals(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<ElectricMonthlyTotal>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_date, kwh_value, usage
            FROM electric_record
            WHERE (?1 IS NULL OR record_date >= ?1)
              AND (?2 IS NULL OR record_date <= ?2)
            "#,
        )?;

        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok((
                    row.get::<_, NaiveDate>(0)?,
                    decimal_column(row, 1)?,
                    decimal_column(row, 2)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut grouped: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
        for (date, kwh, usage) in rows {
            let entry = grouped
                .entry((date.year(), date.month()))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 = entry.0.checked_add(kwh).ok_or_else(|| sum_overflow("kwh_value"))?;
            entry.1 = entry.1.checked_add(usage).ok_or_else(|| sum_overflow("usage"))?;
        }

        Ok(grouped
            .into_iter()
            .map(|((year, month), (total_kwh_value, total_usage))| ElectricMonthlyTotal {
                year,
                month,
                total_kwh_value,
                total_usage,
            })
            .collect())
    }
}

fn sum_overflow(field: &str) -> RepositoryError {
    RepositoryError::FieldValueError {
        field: field.to_string(),
        message: "合计超出 Decimal 表示范围".to_string(),
    }
}

fn not_found(electric_id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "ElectricRecord".to_string(),
        id: electric_id.to_string(),
    }
}

/// 读取 TEXT 小数列
fn decimal_column(row: &Row<'_>, idx: usize) -> SqliteResult<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(raw.trim())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_electric_row(row: &Row<'_>) -> SqliteResult<ElectricRecord> {
    Ok(ElectricRecord {
        electric_id: row.get(0)?,
        building_id: row.get(1)?,
        record_date: row.get(2)?,
        initial_meter_value: decimal_column(row, 3)?,
        final_meter_value: decimal_column(row, 4)?,
        kwh_value: decimal_column(row, 5)?,
        usage: decimal_column(row, 6)?,
        created_at: row.get(7)?,
    })
}
