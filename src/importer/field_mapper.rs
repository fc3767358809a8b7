// ==========================================
// 校园碳足迹核算系统 - 字段映射器实现
// ==========================================
// 职责: 原始行 → 电表读数输入 + 类型转换
// 表头匹配不区分大小写，下划线/连字符视同空格
// ==========================================

use crate::importer::file_parser::RawSheetRow;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use std::str::FromStr;

const BUILDING_ALIASES: &[&str] = &["building", "building name", "楼宇", "楼宇名称"];
const DATE_ALIASES: &[&str] = &["date", "record date", "日期"];
const INITIAL_ALIASES: &[&str] = &["initial meter value", "initial", "initial value", "初读数"];
const FINAL_ALIASES: &[&str] = &["final meter value", "final", "final value", "末读数"];
const KWH_ALIASES: &[&str] = &["kwh value", "kwh", "倍率"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// Excel 可表示的最大日期 9999-12-31
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

// ==========================================
// ElectricRowInput - 映射后的行数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectricRowInput {
    pub building_name: String,
    pub record_date: NaiveDate,
    pub initial_meter_value: Decimal,
    pub final_meter_value: Decimal,
    pub kwh_value: Decimal,
}

pub struct FieldMapper;

impl FieldMapper {
    /// 映射单行
    ///
    /// # 返回
    /// - Err(String): 行级错误原因（不含工作表/行号前缀）
    pub fn map_electric_row(&self, row: &RawSheetRow) -> Result<ElectricRowInput, String> {
        let building_name = self
            .get_string(row, BUILDING_ALIASES)
            .or_else(|| row.default_building.clone().filter(|b| !b.is_empty()))
            .ok_or_else(|| "Building is required".to_string())?;

        let date_raw = self
            .get_string(row, DATE_ALIASES)
            .ok_or_else(|| "Date is required".to_string())?;
        let record_date = parse_date(&date_raw)
            .ok_or_else(|| format!("Invalid date format: {}", date_raw))?;

        Ok(ElectricRowInput {
            building_name,
            record_date,
            initial_meter_value: self.parse_decimal(row, INITIAL_ALIASES, "Initial meter value")?,
            final_meter_value: self.parse_decimal(row, FINAL_ALIASES, "Final meter value")?,
            kwh_value: self.parse_decimal(row, KWH_ALIASES, "KWh value")?,
        })
    }

    /// 提取字符串字段，支持多个可能的列名（别名）
    fn get_string(&self, row: &RawSheetRow, aliases: &[&str]) -> Option<String> {
        row.fields
            .iter()
            .filter(|(header, _)| aliases.contains(&normalize_header(header).as_str()))
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn parse_decimal(
        &self,
        row: &RawSheetRow,
        aliases: &[&str],
        label: &str,
    ) -> Result<Decimal, String> {
        let raw = self
            .get_string(row, aliases)
            .ok_or_else(|| format!("{} is required", label))?;
        parse_decimal_value(&raw).ok_or_else(|| format!("Invalid {}: {}", label.to_lowercase(), raw))
    }
}

/// 表头是否为楼宇列
pub fn is_building_header(header: &str) -> bool {
    BUILDING_ALIASES.contains(&normalize_header(header).as_str())
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// 支持科学计数法（Excel 数值单元格可能输出 1e5）
fn parse_decimal_value(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// 解析日期
///
/// # 支持格式
/// - Excel 序列号（1899-12-30 起算）
/// - %Y-%m-%d / %m/%d/%Y / %d/%m/%Y / %d.%m.%Y（按此顺序尝试）
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(serial) = raw.parse::<f64>() {
        return excel_serial_to_date(serial);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(TimeDelta::try_days(serial.trunc() as i64)?)
}
