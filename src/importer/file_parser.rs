// ==========================================
// 校园碳足迹核算系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls，逐工作表) / CSV (.csv)
// 行号与表格软件一致: 表头为第 1 行，首条数据为第 2 行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::is_building_header;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// RawSheetRow - 原始行记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSheetRow {
    /// 工作表名（CSV 为文件名）
    pub sheet: String,
    /// 表格中的行号
    pub row_number: usize,
    /// 行内未给出楼宇列时使用的楼宇名（Excel 为工作表名）
    pub default_building: Option<String>,
    /// 表头 → 单元格值（已去除首尾空白）
    pub fields: HashMap<String, String>,
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录，完全空白的行不返回
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawSheetRow>>;
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawSheetRow>> {
        let path = file_path;
        check_exists(path)?;

        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let sheet = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        // CSV 无工作表名可借用，楼宇必须来自列
        if !headers.iter().any(|h| is_building_header(h)) {
            return Err(ImportError::MissingColumn("building".to_string()));
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut fields = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            // 空行被 csv 跳过，行号取记录在文件中的实际位置
            let row_number = record
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(idx + 2);

            rows.push(RawSheetRow {
                sheet: sheet.clone(),
                row_number,
                default_building: None,
                fields,
            });
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawSheetRow>> {
        let path = file_path;
        check_exists(path)?;

        let ext = extension_of(path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError(
                "Excel 文件无工作表".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name)?;
            // 区域可能不从 A1 开始
            let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

            let mut sheet_rows = range.rows();
            let headers: Vec<String> = match sheet_rows.next() {
                Some(header_row) => header_row.iter().map(cell_to_string).collect(),
                None => {
                    tracing::debug!(sheet = %sheet_name, "空工作表，跳过");
                    continue;
                }
            };

            for (idx, data_row) in sheet_rows.enumerate() {
                let mut fields = HashMap::new();
                for (col_idx, cell) in data_row.iter().enumerate() {
                    if let Some(header) = headers.get(col_idx) {
                        fields.insert(header.clone(), cell_to_string(cell));
                    }
                }

                if fields.values().all(|v| v.is_empty()) {
                    continue;
                }

                rows.push(RawSheetRow {
                    sheet: sheet_name.clone(),
                    row_number: first_row + idx + 2,
                    default_building: Some(sheet_name.trim().to_string()),
                    fields,
                });
            }
        }

        Ok(rows)
    }
}

// 日期单元格保留序列号，交由字段映射统一解析
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawSheetRow>> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvParser.parse_to_raw_rows(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_rows(path),
            ext => Err(ImportError::UnsupportedFormat(ext.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = csv_file(&[
            "Building,Date,Initial Meter Value,Final Meter Value,KWh Value",
            "Library,2024-01-15,100,150,2",
            "Gym,2024-01-20,10,30,1",
        ]);

        let rows = CsvParser.parse_to_raw_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].fields.get("Building"), Some(&"Library".to_string()));
        assert_eq!(rows[1].fields.get("KWh Value"), Some(&"1".to_string()));
        assert!(rows[0].default_building.is_none());
    }

    #[test]
    fn test_csv_parser_skip_empty_rows_keeps_row_numbers() {
        let file = csv_file(&[
            "building,date,initial,final,kwh",
            "Library,2024-01-15,100,150,2",
            ",,,,",
            "Gym,2024-02-15,10,30,1",
        ]);

        let rows = CsvParser.parse_to_raw_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn test_csv_parser_blank_lines_keep_file_line_numbers() {
        let file = csv_file(&[
            "building,date,initial,final,kwh",
            "Library,2024-01-15,100,150,2",
            "",
            "Gym,2024-02-15,10,30,1",
        ]);

        let rows = CsvParser.parse_to_raw_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn test_csv_parser_requires_building_column() {
        let file = csv_file(&["date,initial,final,kwh", "2024-01-15,100,150,2"]);
        let err = CsvParser.parse_to_raw_rows(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(_)));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }
}
