// ==========================================
// 校园碳足迹核算系统 - 导入层
// ==========================================
// 职责: 外部电表读数导入,生成 electric_record
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod electricity_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use electricity_importer::{ElectricityImporter, ImportReport};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ElectricRowInput, FieldMapper};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawSheetRow, UniversalFileParser};
