pub mod sheet_models;
pub mod sheet_rows;
pub mod sheets_port;

#[cfg(test)]
pub mod testing;

pub use sheet_models::{AssetType, RowStatus, SheetName, SHEET_HEADER_SIZE};
pub use sheet_rows::Row;
pub use sheets_port::{AppendResult, CellValue, SheetRequest, SheetsApi, SheetsError, ValueRange};
