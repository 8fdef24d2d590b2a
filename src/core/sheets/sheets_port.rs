use super::sheet_rows::{parse_cell_ref, Row};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Sheets API error: {0}")]
    Api(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

/// Result of a `values.append` call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppendResult {
    /// A1 range the rows landed in, e.g. `Assets!A12:L14`.
    pub updated_range: String,
    pub updated_rows: usize,
}

impl AppendResult {
    /// 1-based sheet row of the first appended row.
    pub fn first_row(&self) -> Option<usize> {
        let start = self.updated_range.split(':').next()?;
        parse_cell_ref(start).map(|(_, row)| row)
    }
}

/// One range of a `values.batchUpdate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRange {
    pub range: String,
    pub values: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Formula(String),
}

/// Structural edits sent through `spreadsheets.batchUpdate`. Rows and columns
/// are zero-based grid indexes.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetRequest {
    SetCell {
        sheet_id: i64,
        row: usize,
        column: usize,
        value: CellValue,
    },
    Checkbox {
        sheet_id: i64,
        row: usize,
        column: usize,
    },
    /// `ONE_OF_LIST` validation with the in-cell dropdown, not strict.
    Dropdown {
        sheet_id: i64,
        row: usize,
        column: usize,
        options: Vec<String>,
    },
    ClearValidation {
        sheet_id: i64,
        row: usize,
        column: usize,
    },
    /// Ascending sort of the data area (below the header) by the given columns.
    Sort {
        sheet_id: i64,
        start_row: usize,
        start_column: usize,
        end_column: usize,
        sort_columns: Vec<usize>,
    },
}

#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError>;

    async fn update_values(&self, range: &str, rows: Vec<Row>) -> Result<(), SheetsError>;

    async fn batch_update_values(&self, data: Vec<ValueRange>) -> Result<(), SheetsError>;

    async fn append_values(&self, range: &str, rows: Vec<Row>)
        -> Result<AppendResult, SheetsError>;

    async fn batch_update(&self, requests: Vec<SheetRequest>) -> Result<(), SheetsError>;

    /// Numeric id of the tab with this title.
    async fn sheet_id(&self, title: &str) -> Result<i64, SheetsError>;
}
