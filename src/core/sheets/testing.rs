// In-memory spreadsheet used by the service tests.

use super::sheet_rows::{column_letter, parse_cell_ref, Row};
use super::sheets_port::{
    AppendResult, CellValue, SheetRequest, SheetsApi, SheetsError, ValueRange,
};
use super::{SheetName, SHEET_HEADER_SIZE};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeSheets {
    /// Whole grid per tab; index 0 is sheet row 1.
    grids: Mutex<HashMap<String, Vec<Row>>>,
    ids: Mutex<Vec<String>>,
    requests: Mutex<Vec<SheetRequest>>,
}

pub fn row(values: &[&str]) -> Row {
    values.iter().map(|v| v.to_string()).collect()
}

fn trim_row(mut row: Row) -> Row {
    while row.last().map(|c| c.is_empty()).unwrap_or(false) {
        row.pop();
    }
    row
}

impl FakeSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the data rows (sheet row 6 onwards) of a tab.
    pub fn with_rows(self, sheet: SheetName, rows: Vec<Row>) -> Self {
        {
            let mut grids = self.grids.lock().unwrap();
            let grid = grids.entry(sheet.title().to_string()).or_default();
            grid.resize(SHEET_HEADER_SIZE, Row::new());
            grid.extend(rows);
        }
        self
    }

    pub fn data_rows(&self, sheet: SheetName) -> Vec<Row> {
        let grids = self.grids.lock().unwrap();
        grids
            .get(sheet.title())
            .map(|grid| {
                grid.iter()
                    .skip(SHEET_HEADER_SIZE)
                    .cloned()
                    .map(trim_row)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Value of a cell by 1-based row and zero-based column.
    pub fn cell(&self, title: &str, sheet_row: usize, column: usize) -> String {
        let grids = self.grids.lock().unwrap();
        grids
            .get(title)
            .and_then(|grid| grid.get(sheet_row - 1))
            .and_then(|row| row.get(column))
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<SheetRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn write(&self, range: &str, rows: Vec<Row>) -> Result<(), SheetsError> {
        let (title, start) = range
            .split_once('!')
            .ok_or_else(|| SheetsError::Api(format!("bad range {}", range)))?;
        let first = start.split(':').next().unwrap_or(start);
        let (column, sheet_row) =
            parse_cell_ref(first).ok_or_else(|| SheetsError::Api(format!("bad range {}", range)))?;

        let mut grids = self.grids.lock().unwrap();
        let grid = grids.entry(title.to_string()).or_default();
        for (offset, values) in rows.into_iter().enumerate() {
            let index = sheet_row - 1 + offset;
            if grid.len() <= index {
                grid.resize(index + 1, Row::new());
            }
            let target = &mut grid[index];
            for (col_offset, value) in values.into_iter().enumerate() {
                let col = column + col_offset;
                if target.len() <= col {
                    target.resize(col + 1, String::new());
                }
                target[col] = value;
            }
        }
        Ok(())
    }

    fn title_for_id(&self, sheet_id: i64) -> String {
        self.ids.lock().unwrap()[sheet_id as usize].clone()
    }
}

#[async_trait]
impl SheetsApi for FakeSheets {
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError> {
        let (title, area) = range.split_once('!').unwrap_or((range, "A1"));
        let start = area.split(':').next().unwrap_or(area);
        let (column, sheet_row) = parse_cell_ref(start).unwrap_or((0, 1));
        let grids = self.grids.lock().unwrap();
        let Some(grid) = grids.get(title) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<Row> = grid
            .iter()
            .skip(sheet_row - 1)
            .map(|r| trim_row(r.iter().skip(column).cloned().collect()))
            .collect();
        while rows.last().map(|r| r.is_empty()).unwrap_or(false) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn update_values(&self, range: &str, rows: Vec<Row>) -> Result<(), SheetsError> {
        self.write(range, rows)
    }

    async fn batch_update_values(&self, data: Vec<ValueRange>) -> Result<(), SheetsError> {
        for range in data {
            self.write(&range.range, range.values)?;
        }
        Ok(())
    }

    async fn append_values(
        &self,
        range: &str,
        rows: Vec<Row>,
    ) -> Result<AppendResult, SheetsError> {
        let title = range.split('!').next().unwrap_or(range).to_string();
        let next_row = {
            let grids = self.grids.lock().unwrap();
            let used = grids
                .get(&title)
                .map(|grid| {
                    grid.iter()
                        .rposition(|r| r.iter().any(|c| !c.is_empty()))
                        .map(|i| i + 1)
                        .unwrap_or(0)
                })
                .unwrap_or(0);
            used.max(SHEET_HEADER_SIZE) + 1
        };
        let count = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
        self.write(&format!("{}!A{}", title, next_row), rows)?;
        Ok(AppendResult {
            updated_range: format!(
                "{}!A{}:{}{}",
                title,
                next_row,
                column_letter(width - 1),
                next_row + count.saturating_sub(1)
            ),
            updated_rows: count,
        })
    }

    async fn batch_update(&self, requests: Vec<SheetRequest>) -> Result<(), SheetsError> {
        for request in &requests {
            if let SheetRequest::SetCell {
                sheet_id,
                row,
                column,
                value,
            } = request
            {
                let text = match value {
                    CellValue::Text(t) | CellValue::Formula(t) => t.clone(),
                };
                let title = self.title_for_id(*sheet_id);
                let range = format!("{}!{}{}", title, column_letter(*column), row + 1);
                self.write(&range, vec![vec![text]])?;
            }
        }
        self.requests.lock().unwrap().extend(requests);
        Ok(())
    }

    async fn sheet_id(&self, title: &str) -> Result<i64, SheetsError> {
        let mut ids = self.ids.lock().unwrap();
        let index = match ids.iter().position(|t| t == title) {
            Some(index) => index,
            None => {
                ids.push(title.to_string());
                ids.len() - 1
            }
        };
        Ok(index as i64)
    }
}
