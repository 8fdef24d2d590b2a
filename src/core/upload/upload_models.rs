use crate::core::accounts::CreatedEntity;
use crate::core::ads::AdsError;
use crate::core::sheets::sheet_rows::{cell_range, sheet_row_number};
use crate::core::sheets::{RowStatus, SheetName, SheetsError, ValueRange};
use std::collections::BTreeMap;
use thiserror::Error;

/// Failures that stop the pipeline. Problems with individual rows are written
/// back to the sheet instead.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Sheets(#[from] SheetsError),
    #[error(transparent)]
    Ads(#[from] AdsError),
}

/// Outcome for one sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    pub status: RowStatus,
    pub message: String,
    /// Resource name to store in the row, when the sheet has a column for it.
    pub resource: Option<String>,
}

impl RowResult {
    pub fn uploaded(resource: Option<String>) -> Self {
        Self {
            status: RowStatus::Uploaded,
            message: String::new(),
            resource,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: RowStatus::Error,
            message: message.into(),
            resource: None,
        }
    }

    pub fn removed() -> Self {
        Self {
            status: RowStatus::Removed,
            message: String::new(),
            resource: Some(String::new()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == RowStatus::Error
    }
}

/// Row results keyed by zero-based data row index.
pub type RowResults = BTreeMap<usize, RowResult>;

/// Where a sheet keeps its status, message and resource cells.
#[derive(Debug, Clone, Copy)]
pub struct ResultColumns {
    pub status: usize,
    pub message: usize,
    pub resource: Option<usize>,
}

pub fn result_updates(sheet: SheetName, columns: ResultColumns, results: &RowResults) -> Vec<ValueRange> {
    let mut updates = Vec::new();
    for (&index, result) in results {
        let sheet_row = sheet_row_number(index);
        updates.push(ValueRange {
            range: cell_range(sheet, sheet_row, columns.status),
            values: vec![vec![result.status.to_string()]],
        });
        updates.push(ValueRange {
            range: cell_range(sheet, sheet_row, columns.message),
            values: vec![vec![result.message.clone()]],
        });
        if let (Some(column), Some(resource)) = (columns.resource, &result.resource) {
            updates.push(ValueRange {
                range: cell_range(sheet, sheet_row, column),
                values: vec![vec![resource.clone()]],
            });
        }
    }
    updates
}

pub const EMPTY_RESOURCE_MESSAGE: &str = "Not removed: the resource name cell is empty";

/// Message-only write for an uploaded row whose delete box is checked but
/// whose resource cell is empty. The status cell is left alone so the row is
/// not uploaded again.
pub fn empty_resource_note(sheet: SheetName, message_column: usize, index: usize) -> ValueRange {
    let sheet_row = sheet_row_number(index);
    tracing::warn!(sheet = %sheet, row = sheet_row, "Delete box checked but the resource name is empty");
    ValueRange {
        range: cell_range(sheet, sheet_row, message_column),
        values: vec![vec![EMPTY_RESOURCE_MESSAGE.to_string()]],
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub uploaded: usize,
    pub removed: usize,
    pub failed: usize,
}

impl StepReport {
    pub fn from_results(results: &RowResults) -> Self {
        let mut report = Self::default();
        for result in results.values() {
            match result.status {
                RowStatus::Uploaded => report.uploaded += 1,
                RowStatus::Removed => report.removed += 1,
                RowStatus::Error => report.failed += 1,
            }
        }
        report
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    pub created: Vec<CreatedEntity>,
    pub campaigns: StepReport,
    pub asset_groups: StepReport,
    pub assets: StepReport,
    pub sitelinks: StepReport,
}

impl UploadReport {
    pub fn rows_uploaded(&self) -> usize {
        self.steps().map(|s| s.uploaded + s.removed).sum()
    }

    pub fn rows_failed(&self) -> usize {
        self.steps().map(|s| s.failed).sum()
    }

    fn steps(&self) -> impl Iterator<Item = &StepReport> {
        [&self.campaigns, &self.asset_groups, &self.assets, &self.sitelinks].into_iter()
    }
}
