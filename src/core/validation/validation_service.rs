use super::asset_check::check_asset_group_row;
use crate::core::sheets::sheet_models::new_asset_groups;
use crate::core::sheets::sheet_rows::{cell, non_blank, sheet_row_number};
use crate::core::sheets::{RowStatus, SheetName, SheetsApi, SheetsError};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationSummary {
    pub checked: usize,
    pub incomplete: usize,
}

/// Re-runs the minimum-asset check over every pending NewAssetGroups row.
pub struct ValidationService<S: ?Sized> {
    sheets: Arc<S>,
}

impl<S: SheetsApi + ?Sized> ValidationService<S> {
    pub fn new(sheets: Arc<S>) -> Self {
        Self { sheets }
    }

    pub async fn validate_asset_groups(&self) -> Result<ValidationSummary, SheetsError> {
        let rows = self
            .sheets
            .get_values(&SheetName::NewAssetGroups.range())
            .await?;

        let mut summary = ValidationSummary::default();
        let mut updates = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if RowStatus::is_uploaded(cell(row, new_asset_groups::STATUS))
                || non_blank(row, new_asset_groups::ASSET_GROUP_NAME).is_none()
            {
                continue;
            }
            let check = check_asset_group_row(row);
            summary.checked += 1;
            if !check.is_complete() {
                summary.incomplete += 1;
            }
            updates.extend(check.cell_updates(sheet_row_number(i)));
        }

        if !updates.is_empty() {
            self.sheets.batch_update_values(updates).await?;
        }
        tracing::info!(
            checked = summary.checked,
            incomplete = summary.incomplete,
            "Validated new asset groups"
        );
        Ok(summary)
    }
}
