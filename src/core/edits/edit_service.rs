use super::cell_edit::{CellEdit, EditOutcome};
use crate::core::accounts::{AccountError, AccountService, PropertyStore};
use crate::core::sheets::sheet_models::new_asset_groups;
use crate::core::sheets::sheet_rows::{cell, padded, row_range};
use crate::core::sheets::{RowStatus, SheetName, SheetsApi, SheetsError, SHEET_HEADER_SIZE};
use crate::core::validation::dropdowns::cascade_columns;
use crate::core::validation::{check_asset_group_row, dropdown_requests};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

/// Reacts to single-cell edits: keeps the account index current, maintains
/// the dependent dropdowns and re-runs the asset check on new asset groups.
pub struct EditService<P, S: ?Sized> {
    accounts: Arc<AccountService<P, S>>,
    sheets: Arc<S>,
}

impl<P: PropertyStore, S: SheetsApi + ?Sized> EditService<P, S> {
    pub fn new(accounts: Arc<AccountService<P, S>>, sheets: Arc<S>) -> Self {
        Self { accounts, sheets }
    }

    pub async fn handle_edit(&self, edit: &CellEdit) -> Result<Vec<EditOutcome>, EditError> {
        let Some(sheet) = SheetName::from_title(&edit.sheet) else {
            return Ok(vec![EditOutcome::Ignored("sheet is not managed")]);
        };
        if edit.row <= SHEET_HEADER_SIZE || edit.column == 0 || edit.column > sheet.width() {
            return Ok(vec![EditOutcome::Ignored("edit outside the data area")]);
        }
        let column = edit.column - 1;
        let values = self.row_values(sheet, edit, column).await?;

        if sheet.is_list_sheet() {
            let changed = self
                .accounts
                .patch_from_edit(sheet, column, &edit.old_value, &values)
                .await?;
            return Ok(vec![EditOutcome::IndexPatched { changed }]);
        }

        // Status lives in column A of every input sheet.
        if RowStatus::is_uploaded(cell(&values, 0)) {
            return Ok(vec![EditOutcome::Ignored("row already uploaded")]);
        }

        let mut outcomes = Vec::new();
        if let Some(cols) = cascade_columns(sheet) {
            if column == cols.customer || column == cols.campaign {
                let index = self.accounts.load_index().await?;
                let sheet_id = self.sheets.sheet_id(sheet.title()).await?;
                let requests =
                    dropdown_requests(sheet, sheet_id, edit.row - 1, column, &values, &index);
                let count = requests.len();
                if count > 0 {
                    self.sheets.batch_update(requests).await?;
                }
                outcomes.push(EditOutcome::DropdownsUpdated { requests: count });
            }
        }

        if sheet == SheetName::NewAssetGroups && column != new_asset_groups::MESSAGE {
            let check = check_asset_group_row(&values);
            self.sheets
                .batch_update_values(check.cell_updates(edit.row))
                .await?;
            outcomes.push(EditOutcome::AssetCheck {
                complete: check.is_complete(),
            });
        }

        tracing::debug!(sheet = %sheet, row = edit.row, column = edit.column, ?outcomes, "Handled cell edit");
        Ok(outcomes)
    }

    /// The edited row with the new value in place.
    async fn row_values(
        &self,
        sheet: SheetName,
        edit: &CellEdit,
        column: usize,
    ) -> Result<Vec<String>, SheetsError> {
        let current = match &edit.row_values {
            Some(values) => values.clone(),
            None => {
                let range = row_range(sheet, edit.row, 0, sheet.width() - 1);
                self.sheets
                    .get_values(&range)
                    .await?
                    .into_iter()
                    .next()
                    .unwrap_or_default()
            }
        };
        let mut values = padded(&current, sheet.width());
        values[column] = edit.new_value.clone();
        Ok(values)
    }
}
