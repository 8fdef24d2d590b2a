// Dependent dropdowns: customer → campaign → asset group.

use crate::core::accounts::AccountIndex;
use crate::core::sheets::sheet_models::{assets, new_asset_groups, sitelinks};
use crate::core::sheets::sheet_rows::cell;
use crate::core::sheets::{CellValue, SheetName, SheetRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeColumns {
    pub customer: usize,
    pub campaign: usize,
    pub asset_group: Option<usize>,
}

pub fn cascade_columns(sheet: SheetName) -> Option<CascadeColumns> {
    match sheet {
        SheetName::Assets => Some(CascadeColumns {
            customer: assets::CUSTOMER_NAME,
            campaign: assets::CAMPAIGN_NAME,
            asset_group: Some(assets::ASSET_GROUP_NAME),
        }),
        SheetName::NewAssetGroups => Some(CascadeColumns {
            customer: new_asset_groups::CUSTOMER_NAME,
            campaign: new_asset_groups::CAMPAIGN_NAME,
            asset_group: None,
        }),
        SheetName::Sitelinks => Some(CascadeColumns {
            customer: sitelinks::CUSTOMER_NAME,
            campaign: sitelinks::CAMPAIGN_NAME,
            asset_group: None,
        }),
        _ => None,
    }
}

fn options_request(sheet_id: i64, row: usize, column: usize, options: &[String]) -> SheetRequest {
    if options.is_empty() {
        SheetRequest::ClearValidation {
            sheet_id,
            row,
            column,
        }
    } else {
        SheetRequest::Dropdown {
            sheet_id,
            row,
            column,
            options: options.to_vec(),
        }
    }
}

fn clear_value(sheet_id: i64, row: usize, column: usize) -> SheetRequest {
    SheetRequest::SetCell {
        sheet_id,
        row,
        column,
        value: CellValue::Text(String::new()),
    }
}

/// Requests that follow an edit of `column` (zero-based) on grid row `row`.
/// `values` is the row after the edit.
pub fn dropdown_requests(
    sheet: SheetName,
    sheet_id: i64,
    row: usize,
    column: usize,
    values: &[String],
    index: &AccountIndex,
) -> Vec<SheetRequest> {
    let Some(cols) = cascade_columns(sheet) else {
        return Vec::new();
    };
    let customer = cell(values, cols.customer).trim();
    let mut requests = Vec::new();

    if column == cols.customer {
        let campaigns = index.campaigns_for(customer);
        requests.push(options_request(sheet_id, row, cols.campaign, campaigns));
        requests.push(clear_value(sheet_id, row, cols.campaign));
        if let Some(group_column) = cols.asset_group {
            requests.push(clear_value(sheet_id, row, group_column));
            requests.push(SheetRequest::ClearValidation {
                sheet_id,
                row,
                column: group_column,
            });
        }
    } else if column == cols.campaign {
        if let Some(group_column) = cols.asset_group {
            let campaign = cell(values, cols.campaign).trim();
            let groups = index.asset_groups_for(customer, campaign);
            requests.push(options_request(sheet_id, row, group_column, groups));
            requests.push(clear_value(sheet_id, row, group_column));
        }
    }
    requests
}

/// Full set of dropdowns for a row that is already filled in, used when rows
/// are appended by a refresh.
pub fn row_dropdowns(
    sheet: SheetName,
    sheet_id: i64,
    row: usize,
    values: &[String],
    index: &AccountIndex,
) -> Vec<SheetRequest> {
    let Some(cols) = cascade_columns(sheet) else {
        return Vec::new();
    };
    let customer = cell(values, cols.customer).trim();
    let campaign = cell(values, cols.campaign).trim();

    let mut requests = vec![
        options_request(sheet_id, row, cols.customer, index.customers()),
        options_request(sheet_id, row, cols.campaign, index.campaigns_for(customer)),
    ];
    if let Some(group_column) = cols.asset_group {
        requests.push(options_request(
            sheet_id,
            row,
            group_column,
            index.asset_groups_for(customer, campaign),
        ));
    }
    requests
}
