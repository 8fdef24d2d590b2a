// Row helpers shared by every sheet-processing step.
//
// Rows come back from the Sheets API as `Vec<Vec<String>>` with trailing empty
// cells trimmed, so every access goes through `cell()`.

use super::sheet_models::{
    asset_group_list, assets, campaign_list, customer_list, new_asset_groups, new_campaigns,
    sitelinks, SheetName, SHEET_HEADER_SIZE,
};

pub type Row = Vec<String>;

/// Separator used in every composite lookup key.
pub const KEY_SEPARATOR: &str = ";";

pub fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Trimmed cell value, `None` when blank.
pub fn non_blank(row: &[String], column: usize) -> Option<&str> {
    let value = cell(row, column).trim();
    (!value.is_empty()).then_some(value)
}

pub fn is_checked(row: &[String], column: usize) -> bool {
    cell(row, column).trim().eq_ignore_ascii_case("TRUE")
}

pub fn join_key(parts: &[&str]) -> String {
    parts.join(KEY_SEPARATOR)
}

/// Lookup key of a row: the names identifying the entity the row refers to.
pub fn row_key(sheet: SheetName, row: &[String]) -> String {
    let columns: &[usize] = match sheet {
        SheetName::Customers => &[customer_list::CUSTOMER_NAME],
        SheetName::Campaigns => &[campaign_list::CUSTOMER_NAME, campaign_list::CAMPAIGN_NAME],
        SheetName::NewCampaigns => &[new_campaigns::CUSTOMER_NAME, new_campaigns::CAMPAIGN_NAME],
        SheetName::AssetGroups => &[
            asset_group_list::CUSTOMER_NAME,
            asset_group_list::CAMPAIGN_NAME,
            asset_group_list::ASSET_GROUP_NAME,
        ],
        SheetName::NewAssetGroups => &[
            new_asset_groups::CUSTOMER_NAME,
            new_asset_groups::CAMPAIGN_NAME,
            new_asset_groups::ASSET_GROUP_NAME,
        ],
        SheetName::Sitelinks => &[sitelinks::CUSTOMER_NAME, sitelinks::CAMPAIGN_NAME],
        SheetName::Assets => &[assets::CUSTOMER_NAME, assets::CAMPAIGN_NAME],
    };
    let parts: Vec<&str> = columns.iter().map(|&c| cell(row, c).trim()).collect();
    join_key(&parts)
}

/// Key of the asset group an Assets row targets.
pub fn asset_row_group_key(row: &[String]) -> String {
    join_key(&[
        cell(row, assets::CUSTOMER_NAME).trim(),
        cell(row, assets::CAMPAIGN_NAME).trim(),
        cell(row, assets::ASSET_GROUP_NAME).trim(),
    ])
}

pub fn find_row<'a>(rows: &'a [Row], sheet: SheetName, key: &str) -> Option<&'a Row> {
    rows.iter().find(|row| row_key(sheet, row) == key)
}

/// 1-based sheet row number of a data row index.
pub fn sheet_row_number(data_index: usize) -> usize {
    data_index + SHEET_HEADER_SIZE + 1
}

/// Zero-based grid row index (what batchUpdate requests expect) of a data row.
pub fn grid_row_index(data_index: usize) -> usize {
    data_index + SHEET_HEADER_SIZE
}

/// Converts a zero-based column index to its A1 letter(s).
pub fn column_letter(column: usize) -> String {
    let mut n = column + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1 range of a single cell, e.g. `NewCampaigns!A7`.
pub fn cell_range(sheet: SheetName, sheet_row: usize, column: usize) -> String {
    format!("{}!{}{}", sheet.title(), column_letter(column), sheet_row)
}

/// A1 range covering `first..=last` columns of one row.
pub fn row_range(sheet: SheetName, sheet_row: usize, first: usize, last: usize) -> String {
    format!(
        "{}!{}{}:{}{}",
        sheet.title(),
        column_letter(first),
        sheet_row,
        column_letter(last),
        sheet_row
    )
}

/// Parses a cell reference such as `L12` (optionally sheet-qualified) into a
/// zero-based column and 1-based row.
pub fn parse_cell_ref(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.rsplit('!').next()?.trim().trim_start_matches('$');
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let letters = letters.trim_end_matches('$');
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let column = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize);
    let row = digits.parse::<usize>().ok()?;
    Some((column - 1, row))
}

/// Pads a row to `width` so column writes line up.
pub fn padded(row: &[String], width: usize) -> Row {
    let mut out: Row = row.to_vec();
    if out.len() < width {
        out.resize(width, String::new());
    }
    out
}
