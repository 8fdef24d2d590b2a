use serde::{Deserialize, Serialize};

/// One edited cell, as reported by the spreadsheet's edit trigger. `row` and
/// `column` are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEdit {
    pub sheet: String,
    pub row: usize,
    pub column: usize,
    #[serde(default)]
    pub old_value: String,
    #[serde(default)]
    pub new_value: String,
    /// Values of the whole row after the edit, when the caller has them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Ignored(&'static str),
    IndexPatched { changed: bool },
    DropdownsUpdated { requests: usize },
    AssetCheck { complete: bool },
}
