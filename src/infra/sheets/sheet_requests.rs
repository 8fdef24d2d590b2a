// JSON bodies for `spreadsheets.batchUpdate`.

use crate::core::sheets::{CellValue, SheetRequest};
use serde_json::{json, Value};

fn grid_range(sheet_id: i64, row: usize, column: usize) -> Value {
    json!({
        "sheetId": sheet_id,
        "startRowIndex": row,
        "endRowIndex": row + 1,
        "startColumnIndex": column,
        "endColumnIndex": column + 1,
    })
}

fn set_validation(sheet_id: i64, row: usize, column: usize, rule: Option<Value>) -> Value {
    let mut body = json!({ "range": grid_range(sheet_id, row, column) });
    if let Some(rule) = rule {
        body["rule"] = rule;
    }
    json!({ "setDataValidation": body })
}

pub fn request_json(request: &SheetRequest) -> Value {
    match request {
        SheetRequest::SetCell {
            sheet_id,
            row,
            column,
            value,
        } => {
            let entered = match value {
                CellValue::Text(text) => json!({ "stringValue": text }),
                CellValue::Formula(formula) => json!({ "formulaValue": formula }),
            };
            json!({
                "updateCells": {
                    "range": grid_range(*sheet_id, *row, *column),
                    "rows": [{ "values": [{ "userEnteredValue": entered }] }],
                    "fields": "userEnteredValue",
                }
            })
        }
        SheetRequest::Checkbox {
            sheet_id,
            row,
            column,
        } => set_validation(
            *sheet_id,
            *row,
            *column,
            Some(json!({ "condition": { "type": "BOOLEAN" } })),
        ),
        SheetRequest::Dropdown {
            sheet_id,
            row,
            column,
            options,
        } => {
            let values: Vec<Value> = options
                .iter()
                .map(|option| json!({ "userEnteredValue": option }))
                .collect();
            set_validation(
                *sheet_id,
                *row,
                *column,
                Some(json!({
                    "condition": { "type": "ONE_OF_LIST", "values": values },
                    "showCustomUi": true,
                    "strict": false,
                })),
            )
        }
        SheetRequest::ClearValidation {
            sheet_id,
            row,
            column,
        } => set_validation(*sheet_id, *row, *column, None),
        SheetRequest::Sort {
            sheet_id,
            start_row,
            start_column,
            end_column,
            sort_columns,
        } => {
            let specs: Vec<Value> = sort_columns
                .iter()
                .map(|column| json!({ "dimensionIndex": column, "sortOrder": "ASCENDING" }))
                .collect();
            json!({
                "sortRange": {
                    "range": {
                        "sheetId": sheet_id,
                        "startRowIndex": start_row,
                        "startColumnIndex": start_column,
                        "endColumnIndex": end_column,
                    },
                    "sortSpecs": specs,
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropdown_is_not_strict() {
        let body = request_json(&SheetRequest::Dropdown {
            sheet_id: 4,
            row: 9,
            column: 3,
            options: vec!["Summer".to_string()],
        });
        let validation = &body["setDataValidation"];
        assert_eq!(validation["range"]["startRowIndex"], 9);
        assert_eq!(validation["range"]["endColumnIndex"], 4);
        assert_eq!(validation["rule"]["condition"]["type"], "ONE_OF_LIST");
        assert_eq!(validation["rule"]["condition"]["values"][0]["userEnteredValue"], "Summer");
        assert_eq!(validation["rule"]["strict"], false);
    }

    #[test]
    fn test_clear_validation_has_no_rule() {
        let body = request_json(&SheetRequest::ClearValidation {
            sheet_id: 1,
            row: 6,
            column: 0,
        });
        assert!(body["setDataValidation"].get("rule").is_none());
    }

    #[test]
    fn test_formula_cell_and_sort() {
        let body = request_json(&SheetRequest::SetCell {
            sheet_id: 2,
            row: 7,
            column: 5,
            value: CellValue::Formula("=IMAGE(G8)".to_string()),
        });
        assert_eq!(
            body["updateCells"]["rows"][0]["values"][0]["userEnteredValue"]["formulaValue"],
            "=IMAGE(G8)"
        );

        let body = request_json(&SheetRequest::Sort {
            sheet_id: 2,
            start_row: 5,
            start_column: 0,
            end_column: 12,
            sort_columns: vec![0, 3],
        });
        assert_eq!(body["sortRange"]["sortSpecs"][1]["dimensionIndex"], 3);
        assert!(body["sortRange"]["range"].get("endRowIndex").is_none());
    }
}
