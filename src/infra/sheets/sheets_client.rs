use super::sheet_requests::request_json;
use crate::core::sheets::{AppendResult, Row, SheetRequest, SheetsApi, SheetsError, ValueRange};
use crate::infra::google_auth::GoogleAuth;
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Default, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    #[serde(default)]
    updated_range: String,
    #[serde(default)]
    updated_rows: usize,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

/// Google Sheets v4 REST client bound to one spreadsheet.
pub struct GoogleSheetsClient {
    client: Client,
    auth: Arc<GoogleAuth>,
    spreadsheet_id: String,
    sheet_ids: DashMap<String, i64>,
}

impl GoogleSheetsClient {
    pub fn new(auth: Arc<GoogleAuth>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_ids: DashMap::new(),
        }
    }

    /// `.../spreadsheets/{id}/{segments...}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(SHEETS_API_BASE).map_err(|e| SheetsError::Api(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Api("Sheets base URL cannot have paths".to_string()))?
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SheetsError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| SheetsError::Api(e.to_string()))?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SheetsError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api(format!("{}: {}", status, body)));
        }
        response
            .json()
            .await
            .map_err(|e| SheetsError::Api(e.to_string()))
    }
}

/// Formatted values arrive as strings; anything else is rendered as JSON text.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn to_rows(values: Vec<Vec<Value>>) -> Vec<Row> {
    values
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect()
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError> {
        let url = self.url(&["values", range])?;
        let response: ValuesResponse = self
            .send(self.client.get(url).query(&[("valueRenderOption", "FORMATTED_VALUE")]))
            .await?;
        Ok(to_rows(response.values))
    }

    async fn update_values(&self, range: &str, rows: Vec<Row>) -> Result<(), SheetsError> {
        let url = self.url(&["values", range])?;
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        let _: Value = self
            .send(
                self.client
                    .put(url)
                    .query(&[("valueInputOption", "USER_ENTERED")])
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn batch_update_values(&self, data: Vec<ValueRange>) -> Result<(), SheetsError> {
        if data.is_empty() {
            return Ok(());
        }
        let url = self.url(&["values:batchUpdate"])?;
        let data: Vec<Value> = data
            .into_iter()
            .map(|range| json!({ "range": range.range, "values": range.values }))
            .collect();
        let body = json!({ "valueInputOption": "USER_ENTERED", "data": data });
        let _: Value = self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn append_values(&self, range: &str, rows: Vec<Row>) -> Result<AppendResult, SheetsError> {
        let segment = format!("{}:append", range);
        let url = self.url(&["values", segment.as_str()])?;
        let body = json!({ "majorDimension": "ROWS", "values": rows });
        let response: AppendResponse = self
            .send(
                self.client
                    .post(url)
                    .query(&[
                        ("valueInputOption", "USER_ENTERED"),
                        ("insertDataOption", "INSERT_ROWS"),
                    ])
                    .json(&body),
            )
            .await?;
        Ok(AppendResult {
            updated_range: response.updates.updated_range,
            updated_rows: response.updates.updated_rows,
        })
    }

    async fn batch_update(&self, requests: Vec<SheetRequest>) -> Result<(), SheetsError> {
        if requests.is_empty() {
            return Ok(());
        }
        // The spreadsheet id segment itself carries the `:batchUpdate` verb.
        let mut url = self.url(&[])?;
        let path = format!("{}:batchUpdate", url.path());
        url.set_path(&path);
        let body = json!({ "requests": requests.iter().map(request_json).collect::<Vec<_>>() });
        let _: Value = self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn sheet_id(&self, title: &str) -> Result<i64, SheetsError> {
        if let Some(id) = self.sheet_ids.get(title) {
            return Ok(*id);
        }
        let url = self.url(&[])?;
        let response: SpreadsheetResponse = self
            .send(self.client.get(url).query(&[("fields", "sheets.properties")]))
            .await?;
        for sheet in response.sheets {
            self.sheet_ids
                .insert(sheet.properties.title, sheet.properties.sheet_id);
        }
        self.sheet_ids
            .get(title)
            .map(|id| *id)
            .ok_or_else(|| SheetsError::SheetNotFound(title.to_string()))
    }
}
