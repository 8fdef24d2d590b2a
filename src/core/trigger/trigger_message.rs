// Messages that start a unit of work, as published by the sheet's menu items
// and edit trigger.

use crate::core::edits::CellEdit;
use crate::core::refresh::RefreshScope;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const EDIT_TYPE: &str = "EDIT";

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Unknown trigger message: {0}")]
    Unknown(String),

    #[error("Invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Message payload is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerMessage {
    Refresh(RefreshScope),
    Upload,
    RebuildIndex,
    ValidateAssetGroups,
    Edit(CellEdit),
}

#[derive(Serialize, Deserialize)]
struct EditPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    edit: CellEdit,
}

impl TriggerMessage {
    /// Parses a keyword (`REFRESH`, `UPLOAD`, ...) or an edit object.
    /// Keywords are trimmed and case-insensitive.
    pub fn parse(data: &str) -> Result<Self, TriggerError> {
        let data = data.trim();
        if data.starts_with('{') {
            let payload: EditPayload = serde_json::from_str(data)?;
            if !payload.kind.trim().eq_ignore_ascii_case(EDIT_TYPE) {
                return Err(TriggerError::Unknown(payload.kind));
            }
            return Ok(TriggerMessage::Edit(payload.edit));
        }

        let message = match data.to_ascii_uppercase().as_str() {
            "REFRESH" => TriggerMessage::Refresh(RefreshScope::All),
            "REFRESH_CUSTOMERS" => TriggerMessage::Refresh(RefreshScope::Customers),
            "REFRESH_CAMPAIGNS" => TriggerMessage::Refresh(RefreshScope::Campaigns),
            "REFRESH_ASSET_GROUPS" => TriggerMessage::Refresh(RefreshScope::AssetGroups),
            "REFRESH_ASSETS" => TriggerMessage::Refresh(RefreshScope::Assets),
            "REFRESH_SITELINKS" => TriggerMessage::Refresh(RefreshScope::Sitelinks),
            "UPLOAD" => TriggerMessage::Upload,
            "REBUILD_INDEX" => TriggerMessage::RebuildIndex,
            "VALIDATE_ASSET_GROUPS" => TriggerMessage::ValidateAssetGroups,
            _ => return Err(TriggerError::Unknown(data.to_string())),
        };
        Ok(message)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            TriggerMessage::Refresh(RefreshScope::All) => "REFRESH",
            TriggerMessage::Refresh(RefreshScope::Customers) => "REFRESH_CUSTOMERS",
            TriggerMessage::Refresh(RefreshScope::Campaigns) => "REFRESH_CAMPAIGNS",
            TriggerMessage::Refresh(RefreshScope::AssetGroups) => "REFRESH_ASSET_GROUPS",
            TriggerMessage::Refresh(RefreshScope::Assets) => "REFRESH_ASSETS",
            TriggerMessage::Refresh(RefreshScope::Sitelinks) => "REFRESH_SITELINKS",
            TriggerMessage::Upload => "UPLOAD",
            TriggerMessage::RebuildIndex => "REBUILD_INDEX",
            TriggerMessage::ValidateAssetGroups => "VALIDATE_ASSET_GROUPS",
            TriggerMessage::Edit(_) => EDIT_TYPE,
        }
    }

    /// Wire form, the inverse of `parse`.
    pub fn encode(&self) -> Result<String, TriggerError> {
        match self {
            TriggerMessage::Edit(edit) => Ok(serde_json::to_string(&EditPayload {
                kind: EDIT_TYPE.to_string(),
                edit: edit.clone(),
            })?),
            other => Ok(other.keyword().to_string()),
        }
    }
}

impl fmt::Display for TriggerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerMessage::Edit(edit) => write!(f, "EDIT {}!R{}C{}", edit.sheet, edit.row, edit.column),
            other => f.write_str(other.keyword()),
        }
    }
}

/// Body of a Pub/Sub push request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64 encoded payload.
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub message_id: Option<String>,
}

pub fn decode_data(data: &str) -> Result<String, TriggerError> {
    let bytes = BASE64.decode(data.trim())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn decode_push(body: &str) -> Result<TriggerMessage, TriggerError> {
    let envelope: PushEnvelope = serde_json::from_str(body)?;
    TriggerMessage::parse(&decode_data(&envelope.message.data)?)
}
