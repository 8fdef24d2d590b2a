// Runtime configuration.
//
// Everything is read from environment variables (a `.env` file is loaded by
// `main` first). The lookup is injectable so the parsing rules can be tested
// without touching the process environment.

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_ADS_API_VERSION: &str = "v17";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_PROPERTY_STORE_DIR: &str = "data";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Where OAuth credentials come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    /// Installed-app / user credentials with a long lived refresh token.
    AuthorizedUser {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    /// Path to a service account JSON key file.
    ServiceAccountKeyFile(PathBuf),
    /// Service account JSON content (for deployments without a filesystem).
    ServiceAccountJson(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PubSubConfig {
    pub project_id: String,
    pub topic: Option<String>,
    pub subscription: Option<String>,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub spreadsheet_id: String,
    pub developer_token: String,
    pub login_customer_id: String,
    pub customer_id_inclusion_list: Vec<String>,
    pub ads_api_version: String,
    pub credentials: CredentialSource,
    pub pubsub: Option<PubSubConfig>,
    pub property_store_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values behave like unset ones; .env templates often ship `KEY=`.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let spreadsheet_id = require("SPREADSHEET_ID")?;
        let developer_token = require("GOOGLE_ADS_DEVELOPER_TOKEN")?;

        let raw_login = require("GOOGLE_ADS_LOGIN_CUSTOMER_ID")?;
        let login_customer_id = normalize_customer_id(&raw_login);
        if login_customer_id.is_empty() || !login_customer_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Invalid {
                key: "GOOGLE_ADS_LOGIN_CUSTOMER_ID",
                value: raw_login,
            });
        }

        let customer_id_inclusion_list = get("GOOGLE_ADS_CUSTOMER_ID_INCLUSION_LIST")
            .map(|list| {
                list.split(',')
                    .map(normalize_customer_id)
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let ads_api_version =
            get("GOOGLE_ADS_API_VERSION").unwrap_or_else(|| DEFAULT_ADS_API_VERSION.to_string());

        let credentials = match (
            get("GOOGLE_CLIENT_ID"),
            get("GOOGLE_CLIENT_SECRET"),
            get("GOOGLE_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                CredentialSource::AuthorizedUser {
                    client_id,
                    client_secret,
                    refresh_token,
                }
            }
            _ => {
                if let Some(path) = get("GOOGLE_SERVICE_ACCOUNT_KEY") {
                    CredentialSource::ServiceAccountKeyFile(PathBuf::from(path))
                } else if let Some(json) = get("GOOGLE_SERVICE_ACCOUNT_JSON") {
                    CredentialSource::ServiceAccountJson(json)
                } else {
                    return Err(ConfigError::Missing("GOOGLE_REFRESH_TOKEN"));
                }
            }
        };

        let pubsub = match get("PUBSUB_PROJECT_ID") {
            Some(project_id) => {
                let poll_interval_secs = match get("PUBSUB_POLL_INTERVAL_SECS") {
                    Some(value) => value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                        key: "PUBSUB_POLL_INTERVAL_SECS",
                        value,
                    })?,
                    None => DEFAULT_POLL_INTERVAL_SECS,
                };
                Some(PubSubConfig {
                    project_id,
                    topic: get("PUBSUB_TOPIC"),
                    subscription: get("PUBSUB_SUBSCRIPTION"),
                    poll_interval_secs,
                })
            }
            None => None,
        };

        let property_store_dir = PathBuf::from(
            get("PROPERTY_STORE_DIR").unwrap_or_else(|| DEFAULT_PROPERTY_STORE_DIR.to_string()),
        );

        Ok(Self {
            spreadsheet_id,
            developer_token,
            login_customer_id,
            customer_id_inclusion_list,
            ads_api_version,
            credentials,
            pubsub,
            property_store_dir,
        })
    }
}

/// Google Ads ids are often copied from the UI as `123-456-7890`.
pub fn normalize_customer_id(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}
