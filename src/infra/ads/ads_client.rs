// Google Ads REST client.
//
// Mutates go through `customers/{id}/googleAds:mutate`, queries through the
// paginated `googleAds:search`. Every request carries the developer token
// and the manager account id as `login-customer-id`.

use crate::core::ads::ads_models::GoogleAdsFailure;
use crate::core::ads::{AdsApi, AdsError, GoogleAdsRow, MutateOperation, MutateResponse};
use crate::infra::google_auth::GoogleAuth;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ADS_API_BASE: &str = "https://googleads.googleapis.com";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MutateRequest<'a> {
    mutate_operations: &'a [MutateOperation],
    partial_failure: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SearchResponse {
    results: Vec<GoogleAdsRow>,
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorStatus {
    message: String,
    details: Vec<GoogleAdsFailure>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorStatus,
}

/// Turns a non-2xx response body into an `AdsError`.
pub fn parse_failure(status: u16, body: &str) -> AdsError {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return AdsError::Api(format!("{}: {}", status, body));
    };
    let errors: Vec<String> = parsed
        .error
        .details
        .iter()
        .flat_map(|failure| failure.errors.iter().map(|e| e.message.clone()))
        .collect();
    if errors.is_empty() {
        return AdsError::Api(format!("{}: {}", status, parsed.error.message));
    }
    let request_id = parsed
        .error
        .details
        .iter()
        .find_map(|failure| failure.request_id.clone())
        .unwrap_or_default();
    AdsError::Failure { request_id, errors }
}

pub struct GoogleAdsClient {
    client: Client,
    auth: Arc<GoogleAuth>,
    api_version: String,
    developer_token: String,
    login_customer_id: String,
}

impl GoogleAdsClient {
    pub fn new(
        auth: Arc<GoogleAuth>,
        api_version: impl Into<String>,
        developer_token: impl Into<String>,
        login_customer_id: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            auth,
            api_version: api_version.into(),
            developer_token: developer_token.into(),
            login_customer_id: login_customer_id.into(),
        }
    }

    fn endpoint(&self, customer_id: &str, method: &str) -> String {
        format!(
            "{}/{}/customers/{}/googleAds:{}",
            ADS_API_BASE, self.api_version, customer_id, method
        )
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, AdsError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| AdsError::Api(e.to_string()))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header("developer-token", &self.developer_token)
            .header("login-customer-id", &self.login_customer_id)
            .json(body)
            .send()
            .await
            .map_err(|e| AdsError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_failure(status.as_u16(), &body));
        }
        response
            .json()
            .await
            .map_err(|e| AdsError::Api(e.to_string()))
    }
}

#[async_trait]
impl AdsApi for GoogleAdsClient {
    async fn mutate(
        &self,
        customer_id: &str,
        operations: &[MutateOperation],
        partial_failure: bool,
    ) -> Result<MutateResponse, AdsError> {
        let request = MutateRequest {
            mutate_operations: operations,
            partial_failure,
        };
        tracing::debug!(
            customer_id,
            operations = operations.len(),
            partial_failure,
            "Sending mutate request"
        );
        self.post(&self.endpoint(customer_id, "mutate"), &request)
            .await
    }

    async fn search(&self, customer_id: &str, query: &str) -> Result<Vec<GoogleAdsRow>, AdsError> {
        let url = self.endpoint(customer_id, "search");
        let mut rows = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let request = SearchRequest {
                query,
                page_token: page_token.as_deref(),
            };
            let page: SearchResponse = self.post(&url, &request).await?;
            rows.extend(page.results);
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(rows)
    }
}
