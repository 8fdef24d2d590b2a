use super::ads_models::{GoogleAdsRow, MutateOperation, MutateResponse};
use async_trait::async_trait;
use thiserror::Error;

const IGNORED_ERROR_MESSAGE: &str = "Resource was not found.";

#[derive(Debug, Error)]
pub enum AdsError {
    #[error("Google Ads API error: {0}")]
    Api(String),

    /// The whole request was rejected.
    #[error("{}", failure_message(.request_id, .errors))]
    Failure {
        request_id: String,
        errors: Vec<String>,
    },
}

fn failure_message(request_id: &str, errors: &[String]) -> String {
    let mut message = format!(
        "Request with ID \"{}\" failed and includes the following errors:",
        request_id
    );
    for error in errors.iter().filter(|e| e.as_str() != IGNORED_ERROR_MESSAGE) {
        message.push_str(&format!("\n\tError message: \"{}\".", error));
    }
    message
}

#[async_trait]
pub trait AdsApi: Send + Sync {
    /// Sends one `googleAds:mutate` request for a customer.
    async fn mutate(
        &self,
        customer_id: &str,
        operations: &[MutateOperation],
        partial_failure: bool,
    ) -> Result<MutateResponse, AdsError>;

    /// Runs a GAQL query and returns the rows of every page.
    async fn search(&self, customer_id: &str, query: &str) -> Result<Vec<GoogleAdsRow>, AdsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_skips_not_found() {
        let error = AdsError::Failure {
            request_id: "req-1".to_string(),
            errors: vec![
                "Resource was not found.".to_string(),
                "Budget amount is too small.".to_string(),
            ],
        };
        assert_eq!(
            error.to_string(),
            "Request with ID \"req-1\" failed and includes the following errors:\n\tError message: \"Budget amount is too small.\"."
        );
    }
}
