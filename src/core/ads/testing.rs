// Scriptable Google Ads double for the service tests.

use super::ads_models::{
    GoogleAdsRow, MutateOperation, MutateOperationResponse, MutateResponse, MutateResult,
    Operation,
};
use super::ads_port::{AdsApi, AdsError};
use super::gaql::from_table;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct MutateCall {
    pub customer_id: String,
    pub operations: Vec<MutateOperation>,
    pub partial_failure: bool,
}

pub enum Scripted {
    Response(MutateResponse),
    Error(AdsError),
}

#[derive(Default)]
pub struct FakeAds {
    scripted: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<MutateCall>>,
    search_rows: Mutex<HashMap<(String, String), Vec<GoogleAdsRow>>>,
    next_id: Mutex<u64>,
}

impl FakeAds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the outcome of the next mutate call. Unscripted calls succeed.
    pub fn script(&self, outcome: Scripted) {
        self.scripted.lock().unwrap().push_back(outcome);
    }

    pub fn with_search(self, customer_id: &str, table: &str, rows: Vec<GoogleAdsRow>) -> Self {
        self.search_rows
            .lock()
            .unwrap()
            .insert((customer_id.to_string(), table.to_string()), rows);
        self
    }

    pub fn calls(&self) -> Vec<MutateCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Successful response giving every operation a fresh resource name.
    pub fn success_for(&self, customer_id: &str, operations: &[MutateOperation]) -> MutateResponse {
        let mut next_id = self.next_id.lock().unwrap();
        let responses = operations
            .iter()
            .map(|op| {
                *next_id += 1;
                let (key, collection) = match op {
                    MutateOperation::CampaignBudgetOperation(_) => {
                        ("campaignBudgetResult", "campaignBudgets")
                    }
                    MutateOperation::CampaignOperation(_) => ("campaignResult", "campaigns"),
                    MutateOperation::AssetGroupOperation(_) => ("assetGroupResult", "assetGroups"),
                    MutateOperation::AssetOperation(_) => ("assetResult", "assets"),
                    MutateOperation::AssetGroupAssetOperation(_) => {
                        ("assetGroupAssetResult", "assetGroupAssets")
                    }
                    MutateOperation::CampaignAssetOperation(_) => {
                        ("campaignAssetResult", "campaignAssets")
                    }
                };
                let resource_name = match op {
                    MutateOperation::AssetGroupAssetOperation(Operation::Remove(name))
                    | MutateOperation::CampaignAssetOperation(Operation::Remove(name)) => {
                        name.clone()
                    }
                    _ => format!("customers/{}/{}/{}", customer_id, collection, 1000 + *next_id),
                };
                MutateOperationResponse {
                    results: HashMap::from([(
                        key.to_string(),
                        MutateResult {
                            resource_name: Some(resource_name),
                        },
                    )]),
                }
            })
            .collect();
        MutateResponse {
            mutate_operation_responses: responses,
            partial_failure_error: None,
        }
    }
}

#[async_trait]
impl AdsApi for FakeAds {
    async fn mutate(
        &self,
        customer_id: &str,
        operations: &[MutateOperation],
        partial_failure: bool,
    ) -> Result<MutateResponse, AdsError> {
        self.calls.lock().unwrap().push(MutateCall {
            customer_id: customer_id.to_string(),
            operations: operations.to_vec(),
            partial_failure,
        });
        let scripted = self.scripted.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Error(error)) => Err(error),
            None => Ok(self.success_for(customer_id, operations)),
        }
    }

    async fn search(&self, customer_id: &str, query: &str) -> Result<Vec<GoogleAdsRow>, AdsError> {
        let table = from_table(query).unwrap_or_default().to_string();
        Ok(self
            .search_rows
            .lock()
            .unwrap()
            .get(&(customer_id.to_string(), table))
            .cloned()
            .unwrap_or_default())
    }
}
