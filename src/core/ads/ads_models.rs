// Google Ads entities in their REST JSON shape.
//
// Mutate payloads serialize straight into the body of
// `customers/{id}/googleAds:mutate`; search rows deserialize from
// `googleAds:search` results. Int64 ids arrive as JSON strings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

pub mod resources {
    use std::fmt::Display;

    pub fn campaign(customer_id: &str, id: impl Display) -> String {
        format!("customers/{}/campaigns/{}", customer_id, id)
    }

    pub fn campaign_budget(customer_id: &str, id: impl Display) -> String {
        format!("customers/{}/campaignBudgets/{}", customer_id, id)
    }

    pub fn asset_group(customer_id: &str, id: impl Display) -> String {
        format!("customers/{}/assetGroups/{}", customer_id, id)
    }

    pub fn asset(customer_id: &str, id: impl Display) -> String {
        format!("customers/{}/assets/{}", customer_id, id)
    }

    /// Last path segment of a resource name.
    pub fn trailing_id(resource_name: &str) -> &str {
        resource_name.rsplit('/').next().unwrap_or(resource_name)
    }
}

/// Temporary ids for resources created and referenced in the same mutate
/// request. They must be negative and unique within the request.
#[derive(Debug)]
pub struct TempIdAllocator {
    next: i64,
}

impl TempIdAllocator {
    pub fn new() -> Self {
        Self { next: -1 }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next -= 1;
        id
    }
}

impl Default for TempIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MUTATE PAYLOADS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBudget {
    pub resource_name: String,
    pub name: String,
    pub amount_micros: i64,
    pub delivery_method: String,
    pub explicitly_shared: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaximizeConversions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_cpa_micros: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaximizeConversionValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_roas: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub resource_name: String,
    pub name: String,
    pub advertising_channel_type: String,
    pub status: String,
    pub campaign_budget: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximize_conversions: Option<MaximizeConversions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximize_conversion_value: Option<MaximizeConversionValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub url_expansion_opt_out: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroup {
    pub resource_name: String,
    pub name: String,
    pub campaign: String,
    pub status: String,
    pub final_urls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub final_mobile_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAsset {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    /// Base64 encoded image bytes.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeVideoAsset {
    #[serde(default)]
    pub youtube_video_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToActionAsset {
    #[serde(default)]
    pub call_to_action: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitelinkAsset {
    #[serde(default)]
    pub link_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub resource_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub final_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_asset: Option<TextAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_asset: Option<ImageAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_video_asset: Option<YoutubeVideoAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_action_asset: Option<CallToActionAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitelink_asset: Option<SitelinkAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroupAsset {
    pub asset: String,
    pub asset_group: String,
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAsset {
    pub asset: String,
    pub campaign: String,
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation<T> {
    Create(T),
    /// Resource name of the entity to remove.
    Remove(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutateOperation {
    CampaignBudgetOperation(Operation<CampaignBudget>),
    CampaignOperation(Operation<Campaign>),
    AssetGroupOperation(Operation<AssetGroup>),
    AssetOperation(Operation<Asset>),
    AssetGroupAssetOperation(Operation<AssetGroupAsset>),
    CampaignAssetOperation(Operation<CampaignAsset>),
}

impl MutateOperation {
    pub fn create_asset(asset: Asset) -> Self {
        MutateOperation::AssetOperation(Operation::Create(asset))
    }

    pub fn link_asset_group_asset(
        asset: impl Into<String>,
        asset_group: impl Into<String>,
        field_type: impl Display,
    ) -> Self {
        MutateOperation::AssetGroupAssetOperation(Operation::Create(AssetGroupAsset {
            asset: asset.into(),
            asset_group: asset_group.into(),
            field_type: field_type.to_string(),
        }))
    }

    pub fn link_campaign_asset(
        asset: impl Into<String>,
        campaign: impl Into<String>,
        field_type: impl Display,
    ) -> Self {
        MutateOperation::CampaignAssetOperation(Operation::Create(CampaignAsset {
            asset: asset.into(),
            campaign: campaign.into(),
            field_type: field_type.to_string(),
        }))
    }

    /// Resource name of the asset this operation creates.
    pub fn created_asset(&self) -> Option<&str> {
        match self {
            MutateOperation::AssetOperation(Operation::Create(asset)) => {
                Some(asset.resource_name.as_str())
            }
            _ => None,
        }
    }

    /// Asset linked by a link operation, or the link removed by a remove.
    pub fn link_target(&self) -> Option<&str> {
        match self {
            MutateOperation::AssetGroupAssetOperation(Operation::Create(link)) => {
                Some(link.asset.as_str())
            }
            MutateOperation::CampaignAssetOperation(Operation::Create(link)) => {
                Some(link.asset.as_str())
            }
            MutateOperation::AssetGroupAssetOperation(Operation::Remove(name))
            | MutateOperation::CampaignAssetOperation(Operation::Remove(name)) => {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(
            self,
            MutateOperation::CampaignBudgetOperation(Operation::Remove(_))
                | MutateOperation::CampaignOperation(Operation::Remove(_))
                | MutateOperation::AssetGroupOperation(Operation::Remove(_))
                | MutateOperation::AssetOperation(Operation::Remove(_))
                | MutateOperation::AssetGroupAssetOperation(Operation::Remove(_))
                | MutateOperation::CampaignAssetOperation(Operation::Remove(_))
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MutateOperation::CampaignBudgetOperation(_) => "campaign_budget",
            MutateOperation::CampaignOperation(_) => "campaign",
            MutateOperation::AssetGroupOperation(_) => "asset_group",
            MutateOperation::AssetOperation(_) => "asset",
            MutateOperation::AssetGroupAssetOperation(_) => "asset_group_asset",
            MutateOperation::CampaignAssetOperation(_) => "campaign_asset",
        }
    }
}

// ============================================================================
// MUTATE RESPONSE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutateResult {
    pub resource_name: Option<String>,
}

/// One entry of `mutateOperationResponses`, e.g. `{"assetResult": {...}}`.
/// Failed operations come back as an empty object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MutateOperationResponse {
    #[serde(flatten)]
    pub results: HashMap<String, MutateResult>,
}

impl MutateOperationResponse {
    pub fn resource_name(&self) -> Option<&str> {
        self.results
            .values()
            .find_map(|result| result.resource_name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorTrigger {
    pub string_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPathElement {
    pub field_name: String,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorLocation {
    pub field_path_elements: Vec<FieldPathElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleAdsError {
    /// One-entry object such as `{"assetError": "DUPLICATE_ASSET"}`.
    pub error_code: BTreeMap<String, serde_json::Value>,
    pub message: String,
    pub trigger: Option<ErrorTrigger>,
    pub location: Option<ErrorLocation>,
}

impl GoogleAdsError {
    /// Index of the failing entry in `mutateOperations`.
    pub fn operation_index(&self) -> Option<usize> {
        self.location
            .as_ref()?
            .field_path_elements
            .iter()
            .find(|element| element.field_name == "mutate_operations")
            .and_then(|element| element.index)
    }

    pub fn code(&self) -> String {
        self.error_code
            .iter()
            .map(|(kind, value)| match value.as_str() {
                Some(text) => format!("{}: {}", kind, text),
                None => format!("{}: {}", kind, value),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn trigger_value(&self) -> &str {
        self.trigger
            .as_ref()
            .and_then(|t| t.string_value.as_deref())
            .unwrap_or("")
    }

    /// Message written into the sheet for a failed row.
    pub fn row_message(&self) -> String {
        format!(
            "Error message: {}\nError code: {}\nError trigger: {}",
            self.message,
            self.code(),
            self.trigger_value()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleAdsFailure {
    pub errors: Vec<GoogleAdsError>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialFailureStatus {
    pub code: i32,
    pub message: String,
    pub details: Vec<GoogleAdsFailure>,
}

impl PartialFailureStatus {
    /// Row messages keyed by failing operation index. Several errors on one
    /// operation are joined by newlines.
    pub fn errors_by_operation(&self) -> BTreeMap<usize, String> {
        let mut out: BTreeMap<usize, String> = BTreeMap::new();
        for error in self.details.iter().flat_map(|d| d.errors.iter()) {
            let Some(index) = error.operation_index() else {
                continue;
            };
            out.entry(index)
                .and_modify(|message| {
                    message.push('\n');
                    message.push_str(&error.row_message());
                })
                .or_insert_with(|| error.row_message());
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutateResponse {
    pub mutate_operation_responses: Vec<MutateOperationResponse>,
    pub partial_failure_error: Option<PartialFailureStatus>,
}

impl MutateResponse {
    pub fn has_partial_failure(&self) -> bool {
        self.partial_failure_error
            .as_ref()
            .map(|status| status.code != 0)
            .unwrap_or(false)
    }

    pub fn resource_name(&self, index: usize) -> Option<&str> {
        self.mutate_operation_responses
            .get(index)
            .and_then(MutateOperationResponse::resource_name)
    }

    pub fn errors_by_operation(&self) -> BTreeMap<usize, String> {
        match &self.partial_failure_error {
            Some(status) if status.code != 0 => status.errors_by_operation(),
            _ => BTreeMap::new(),
        }
    }
}

// ============================================================================
// SEARCH ROWS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerView {
    pub id: Option<String>,
    pub descriptive_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamedResourceView {
    pub resource_name: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkView {
    pub resource_name: Option<String>,
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageSize {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageAssetView {
    pub full_size: Option<ImageSize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadFormAssetView {
    pub business_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetView {
    pub resource_name: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub final_urls: Vec<String>,
    pub text_asset: Option<TextAsset>,
    pub youtube_video_asset: Option<YoutubeVideoAsset>,
    pub call_to_action_asset: Option<CallToActionAsset>,
    pub image_asset: Option<ImageAssetView>,
    pub lead_form_asset: Option<LeadFormAssetView>,
    pub sitelink_asset: Option<SitelinkAsset>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleAdsRow {
    pub customer: Option<CustomerView>,
    pub customer_client: Option<CustomerView>,
    pub campaign: Option<NamedResourceView>,
    pub asset_group: Option<NamedResourceView>,
    pub asset_group_asset: Option<LinkView>,
    pub campaign_asset: Option<LinkView>,
    pub asset: Option<AssetView>,
}

impl GoogleAdsRow {
    pub fn customer_id(&self) -> &str {
        self.customer
            .as_ref()
            .and_then(|c| c.id.as_deref())
            .unwrap_or("")
    }

    pub fn customer_name(&self) -> &str {
        self.customer
            .as_ref()
            .and_then(|c| c.descriptive_name.as_deref())
            .unwrap_or("")
    }

    pub fn campaign_id(&self) -> &str {
        self.campaign
            .as_ref()
            .and_then(|c| c.id.as_deref())
            .unwrap_or("")
    }

    pub fn campaign_name(&self) -> &str {
        self.campaign
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .unwrap_or("")
    }

    pub fn asset_group_id(&self) -> &str {
        self.asset_group
            .as_ref()
            .and_then(|g| g.id.as_deref())
            .unwrap_or("")
    }

    pub fn asset_group_name(&self) -> &str {
        self.asset_group
            .as_ref()
            .and_then(|g| g.name.as_deref())
            .unwrap_or("")
    }
}
