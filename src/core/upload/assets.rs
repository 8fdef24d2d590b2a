// Assets rows → asset creates linked to existing asset groups, and removal of
// links for rows flagged for deletion.

use super::asset_fetcher::AssetFetcher;
use super::results::{map_failure, map_response, OperationBatch};
use super::upload_models::{
    empty_resource_note, ResultColumns, RowResult, RowResults, StepReport, UploadError,
};
use super::upload_service::{ListSnapshot, UploadService};
use crate::core::ads::ads_models::{
    Asset, CallToActionAsset, ImageAsset, Operation, TextAsset, YoutubeVideoAsset,
};
use crate::core::ads::{resources, AdsApi, MutateOperation, TempIdAllocator};
use crate::core::sheets::sheet_models::assets as cols;
use crate::core::sheets::sheet_rows::{asset_row_group_key, cell, is_checked, non_blank};
use crate::core::sheets::{AssetType, RowStatus, SheetName, SheetsApi};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const RESULT_COLUMNS: ResultColumns = ResultColumns {
    status: cols::STATUS,
    message: cols::MESSAGE,
    resource: Some(cols::ASSET_GROUP_ASSET),
};

fn youtube_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|shorts/|watch\?v=|&v=)([^#&?]*).*")
            .unwrap_or_else(|e| panic!("invalid YouTube pattern: {}", e))
    })
}

/// Video id of a YouTube URL. A bare id is returned as is.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match youtube_pattern().captures(url) {
        Some(captures) => captures
            .get(2)
            .map(|m| m.as_str().to_string())
            .filter(|id| !id.is_empty()),
        None if !url.contains('/') => Some(url.to_string()),
        None => None,
    }
}

/// What an asset is made of, before any download happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetContent {
    Text(String),
    CallToAction(String),
    YoutubeVideo(String),
    Image { url: String, name: String },
}

fn url_required(asset_type: AssetType) -> String {
    format!("Asset URL is required to create a {} Asset", asset_type)
}

/// Reads the type of an Assets row and the value its type needs.
pub fn asset_content(row: &[String]) -> Result<(AssetType, AssetContent), String> {
    let asset_type: AssetType = cell(row, cols::TYPE).parse()?;
    let content = match asset_type {
        t if t.is_text() => {
            let text = non_blank(row, cols::TEXT)
                .ok_or_else(|| format!("Text is required to create a {} Asset", t))?;
            AssetContent::Text(text.to_string())
        }
        AssetType::CallToActionSelection => {
            let action = non_blank(row, cols::CALL_TO_ACTION).ok_or_else(|| {
                format!("Call to action is required to create a {} Asset", asset_type)
            })?;
            AssetContent::CallToAction(action.to_ascii_uppercase())
        }
        AssetType::YoutubeVideo => {
            let url = non_blank(row, cols::URL).ok_or_else(|| url_required(asset_type))?;
            let id = youtube_video_id(url)
                .ok_or_else(|| format!("Could not read a YouTube video id from {}", url))?;
            AssetContent::YoutubeVideo(id)
        }
        t if t.is_image() => {
            let url = non_blank(row, cols::URL).ok_or_else(|| url_required(t))?;
            let base = non_blank(row, cols::TEXT).unwrap_or(t.as_str());
            AssetContent::Image {
                url: url.to_string(),
                name: unique_asset_name(base),
            }
        }
        other => return Err(format!("{} assets cannot be linked to an asset group", other)),
    };
    Ok((asset_type, content))
}

/// Image asset names must be unique per account.
pub fn unique_asset_name(base: &str) -> String {
    format!("{} #{}", base, uuid::Uuid::new_v4())
}

/// Builds the asset resource, downloading image content when needed.
pub(super) async fn build_asset<F: AssetFetcher + ?Sized>(
    fetcher: &F,
    resource_name: String,
    content: AssetContent,
) -> Result<Asset, String> {
    let mut asset = Asset {
        resource_name,
        ..Default::default()
    };
    match content {
        AssetContent::Text(text) => asset.text_asset = Some(TextAsset { text }),
        AssetContent::CallToAction(call_to_action) => {
            asset.call_to_action_asset = Some(CallToActionAsset { call_to_action })
        }
        AssetContent::YoutubeVideo(youtube_video_id) => {
            asset.youtube_video_asset = Some(YoutubeVideoAsset { youtube_video_id })
        }
        AssetContent::Image { url, name } => {
            let bytes = fetcher.fetch(&url).await.map_err(|e| e.to_string())?;
            asset.name = Some(name);
            asset.image_asset = Some(ImageAsset {
                data: BASE64.encode(bytes),
            });
        }
    }
    Ok(asset)
}

/// Customer id embedded in a resource name such as
/// `customers/123/assetGroupAssets/4~5~LOGO`.
pub fn customer_of(resource_name: &str) -> Option<&str> {
    let mut parts = resource_name.trim().split('/');
    match (parts.next(), parts.next()) {
        (Some("customers"), Some(id)) if !id.is_empty() => Some(id),
        _ => None,
    }
}

impl<S, A, F> UploadService<S, A, F>
where
    S: SheetsApi + ?Sized,
    A: AdsApi + ?Sized,
    F: AssetFetcher + ?Sized,
{
    /// Sends each customer's batch with partial failure on and maps the
    /// outcome back to rows.
    pub(super) async fn send_batches(
        &self,
        batches: impl IntoIterator<Item = OperationBatch>,
        results: &mut RowResults,
    ) {
        for batch in batches {
            if batch.is_empty() {
                continue;
            }
            let mapped = match self.ads.mutate(&batch.customer_id, &batch.operations, true).await {
                Ok(response) => {
                    if response.has_partial_failure() {
                        tracing::warn!(customer_id = %batch.customer_id, "Mutate finished with partial failures");
                    }
                    map_response(&batch, &response)
                }
                Err(e) => {
                    tracing::error!(customer_id = %batch.customer_id, "Mutate request failed: {}", e);
                    map_failure(&batch, &e)
                }
            };
            results.extend(mapped);
        }
    }

    pub(super) async fn upload_assets(&self, lists: &ListSnapshot) -> Result<StepReport, UploadError> {
        let rows = self.read_rows(SheetName::Assets).await?;
        let mut results = RowResults::new();
        let mut batches: BTreeMap<String, (OperationBatch, TempIdAllocator)> = BTreeMap::new();

        for (index, row) in rows.iter().enumerate() {
            let status = cell(row, cols::STATUS);
            if RowStatus::is_uploaded(status)
                || RowStatus::is_removed(status)
                || is_checked(row, cols::DELETE)
                || non_blank(row, cols::TYPE).is_none()
            {
                continue;
            }

            let key = asset_row_group_key(row);
            let Some(group) = lists.asset_group(&key) else {
                results.insert(
                    index,
                    RowResult::error(format!("Asset group \"{}\" not found in AssetGroupList", key)),
                );
                continue;
            };
            let (asset_type, content) = match asset_content(row) {
                Ok(parsed) => parsed,
                Err(message) => {
                    results.insert(index, RowResult::error(message));
                    continue;
                }
            };

            let (batch, ids) = batches
                .entry(group.customer_id.clone())
                .or_insert_with(|| (OperationBatch::new(group.customer_id.clone()), TempIdAllocator::new()));
            let asset_resource = resources::asset(&group.customer_id, ids.next_id());
            let asset = match build_asset(self.fetcher.as_ref(), asset_resource.clone(), content).await {
                Ok(asset) => asset,
                Err(message) => {
                    results.insert(index, RowResult::error(message));
                    continue;
                }
            };
            batch.push_row(
                index,
                vec![
                    MutateOperation::create_asset(asset),
                    MutateOperation::link_asset_group_asset(
                        asset_resource,
                        resources::asset_group(&group.customer_id, &group.asset_group_id),
                        asset_type,
                    ),
                ],
            );
        }

        self.send_batches(batches.into_values().map(|(batch, _)| batch), &mut results)
            .await;
        self.write_results(SheetName::Assets, RESULT_COLUMNS, &results, Vec::new())
            .await?;
        let report = StepReport::from_results(&results);
        tracing::info!(uploaded = report.uploaded, failed = report.failed, "Assets step done");
        Ok(report)
    }

    /// Unlinks uploaded assets whose delete box is checked.
    pub(super) async fn remove_assets(&self) -> Result<StepReport, UploadError> {
        let rows = self.read_rows(SheetName::Assets).await?;
        let mut results = RowResults::new();
        let mut batches: BTreeMap<String, OperationBatch> = BTreeMap::new();
        let mut notes = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            if !RowStatus::is_uploaded(cell(row, cols::STATUS)) || !is_checked(row, cols::DELETE) {
                continue;
            }
            let Some(resource) = non_blank(row, cols::ASSET_GROUP_ASSET) else {
                notes.push(empty_resource_note(SheetName::Assets, cols::MESSAGE, index));
                continue;
            };
            let Some(customer_id) = customer_of(resource) else {
                results.insert(index, RowResult::error(format!("Invalid asset resource: {}", resource)));
                continue;
            };
            batches
                .entry(customer_id.to_string())
                .or_insert_with(|| OperationBatch::new(customer_id))
                .push_row(
                    index,
                    vec![MutateOperation::AssetGroupAssetOperation(Operation::Remove(
                        resource.to_string(),
                    ))],
                );
        }

        self.send_batches(batches.into_values(), &mut results).await;
        self.write_results(SheetName::Assets, RESULT_COLUMNS, &results, notes)
            .await?;
        Ok(StepReport::from_results(&results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ads::ads_models::{
        ErrorLocation, FieldPathElement, GoogleAdsError, GoogleAdsFailure, PartialFailureStatus,
    };
    use crate::core::ads::testing::{FakeAds, Scripted};
    use crate::core::ads::MutateResponse;
    use crate::core::sheets::testing::{row, FakeSheets};
    use crate::core::upload::testing::FakeFetcher;
    use std::sync::Arc;

    fn lists() -> ListSnapshot {
        ListSnapshot {
            asset_groups: vec![
                row(&["Acme", "111", "Summer", "5", "Shoes", "77"]),
                row(&["Globex", "222", "Winter", "6", "Boots", "88"]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_youtube_ids() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=3",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
        ] {
            assert_eq!(youtube_video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{}", url);
        }
        assert_eq!(youtube_video_id("https://example.com/video"), None);
    }

    #[test]
    fn test_asset_content_by_type() {
        let headline = row(&["", "", "Acme", "Summer", "Shoes", "HEADLINE", "Fast shoes"]);
        assert_eq!(
            asset_content(&headline),
            Ok((AssetType::Headline, AssetContent::Text("Fast shoes".to_string())))
        );

        let action = row(&["", "", "Acme", "Summer", "Shoes", "CALL_TO_ACTION_SELECTION", "", "shop_now"]);
        assert_eq!(
            asset_content(&action).unwrap().1,
            AssetContent::CallToAction("SHOP_NOW".to_string())
        );

        let missing_url = row(&["", "", "Acme", "Summer", "Shoes", "LOGO", "Logo"]);
        assert_eq!(
            asset_content(&missing_url),
            Err("Asset URL is required to create a LOGO Asset".to_string())
        );

        let image = row(&["", "", "Acme", "Summer", "Shoes", "MARKETING_IMAGE", "Hero", "", "https://img/1.png"]);
        let (_, content) = asset_content(&image).unwrap();
        let AssetContent::Image { url, name } = content else {
            panic!("expected image");
        };
        assert_eq!(url, "https://img/1.png");
        assert!(name.starts_with("Hero #"));
        assert_ne!(unique_asset_name("Hero"), unique_asset_name("Hero"));

        assert!(asset_content(&row(&["", "", "", "", "", "BANNER"])).is_err());
    }

    #[test]
    fn test_customer_of_resource() {
        assert_eq!(customer_of("customers/123/assetGroupAssets/4~5~LOGO"), Some("123"));
        assert_eq!(customer_of("assetGroupAssets/4"), None);
    }

    #[tokio::test]
    async fn test_assets_are_batched_per_customer() {
        let sheets = Arc::new(FakeSheets::new().with_rows(
            SheetName::Assets,
            vec![
                row(&["", "", "Acme", "Summer", "Shoes", "HEADLINE", "One"]),
                row(&["", "", "Globex", "Winter", "Boots", "MARKETING_IMAGE", "", "", "https://img/a.png"]),
                row(&["UPLOADED", "", "Acme", "Summer", "Shoes", "HEADLINE", "Old"]),
                row(&["", "", "Acme", "Summer", "Missing", "HEADLINE", "Two"]),
                row(&["", "", "Acme", "Summer", "Shoes", "DESCRIPTION", "Three"]),
            ],
        ));
        let ads = Arc::new(FakeAds::new());
        let service = UploadService::new(sheets.clone(), ads.clone(), Arc::new(FakeFetcher::new()));

        let report = service.upload_assets(&lists()).await.unwrap();

        assert_eq!(report, StepReport { uploaded: 3, removed: 0, failed: 1 });
        let calls = ads.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].customer_id, "111");
        assert_eq!(calls[0].operations.len(), 4);
        assert!(calls[0].partial_failure);
        assert_eq!(calls[1].customer_id, "222");

        assert_eq!(sheets.cell("Assets", 6, cols::STATUS), "UPLOADED");
        assert!(sheets.cell("Assets", 6, cols::ASSET_GROUP_ASSET).starts_with("customers/111/"));
        assert_eq!(sheets.cell("Assets", 8, cols::STATUS), "UPLOADED");
        assert_eq!(sheets.cell("Assets", 8, cols::ASSET_GROUP_ASSET), "");
        assert_eq!(sheets.cell("Assets", 9, cols::STATUS), "ERROR");
    }

    #[tokio::test]
    async fn test_partial_failure_marks_only_failing_row() {
        let sheets = Arc::new(FakeSheets::new().with_rows(
            SheetName::Assets,
            vec![
                row(&["", "", "Acme", "Summer", "Shoes", "HEADLINE", "Good"]),
                row(&["", "", "Acme", "Summer", "Shoes", "HEADLINE", "Bad"]),
            ],
        ));
        let ads = Arc::new(FakeAds::new());
        let link = MutateOperation::link_asset_group_asset("a", "g", "HEADLINE");
        let ok = ads.success_for("111", &[link]).mutate_operation_responses.remove(0);
        let mut response = MutateResponse {
            mutate_operation_responses: vec![Default::default(), ok.clone(), Default::default(), ok],
            partial_failure_error: None,
        };
        response.partial_failure_error = Some(PartialFailureStatus {
            code: 3,
            message: "partial".to_string(),
            details: vec![GoogleAdsFailure {
                errors: vec![GoogleAdsError {
                    message: "Text too long.".to_string(),
                    location: Some(ErrorLocation {
                        field_path_elements: vec![FieldPathElement {
                            field_name: "mutate_operations".to_string(),
                            index: Some(2),
                        }],
                    }),
                    ..Default::default()
                }],
                request_id: None,
            }],
        });
        ads.script(Scripted::Response(response));
        let service = UploadService::new(sheets.clone(), ads, Arc::new(FakeFetcher::new()));

        let report = service.upload_assets(&lists()).await.unwrap();

        assert_eq!(report.uploaded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(sheets.cell("Assets", 6, cols::STATUS), "UPLOADED");
        assert_eq!(sheets.cell("Assets", 7, cols::STATUS), "ERROR");
        assert!(sheets.cell("Assets", 7, cols::MESSAGE).starts_with("Error message: Text too long."));
    }

    #[tokio::test]
    async fn test_failed_download_is_a_row_error() {
        let sheets = Arc::new(FakeSheets::new().with_rows(
            SheetName::Assets,
            vec![row(&["", "", "Acme", "Summer", "Shoes", "LOGO", "", "", "https://img/missing.png"])],
        ));
        let ads = Arc::new(FakeAds::new());
        let fetcher = Arc::new(FakeFetcher::new().failing("https://img/missing.png"));
        let service = UploadService::new(sheets.clone(), ads.clone(), fetcher);

        let report = service.upload_assets(&lists()).await.unwrap();

        assert_eq!(report.failed, 1);
        assert!(ads.calls().is_empty());
        assert!(sheets.cell("Assets", 6, cols::MESSAGE).contains("https://img/missing.png"));
    }

    #[tokio::test]
    async fn test_checked_uploaded_rows_are_removed() {
        let link = "customers/111/assetGroupAssets/77~900~HEADLINE";
        let sheets = Arc::new(FakeSheets::new().with_rows(
            SheetName::Assets,
            vec![
                row(&["UPLOADED", "TRUE", "Acme", "Summer", "Shoes", "HEADLINE", "Old", "", "", "", "", link]),
                row(&["UPLOADED", "FALSE", "Acme", "Summer", "Shoes", "HEADLINE", "Keep", "", "", "", "", "customers/111/assetGroupAssets/77~901~HEADLINE"]),
                row(&["", "TRUE", "Acme", "Summer", "Shoes", "HEADLINE", "Never uploaded"]),
            ],
        ));
        let ads = Arc::new(FakeAds::new());
        let service = UploadService::new(sheets.clone(), ads.clone(), Arc::new(FakeFetcher::new()));

        let report = service.remove_assets().await.unwrap();

        assert_eq!(report.removed, 1);
        let calls = ads.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].operations[0].is_remove());
        assert_eq!(sheets.cell("Assets", 6, cols::STATUS), "REMOVED");
        assert_eq!(sheets.cell("Assets", 6, cols::ASSET_GROUP_ASSET), "");
        assert_eq!(sheets.cell("Assets", 7, cols::STATUS), "UPLOADED");
    }

    #[tokio::test]
    async fn test_checked_row_without_resource_keeps_status() {
        let sheets = Arc::new(FakeSheets::new().with_rows(
            SheetName::Assets,
            vec![row(&["UPLOADED", "TRUE", "Acme", "Summer", "Shoes", "HEADLINE", "Old", "", "", "", "", ""])],
        ));
        let ads = Arc::new(FakeAds::new());
        let service = UploadService::new(sheets.clone(), ads.clone(), Arc::new(FakeFetcher::new()));

        let report = service.remove_assets().await.unwrap();

        assert_eq!(report, StepReport::default());
        assert!(ads.calls().is_empty());
        assert_eq!(sheets.cell("Assets", 6, cols::STATUS), "UPLOADED");
        assert_eq!(
            sheets.cell("Assets", 6, cols::MESSAGE),
            crate::core::upload::upload_models::EMPTY_RESOURCE_MESSAGE
        );
    }
}
