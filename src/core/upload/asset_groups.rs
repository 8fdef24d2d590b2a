// NewAssetGroups rows → asset group with its required assets.
//
// Headlines and descriptions must exist before the group is created, so they
// go out in a first request. The second request creates the group and links
// everything in one go.

use super::asset_fetcher::AssetFetcher;
use super::assets::{build_asset, unique_asset_name, AssetContent};
use super::upload_models::{ResultColumns, RowResult, RowResults, StepReport, UploadError};
use super::upload_service::{CampaignRef, ListSnapshot, UploadService};
use crate::core::accounts::CreatedEntity;
use crate::core::ads::ads_models::{Asset, AssetGroup, Operation, TextAsset};
use crate::core::ads::{resources, AdsApi, MutateOperation, TempIdAllocator};
use crate::core::sheets::sheet_models::new_asset_groups as cols;
use crate::core::sheets::sheet_rows::{cell, cell_range, non_blank, sheet_row_number};
use crate::core::sheets::{AssetType, Row, RowStatus, SheetName, SheetsApi, ValueRange};
use crate::core::validation::check_asset_group_row;

const RESULT_COLUMNS: ResultColumns = ResultColumns {
    status: cols::STATUS,
    message: cols::MESSAGE,
    resource: None,
};

/// Text assets created ahead of the group.
const FIRST_PASS: [(usize, AssetType); 5] = [
    (cols::HEADLINE1, AssetType::Headline),
    (cols::HEADLINE2, AssetType::Headline),
    (cols::HEADLINE3, AssetType::Headline),
    (cols::DESCRIPTION1, AssetType::Description),
    (cols::DESCRIPTION2, AssetType::Description),
];

/// Assets created together with the group.
const SECOND_PASS: [(usize, AssetType); 5] = [
    (cols::LONG_HEADLINE, AssetType::LongHeadline),
    (cols::BUSINESS_NAME, AssetType::BusinessName),
    (cols::MARKETING_IMAGE, AssetType::MarketingImage),
    (cols::SQUARE_MARKETING_IMAGE, AssetType::SquareMarketingImage),
    (cols::LOGO, AssetType::Logo),
];

fn group_status(row: &[String]) -> Result<String, String> {
    match non_blank(row, cols::ASSET_GROUP_STATUS) {
        None => Ok("PAUSED".to_string()),
        Some(value) => {
            let upper = value.to_ascii_uppercase();
            match upper.as_str() {
                "ENABLED" | "PAUSED" => Ok(upper),
                _ => Err(format!("Invalid asset group status: {}", value)),
            }
        }
    }
}

/// Asset group create for a row. The group takes the allocator's first id.
pub fn asset_group_operation(
    campaign: &CampaignRef,
    row: &[String],
    ids: &mut TempIdAllocator,
) -> Result<(String, MutateOperation), String> {
    let name = non_blank(row, cols::ASSET_GROUP_NAME).ok_or("Asset group name is required")?;
    let final_url = non_blank(row, cols::FINAL_URL).ok_or("Final URL is required")?;
    let status = group_status(row)?;
    let resource_name = resources::asset_group(&campaign.customer_id, ids.next_id());

    let operation = MutateOperation::AssetGroupOperation(Operation::Create(AssetGroup {
        resource_name: resource_name.clone(),
        name: name.to_string(),
        campaign: resources::campaign(&campaign.customer_id, &campaign.campaign_id),
        status,
        final_urls: vec![final_url.to_string()],
        final_mobile_urls: non_blank(row, cols::MOBILE_URL)
            .map(|url| vec![url.to_string()])
            .unwrap_or_default(),
        path1: non_blank(row, cols::PATH1).map(str::to_string),
        path2: non_blank(row, cols::PATH2).map(str::to_string),
    }));
    Ok((resource_name, operation))
}

/// Headline and description creates for the first request.
pub fn text_asset_operations(
    customer_id: &str,
    row: &[String],
    ids: &mut TempIdAllocator,
) -> (Vec<MutateOperation>, Vec<AssetType>) {
    let mut operations = Vec::new();
    let mut field_types = Vec::new();
    for (column, asset_type) in FIRST_PASS {
        let Some(text) = non_blank(row, column) else {
            continue;
        };
        operations.push(MutateOperation::create_asset(Asset {
            resource_name: resources::asset(customer_id, ids.next_id()),
            text_asset: Some(TextAsset {
                text: text.to_string(),
            }),
            ..Default::default()
        }));
        field_types.push(asset_type);
    }
    (operations, field_types)
}

impl<S, A, F> UploadService<S, A, F>
where
    S: SheetsApi + ?Sized,
    A: AdsApi + ?Sized,
    F: AssetFetcher + ?Sized,
{
    pub(super) async fn upload_asset_groups(
        &self,
        lists: &ListSnapshot,
        created: &mut Vec<CreatedEntity>,
    ) -> Result<StepReport, UploadError> {
        let rows = self.read_rows(SheetName::NewAssetGroups).await?;
        let mut results = RowResults::new();
        let mut checks: Vec<ValueRange> = Vec::new();
        let mut list_rows: Vec<Row> = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            if RowStatus::is_uploaded(cell(row, cols::STATUS))
                || non_blank(row, cols::ASSET_GROUP_NAME).is_none()
            {
                continue;
            }

            let check = check_asset_group_row(row);
            checks.push(ValueRange {
                range: cell_range(SheetName::NewAssetGroups, sheet_row_number(index), cols::ASSET_CHECK),
                values: vec![vec![check.check_cell().to_string()]],
            });
            if !check.is_complete() {
                results.insert(index, RowResult::error(check.message()));
                continue;
            }

            let customer = cell(row, cols::CUSTOMER_NAME).trim();
            let campaign_name = cell(row, cols::CAMPAIGN_NAME).trim();
            let Some(campaign) = lists.campaign(customer, campaign_name) else {
                results.insert(
                    index,
                    RowResult::error(format!(
                        "Campaign \"{}\" of customer \"{}\" not found in CampaignList",
                        campaign_name, customer
                    )),
                );
                continue;
            };

            match self.create_asset_group(&campaign, row).await {
                Ok((group_id, group_name)) => {
                    tracing::info!(customer_id = %campaign.customer_id, asset_group_id = %group_id, "Created asset group {}", group_name);
                    list_rows.push(vec![
                        customer.to_string(),
                        campaign.customer_id.clone(),
                        campaign_name.to_string(),
                        campaign.campaign_id.clone(),
                        group_name.clone(),
                        group_id,
                    ]);
                    created.push(CreatedEntity::AssetGroup {
                        customer: customer.to_string(),
                        campaign: campaign_name.to_string(),
                        asset_group: group_name,
                    });
                    results.insert(index, RowResult::uploaded(None));
                }
                Err(message) => {
                    tracing::warn!(customer_id = %campaign.customer_id, "Asset group row {} failed: {}", sheet_row_number(index), message);
                    results.insert(index, RowResult::error(message));
                }
            }
        }

        self.write_results(SheetName::NewAssetGroups, RESULT_COLUMNS, &results, checks)
            .await?;
        self.append_list_rows(SheetName::AssetGroups, list_rows).await?;
        Ok(StepReport::from_results(&results))
    }
    /// Creates the group and its assets; returns the new group id and name.
    async fn create_asset_group(
        &self,
        campaign: &CampaignRef,
        row: &[String],
    ) -> Result<(String, String), String> {
        let customer_id = campaign.customer_id.as_str();

        // Validation and downloads come before the first request.
        let mut ids = TempIdAllocator::new();
        let (group_resource, group_operation) = asset_group_operation(campaign, row, &mut ids)?;
        let group_name = cell(row, cols::ASSET_GROUP_NAME).trim().to_string();

        let mut operations = vec![group_operation];
        for (column, asset_type) in SECOND_PASS {
            let Some(value) = non_blank(row, column) else {
                continue;
            };
            let content = if asset_type.is_text() {
                AssetContent::Text(value.to_string())
            } else {
                AssetContent::Image {
                    url: value.to_string(),
                    name: unique_asset_name(&format!("{} {}", group_name, asset_type)),
                }
            };
            let asset_resource = resources::asset(customer_id, ids.next_id());
            let asset = build_asset(self.fetcher.as_ref(), asset_resource.clone(), content).await?;
            operations.push(MutateOperation::create_asset(asset));
            operations.push(MutateOperation::link_asset_group_asset(
                asset_resource,
                group_resource.clone(),
                asset_type,
            ));
        }

        let mut text_ids = TempIdAllocator::new();
        let (text_operations, field_types) = text_asset_operations(customer_id, row, &mut text_ids);
        let text_response = self
            .ads
            .mutate(customer_id, &text_operations, false)
            .await
            .map_err(|e| e.to_string())?;
        for (i, field_type) in field_types.into_iter().enumerate() {
            let asset = text_response
                .resource_name(i)
                .ok_or_else(|| format!("No resource returned for {} asset", field_type))?;
            operations.push(MutateOperation::link_asset_group_asset(
                asset,
                group_resource.clone(),
                field_type,
            ));
        }

        let response = self
            .ads
            .mutate(customer_id, &operations, false)
            .await
            .map_err(|e| e.to_string())?;
        let group_id = response
            .resource_name(0)
            .map(resources::trailing_id)
            .ok_or("No resource returned for the asset group")?
            .to_string();
        Ok((group_id, group_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ads::testing::{FakeAds, Scripted};
    use crate::core::ads::AdsError;
    use crate::core::sheets::testing::{row, FakeSheets};
    use crate::core::upload::testing::FakeFetcher;
    use std::sync::Arc;

    fn complete_row(group: &str) -> Row {
        row(&[
            "", "", "Acme", "Summer", group, "", "https://example.com", "https://m.example.com",
            "shoes", "", "H1", "H2", "H3", "D1", "D2", "Long headline", "Acme Inc",
            "https://img/1.png", "https://img/2.png", "https://img/logo.png",
        ])
    }

    fn lists() -> ListSnapshot {
        ListSnapshot {
            customers: vec![row(&["Acme", "111"])],
            campaigns: vec![row(&["Acme", "111", "Summer", "55"])],
            ..Default::default()
        }
    }

    fn campaign() -> CampaignRef {
        CampaignRef {
            customer_id: "111".to_string(),
            campaign_id: "55".to_string(),
        }
    }

    #[test]
    fn test_asset_group_operation_fields() {
        let mut ids = TempIdAllocator::new();
        let (resource, operation) = asset_group_operation(&campaign(), &complete_row("Shoes"), &mut ids).unwrap();
        assert_eq!(resource, "customers/111/assetGroups/-1");
        let MutateOperation::AssetGroupOperation(Operation::Create(group)) = operation else {
            panic!("expected asset group create");
        };
        assert_eq!(group.campaign, "customers/111/campaigns/55");
        assert_eq!(group.status, "PAUSED");
        assert_eq!(group.final_mobile_urls, vec!["https://m.example.com".to_string()]);
        assert_eq!(group.path1.as_deref(), Some("shoes"));
        assert_eq!(group.path2, None);

        let mut no_url = complete_row("Shoes");
        no_url[cols::FINAL_URL].clear();
        assert_eq!(
            asset_group_operation(&campaign(), &no_url, &mut ids).unwrap_err(),
            "Final URL is required"
        );
    }

    #[test]
    fn test_text_asset_operations_skip_blank_cells() {
        let mut values = complete_row("Shoes");
        values[cols::HEADLINE2] = " ".to_string();
        let mut ids = TempIdAllocator::new();
        let (operations, types) = text_asset_operations("111", &values, &mut ids);
        assert_eq!(operations.len(), 4);
        assert_eq!(
            types,
            vec![AssetType::Headline, AssetType::Headline, AssetType::Description, AssetType::Description]
        );
        assert_eq!(operations[3].created_asset(), Some("customers/111/assets/-4"));
    }

    #[tokio::test]
    async fn test_upload_creates_group_in_two_requests() {
        let sheets = Arc::new(
            FakeSheets::new().with_rows(SheetName::NewAssetGroups, vec![complete_row("Shoes")]),
        );
        let ads = Arc::new(FakeAds::new());
        let service = UploadService::new(sheets.clone(), ads.clone(), Arc::new(FakeFetcher::new()));
        let mut created = Vec::new();

        let report = service.upload_asset_groups(&lists(), &mut created).await.unwrap();

        assert_eq!(report.uploaded, 1);
        let calls = ads.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operations.len(), 5);
        assert!(calls[0].operations.iter().all(|op| op.created_asset().is_some()));

        let second = &calls[1].operations;
        assert_eq!(second[0].kind(), "asset_group");
        // 5 creates + 5 links for the second pass, then 5 text links
        assert_eq!(second.len(), 1 + 10 + 5);
        let MutateOperation::AssetOperation(Operation::Create(logo)) = &second[9] else {
            panic!("expected logo create");
        };
        assert!(logo.name.as_deref().unwrap_or_default().starts_with("Shoes LOGO #"));
        assert!(logo.image_asset.is_some());

        assert_eq!(sheets.cell("NewAssetGroups", 6, cols::STATUS), "UPLOADED");
        assert_eq!(sheets.cell("NewAssetGroups", 6, cols::ASSET_CHECK), "TRUE");
        let groups = sheets.data_rows(SheetName::AssetGroups);
        assert_eq!(groups[0][..5], row(&["Acme", "111", "Summer", "55", "Shoes"])[..]);
        assert_eq!(created.len(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_and_unknown_rows_are_not_sent() {
        let mut incomplete = complete_row("Thin");
        incomplete[cols::LOGO].clear();
        let mut unknown = complete_row("Lost");
        unknown[cols::CAMPAIGN_NAME] = "Winter".to_string();
        let sheets = Arc::new(FakeSheets::new().with_rows(
            SheetName::NewAssetGroups,
            vec![incomplete, unknown, row(&["UPLOADED", "TRUE", "Acme", "Summer", "Done"])],
        ));
        let ads = Arc::new(FakeAds::new());
        let service = UploadService::new(sheets.clone(), ads.clone(), Arc::new(FakeFetcher::new()));

        let report = service.upload_asset_groups(&lists(), &mut Vec::new()).await.unwrap();

        assert_eq!(report.failed, 2);
        assert!(ads.calls().is_empty());
        assert_eq!(sheets.cell("NewAssetGroups", 6, cols::ASSET_CHECK), "FALSE");
        assert_eq!(
            sheets.cell("NewAssetGroups", 6, cols::MESSAGE),
            "Missing required assets: LOGO 0/1"
        );
        assert!(sheets.cell("NewAssetGroups", 7, cols::MESSAGE).contains("Winter"));
        assert_eq!(sheets.cell("NewAssetGroups", 8, cols::STATUS), "UPLOADED");
    }

    #[tokio::test]
    async fn test_failed_group_request_reports_error() {
        let sheets = Arc::new(
            FakeSheets::new().with_rows(SheetName::NewAssetGroups, vec![complete_row("Shoes")]),
        );
        let ads = Arc::new(FakeAds::new());
        let text_ops = text_asset_operations("111", &complete_row("Shoes"), &mut TempIdAllocator::new()).0;
        ads.script(Scripted::Response(ads.success_for("111", &text_ops)));
        ads.script(Scripted::Error(AdsError::Failure {
            request_id: "r-9".to_string(),
            errors: vec!["Asset group name already exists.".to_string()],
        }));
        let service = UploadService::new(sheets.clone(), ads, Arc::new(FakeFetcher::new()));

        let report = service.upload_asset_groups(&lists(), &mut Vec::new()).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(sheets.cell("NewAssetGroups", 6, cols::STATUS), "ERROR");
        assert!(sheets
            .cell("NewAssetGroups", 6, cols::MESSAGE)
            .contains("Asset group name already exists."));
        assert!(sheets.data_rows(SheetName::AssetGroups).is_empty());
    }
}
