// Sitelinks rows → sitelink assets linked to campaigns, and link removals for
// checked rows.

use super::asset_fetcher::AssetFetcher;
use super::assets::customer_of;
use super::results::OperationBatch;
use super::upload_models::{
    empty_resource_note, ResultColumns, RowResult, RowResults, StepReport, UploadError,
};
use super::upload_service::{ListSnapshot, UploadService};
use crate::core::ads::ads_models::{Asset, Operation, SitelinkAsset};
use crate::core::ads::{resources, AdsApi, MutateOperation, TempIdAllocator};
use crate::core::sheets::sheet_models::sitelinks as cols;
use crate::core::sheets::sheet_rows::{cell, is_checked, non_blank};
use crate::core::sheets::{AssetType, RowStatus, SheetName, SheetsApi};
use std::collections::BTreeMap;

const RESULT_COLUMNS: ResultColumns = ResultColumns {
    status: cols::STATUS,
    message: cols::MESSAGE,
    resource: Some(cols::SITELINK_RESOURCE),
};

pub fn sitelink_asset(resource_name: String, row: &[String]) -> Result<Asset, String> {
    let link_text = non_blank(row, cols::LINK_TEXT).ok_or("Link text is required")?;
    let final_url = non_blank(row, cols::FINAL_URL).ok_or("Final URL is required")?;
    Ok(Asset {
        resource_name,
        final_urls: vec![final_url.to_string()],
        sitelink_asset: Some(SitelinkAsset {
            link_text: link_text.to_string(),
            description1: non_blank(row, cols::DESCRIPTION1).map(str::to_string),
            description2: non_blank(row, cols::DESCRIPTION2).map(str::to_string),
        }),
        ..Default::default()
    })
}

impl<S, A, F> UploadService<S, A, F>
where
    S: SheetsApi + ?Sized,
    A: AdsApi + ?Sized,
    F: AssetFetcher + ?Sized,
{
    pub(super) async fn upload_sitelinks(&self, lists: &ListSnapshot) -> Result<StepReport, UploadError> {
        let rows = self.read_rows(SheetName::Sitelinks).await?;
        let mut results = RowResults::new();
        let mut creates: BTreeMap<String, (OperationBatch, TempIdAllocator)> = BTreeMap::new();
        let mut removes: BTreeMap<String, OperationBatch> = BTreeMap::new();
        let mut notes = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            let status = cell(row, cols::STATUS);

            if RowStatus::is_uploaded(status) {
                if !is_checked(row, cols::DELETE) {
                    continue;
                }
                let Some(resource) = non_blank(row, cols::SITELINK_RESOURCE) else {
                    notes.push(empty_resource_note(SheetName::Sitelinks, cols::MESSAGE, index));
                    continue;
                };
                match customer_of(resource) {
                    Some(customer_id) => removes
                        .entry(customer_id.to_string())
                        .or_insert_with(|| OperationBatch::new(customer_id))
                        .push_row(
                            index,
                            vec![MutateOperation::CampaignAssetOperation(Operation::Remove(
                                resource.to_string(),
                            ))],
                        ),
                    None => {
                        results.insert(index, RowResult::error(format!("Invalid sitelink resource: {}", resource)));
                    }
                }
                continue;
            }

            if RowStatus::is_removed(status)
                || is_checked(row, cols::DELETE)
                || non_blank(row, cols::DESCRIPTION2).is_none()
            {
                continue;
            }

            let customer = cell(row, cols::CUSTOMER_NAME);
            let campaign_name = cell(row, cols::CAMPAIGN_NAME);
            let Some(campaign) = lists.campaign(customer, campaign_name) else {
                results.insert(
                    index,
                    RowResult::error(format!(
                        "Campaign \"{}\" of customer \"{}\" not found in CampaignList",
                        campaign_name.trim(),
                        customer.trim()
                    )),
                );
                continue;
            };

            let (batch, ids) = creates.entry(campaign.customer_id.clone()).or_insert_with(|| {
                (OperationBatch::new(campaign.customer_id.clone()), TempIdAllocator::new())
            });
            let asset_resource = resources::asset(&campaign.customer_id, ids.next_id());
            match sitelink_asset(asset_resource.clone(), row) {
                Ok(asset) => batch.push_row(
                    index,
                    vec![
                        MutateOperation::create_asset(asset),
                        MutateOperation::link_campaign_asset(
                            asset_resource,
                            resources::campaign(&campaign.customer_id, &campaign.campaign_id),
                            AssetType::Sitelink,
                        ),
                    ],
                ),
                Err(message) => {
                    results.insert(index, RowResult::error(message));
                }
            }
        }

        self.send_batches(creates.into_values().map(|(batch, _)| batch), &mut results)
            .await;
        self.send_batches(removes.into_values(), &mut results).await;
        self.write_results(SheetName::Sitelinks, RESULT_COLUMNS, &results, notes)
            .await?;
        let report = StepReport::from_results(&results);
        tracing::info!(
            uploaded = report.uploaded,
            removed = report.removed,
            failed = report.failed,
            "Sitelinks step done"
        );
        Ok(report)
    }
}
