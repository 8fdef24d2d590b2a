use super::asset_fetcher::AssetFetcher;
use super::upload_models::{result_updates, ResultColumns, RowResults, UploadError, UploadReport};
use crate::core::ads::AdsApi;
use crate::core::sheets::sheet_models::{asset_group_list, campaign_list, customer_list};
use crate::core::sheets::sheet_rows::{cell, find_row, join_key};
use crate::core::sheets::{Row, SheetName, SheetsApi, ValueRange};
use std::sync::Arc;

/// The list sheets as they were at the start of a step.
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    pub customers: Vec<Row>,
    pub campaigns: Vec<Row>,
    pub asset_groups: Vec<Row>,
}

/// Customer and campaign ids behind a `customer;campaign` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRef {
    pub customer_id: String,
    pub campaign_id: String,
}

/// Customer, campaign and asset-group ids behind a full asset-group key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetGroupRef {
    pub customer_id: String,
    pub campaign_id: String,
    pub asset_group_id: String,
}

fn strip_dashes(id: &str) -> String {
    id.trim().replace('-', "")
}

impl ListSnapshot {
    pub fn customer_id(&self, customer: &str) -> Option<String> {
        find_row(&self.customers, SheetName::Customers, customer.trim())
            .map(|row| strip_dashes(cell(row, customer_list::CUSTOMER_ID)))
            .filter(|id| !id.is_empty())
    }

    pub fn campaign(&self, customer: &str, campaign: &str) -> Option<CampaignRef> {
        let key = join_key(&[customer.trim(), campaign.trim()]);
        let row = find_row(&self.campaigns, SheetName::Campaigns, &key)?;
        let campaign_ref = CampaignRef {
            customer_id: strip_dashes(cell(row, campaign_list::CUSTOMER_ID)),
            campaign_id: cell(row, campaign_list::CAMPAIGN_ID).trim().to_string(),
        };
        (!campaign_ref.customer_id.is_empty() && !campaign_ref.campaign_id.is_empty())
            .then_some(campaign_ref)
    }

    pub fn asset_group(&self, key: &str) -> Option<AssetGroupRef> {
        let row = find_row(&self.asset_groups, SheetName::AssetGroups, key)?;
        let group_ref = AssetGroupRef {
            customer_id: strip_dashes(cell(row, asset_group_list::CUSTOMER_ID)),
            campaign_id: cell(row, asset_group_list::CAMPAIGN_ID).trim().to_string(),
            asset_group_id: cell(row, asset_group_list::ASSET_GROUP_ID).trim().to_string(),
        };
        (!group_ref.customer_id.is_empty() && !group_ref.asset_group_id.is_empty())
            .then_some(group_ref)
    }
}

/// Pushes sheet rows to Google Ads.
///
/// Steps run in dependency order (campaigns, asset groups, assets, asset
/// removals, sitelinks) and the list sheets are read again before every
/// step so that entities created earlier in the run can be referenced.
/// Row-level problems never abort the run; they are written to the row.
pub struct UploadService<S: ?Sized, A: ?Sized, F: ?Sized> {
    pub(super) sheets: Arc<S>,
    pub(super) ads: Arc<A>,
    pub(super) fetcher: Arc<F>,
}

impl<S, A, F> UploadService<S, A, F>
where
    S: SheetsApi + ?Sized,
    A: AdsApi + ?Sized,
    F: AssetFetcher + ?Sized,
{
    pub fn new(sheets: Arc<S>, ads: Arc<A>, fetcher: Arc<F>) -> Self {
        Self {
            sheets,
            ads,
            fetcher,
        }
    }

    pub async fn run(&self) -> Result<UploadReport, UploadError> {
        let mut report = UploadReport::default();

        let lists = self.read_lists().await?;
        report.campaigns = self.upload_campaigns(&lists, &mut report.created).await?;

        let lists = self.read_lists().await?;
        report.asset_groups = self.upload_asset_groups(&lists, &mut report.created).await?;

        let lists = self.read_lists().await?;
        report.assets = self.upload_assets(&lists).await?;
        let removed = self.remove_assets().await?;
        report.assets.removed += removed.removed;
        report.assets.failed += removed.failed;

        let lists = self.read_lists().await?;
        report.sitelinks = self.upload_sitelinks(&lists).await?;

        tracing::info!(
            uploaded = report.rows_uploaded(),
            failed = report.rows_failed(),
            created = report.created.len(),
            "Upload finished"
        );
        Ok(report)
    }

    pub(super) async fn read_lists(&self) -> Result<ListSnapshot, UploadError> {
        Ok(ListSnapshot {
            customers: self.read_rows(SheetName::Customers).await?,
            campaigns: self.read_rows(SheetName::Campaigns).await?,
            asset_groups: self.read_rows(SheetName::AssetGroups).await?,
        })
    }

    pub(super) async fn read_rows(&self, sheet: SheetName) -> Result<Vec<Row>, UploadError> {
        Ok(self.sheets.get_values(&sheet.range()).await?)
    }

    /// Writes row results plus any extra cells in one values batch.
    pub(super) async fn write_results(
        &self,
        sheet: SheetName,
        columns: ResultColumns,
        results: &RowResults,
        mut extra: Vec<ValueRange>,
    ) -> Result<(), UploadError> {
        let mut updates = result_updates(sheet, columns, results);
        updates.append(&mut extra);
        if updates.is_empty() {
            return Ok(());
        }
        self.sheets.batch_update_values(updates).await?;
        Ok(())
    }

    pub(super) async fn append_list_rows(
        &self,
        sheet: SheetName,
        rows: Vec<Row>,
    ) -> Result<(), UploadError> {
        if rows.is_empty() {
            return Ok(());
        }
        let count = rows.len();
        self.sheets.append_values(&sheet.range(), rows).await?;
        tracing::debug!(sheet = %sheet, rows = count, "Appended created entities");
        Ok(())
    }
}
