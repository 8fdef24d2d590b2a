use super::refresh_rows::{
    asset_group_list_row, asset_sheet_row, campaign_list_row, client_customer, sitelink_sheet_row,
};
use crate::core::accounts::AccountIndex;
use crate::core::ads::gaql::{
    customers_query, ASSETS_QUERY, ASSET_GROUPS_QUERY, CAMPAIGNS_QUERY, SITELINKS_QUERY,
};
use crate::core::ads::{AdsApi, AdsError, GoogleAdsRow};
use crate::core::sheets::sheet_models::{
    asset_group_list, assets, campaign_list, customer_list, sitelinks,
};
use crate::core::sheets::sheet_rows::cell;
use crate::core::sheets::{
    AssetType, CellValue, Row, SheetName, SheetRequest, SheetsApi, SheetsError, SHEET_HEADER_SIZE,
};
use crate::core::validation::row_dropdowns;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Cell feeding the customer dropdowns of the template.
pub const CUSTOMER_DROPDOWN_CELL: &str = "DropDownConfig!N3";
pub const CUSTOMER_DROPDOWN_FORMULA: &str = "=SORT(UNIQUE({CustomerList!$A$5:$A}))";

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Sheets(#[from] SheetsError),
    #[error(transparent)]
    Ads(#[from] AdsError),
}

/// Which lists a refresh pulls. The customer list is always refreshed since
/// every other query runs per customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    All,
    Customers,
    Campaigns,
    AssetGroups,
    Assets,
    Sitelinks,
}

impl RefreshScope {
    fn campaigns(&self) -> bool {
        matches!(
            self,
            RefreshScope::All | RefreshScope::Campaigns | RefreshScope::AssetGroups
        )
    }

    fn asset_groups(&self) -> bool {
        matches!(self, RefreshScope::All | RefreshScope::AssetGroups)
    }

    fn assets(&self) -> bool {
        matches!(self, RefreshScope::All | RefreshScope::Assets)
    }

    fn sitelinks(&self) -> bool {
        matches!(self, RefreshScope::All | RefreshScope::Sitelinks)
    }

    fn customer_dropdown(&self) -> bool {
        matches!(self, RefreshScope::All | RefreshScope::Customers)
    }
}

#[derive(Debug, Clone)]
struct Customer {
    id: String,
    name: String,
}

/// Pulls existing entities from Google Ads into the list and input sheets.
///
/// Rows already present (matched by id or resource name) are left alone, so
/// a refresh only ever appends.
pub struct RefreshService<S: ?Sized, A: ?Sized> {
    sheets: Arc<S>,
    ads: Arc<A>,
    login_customer_id: String,
    inclusion_list: Vec<String>,
}

impl<S: SheetsApi + ?Sized, A: AdsApi + ?Sized> RefreshService<S, A> {
    pub fn new(
        sheets: Arc<S>,
        ads: Arc<A>,
        login_customer_id: impl Into<String>,
        inclusion_list: Vec<String>,
    ) -> Self {
        Self {
            sheets,
            ads,
            login_customer_id: login_customer_id.into(),
            inclusion_list,
        }
    }

    /// Runs a refresh and returns the account index seen in Google Ads.
    ///
    /// Dropdowns on appended rows offer the names in `known` as well as the
    /// ones found by this refresh.
    pub async fn refresh(&self, scope: RefreshScope, known: &AccountIndex) -> Result<AccountIndex, RefreshError> {
        let mut index = AccountIndex::new();
        let customers = self.refresh_customers(&mut index).await?;

        if scope.campaigns() {
            self.refresh_list(
                &customers,
                CAMPAIGNS_QUERY,
                SheetName::Campaigns,
                campaign_list::CAMPAIGN_ID,
                &mut index,
            )
            .await?;
        }
        if scope.asset_groups() {
            self.refresh_list(
                &customers,
                ASSET_GROUPS_QUERY,
                SheetName::AssetGroups,
                asset_group_list::ASSET_GROUP_ID,
                &mut index,
            )
            .await?;
        }
        if scope.assets() {
            self.refresh_assets(&customers, known, &mut index).await?;
        }
        if scope.sitelinks() {
            self.refresh_sitelinks(&customers, known, &mut index).await?;
        }
        if scope.customer_dropdown() {
            self.sheets
                .update_values(
                    CUSTOMER_DROPDOWN_CELL,
                    vec![vec![CUSTOMER_DROPDOWN_FORMULA.to_string()]],
                )
                .await?;
        }

        tracing::info!(
            scope = ?scope,
            customers = customers.len(),
            "Refresh finished"
        );
        Ok(index)
    }

    /// Values of one column of a sheet's data rows, used to skip known rows.
    async fn existing_values(&self, sheet: SheetName, column: usize) -> Result<HashSet<String>, RefreshError> {
        let rows = self.sheets.get_values(&sheet.range()).await?;
        Ok(rows
            .iter()
            .map(|row| cell(row, column).trim().to_string())
            .filter(|value| !value.is_empty())
            .collect())
    }

    async fn refresh_customers(&self, index: &mut AccountIndex) -> Result<Vec<Customer>, RefreshError> {
        let query = customers_query(&self.login_customer_id, &self.inclusion_list);
        let rows = self.ads.search(&self.login_customer_id, &query).await?;
        let known: HashSet<String> = self
            .existing_values(SheetName::Customers, customer_list::CUSTOMER_ID)
            .await?
            .into_iter()
            .map(|id| id.replace('-', ""))
            .collect();

        let mut customers = Vec::new();
        let mut new_rows: Vec<Row> = Vec::new();
        for row in &rows {
            let Some((id, name)) = client_customer(row) else {
                continue;
            };
            index.add_customer(&name);
            if !known.contains(&id) {
                new_rows.push(vec![name.clone(), id.clone()]);
            }
            customers.push(Customer { id, name });
        }
        self.append(SheetName::Customers, new_rows).await?;
        Ok(customers)
    }

    async fn search_all(&self, customers: &[Customer], query: &str) -> Result<Vec<GoogleAdsRow>, RefreshError> {
        let mut rows = Vec::new();
        for customer in customers {
            let found = self.ads.search(&customer.id, query).await?;
            tracing::debug!(customer_id = %customer.id, customer = %customer.name, rows = found.len(), "Search finished");
            rows.extend(found);
        }
        Ok(rows)
    }

    /// CampaignList or AssetGroupList.
    async fn refresh_list(
        &self,
        customers: &[Customer],
        query: &str,
        sheet: SheetName,
        id_column: usize,
        index: &mut AccountIndex,
    ) -> Result<(), RefreshError> {
        let rows = self.search_all(customers, query).await?;
        let known = self.existing_values(sheet, id_column).await?;

        let mut new_rows: Vec<Row> = Vec::new();
        for row in &rows {
            let values = match sheet {
                SheetName::AssetGroups => {
                    index.add_asset_group(row.customer_name(), row.campaign_name(), row.asset_group_name());
                    asset_group_list_row(row)
                }
                _ => {
                    index.add_campaign(row.customer_name(), row.campaign_name());
                    campaign_list_row(row)
                }
            };
            if !known.contains(cell(&values, id_column)) {
                new_rows.push(values);
            }
        }
        self.append(sheet, new_rows).await
    }

    async fn refresh_assets(
        &self,
        customers: &[Customer],
        known_index: &AccountIndex,
        index: &mut AccountIndex,
    ) -> Result<(), RefreshError> {
        let rows = self.search_all(customers, ASSETS_QUERY).await?;
        let known = self
            .existing_values(SheetName::Assets, assets::ASSET_GROUP_ASSET)
            .await?;

        let mut new_rows: Vec<(Row, Option<AssetType>)> = Vec::new();
        for row in &rows {
            index.add_asset_group(row.customer_name(), row.campaign_name(), row.asset_group_name());
            let (values, asset_type) = asset_sheet_row(row);
            if !known.contains(cell(&values, assets::ASSET_GROUP_ASSET)) {
                new_rows.push((values, asset_type));
            }
        }
        if new_rows.is_empty() {
            return Ok(());
        }

        let first_row = self
            .append_returning_first_row(SheetName::Assets, new_rows.iter().map(|(r, _)| r.clone()).collect())
            .await?;
        let sheet_id = self.sheets.sheet_id(SheetName::Assets.title()).await?;
        let options = dropdown_options(known_index, index);

        let mut requests = Vec::new();
        for (offset, (values, asset_type)) in new_rows.iter().enumerate() {
            let sheet_row = first_row + offset;
            let grid_row = sheet_row - 1;
            requests.push(SheetRequest::Checkbox {
                sheet_id,
                row: grid_row,
                column: assets::DELETE,
            });
            if asset_type.map(|t| t.is_image()).unwrap_or(false) {
                requests.push(SheetRequest::SetCell {
                    sheet_id,
                    row: grid_row,
                    column: assets::THUMBNAIL,
                    value: CellValue::Formula(format!("=IMAGE(I{})", sheet_row)),
                });
            }
            requests.extend(row_dropdowns(SheetName::Assets, sheet_id, grid_row, values, &options));
        }
        requests.push(sort_request(sheet_id, assets::WIDTH));
        self.sheets.batch_update(requests).await?;
        tracing::info!(rows = new_rows.len(), "Appended assets from Google Ads");
        Ok(())
    }

    async fn refresh_sitelinks(
        &self,
        customers: &[Customer],
        known_index: &AccountIndex,
        index: &mut AccountIndex,
    ) -> Result<(), RefreshError> {
        let rows = self.search_all(customers, SITELINKS_QUERY).await?;
        let known = self
            .existing_values(SheetName::Sitelinks, sitelinks::SITELINK_RESOURCE)
            .await?;

        let mut new_rows: Vec<Row> = Vec::new();
        for row in &rows {
            index.add_campaign(row.customer_name(), row.campaign_name());
            let values = sitelink_sheet_row(row);
            if !known.contains(cell(&values, sitelinks::SITELINK_RESOURCE)) {
                new_rows.push(values);
            }
        }
        if new_rows.is_empty() {
            return Ok(());
        }

        let first_row = self
            .append_returning_first_row(SheetName::Sitelinks, new_rows.clone())
            .await?;
        let sheet_id = self.sheets.sheet_id(SheetName::Sitelinks.title()).await?;
        let options = dropdown_options(known_index, index);

        let mut requests = Vec::new();
        for (offset, values) in new_rows.iter().enumerate() {
            let grid_row = first_row + offset - 1;
            requests.push(SheetRequest::Checkbox {
                sheet_id,
                row: grid_row,
                column: sitelinks::DELETE,
            });
            requests.extend(row_dropdowns(SheetName::Sitelinks, sheet_id, grid_row, values, &options));
        }
        requests.push(sort_request(sheet_id, sitelinks::WIDTH));
        self.sheets.batch_update(requests).await?;
        tracing::info!(rows = new_rows.len(), "Appended sitelinks from Google Ads");
        Ok(())
    }

    async fn append(&self, sheet: SheetName, rows: Vec<Row>) -> Result<(), RefreshError> {
        if rows.is_empty() {
            return Ok(());
        }
        let count = rows.len();
        self.sheets.append_values(&sheet.range(), rows).await?;
        tracing::info!(sheet = %sheet, rows = count, "Appended rows from Google Ads");
        Ok(())
    }

    async fn append_returning_first_row(&self, sheet: SheetName, rows: Vec<Row>) -> Result<usize, RefreshError> {
        let result = self.sheets.append_values(&sheet.range(), rows).await?;
        result.first_row().ok_or_else(|| {
            RefreshError::Sheets(SheetsError::Api(format!(
                "Append to {} returned no range: {:?}",
                sheet, result.updated_range
            )))
        })
    }
}

/// Sorts the data rows by status, then campaign name.
fn sort_request(sheet_id: i64, width: usize) -> SheetRequest {
    SheetRequest::Sort {
        sheet_id,
        start_row: SHEET_HEADER_SIZE,
        start_column: 0,
        end_column: width,
        sort_columns: vec![0, 3],
    }
}

fn dropdown_options(known: &AccountIndex, fresh: &AccountIndex) -> AccountIndex {
    let mut options = known.clone();
    options.merge(fresh);
    options
}
