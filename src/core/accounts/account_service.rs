use super::account_index::{AccountIndex, CreatedEntity};
use super::property_store::{PropertyError, PropertyStore};
use crate::core::sheets::{Row, SheetName, SheetsApi, SheetsError};
use std::sync::Arc;
use thiserror::Error;

pub const CUSTOMERS_KEY: &str = "customers";
pub const CAMPAIGNS_KEY: &str = "campaigns";
pub const ASSET_GROUPS_KEY: &str = "assetGroups";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error(transparent)]
    Sheets(#[from] SheetsError),
    #[error("Failed to encode account index: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Keeps the persisted account index in step with the list sheets.
///
/// The index lives in the document's property store as three JSON blobs. It
/// is only a cache: whenever it is missing or unreadable it is rebuilt from
/// CustomerList, CampaignList and AssetGroupList.
pub struct AccountService<P, S: ?Sized> {
    store: P,
    sheets: Arc<S>,
}

impl<P: PropertyStore, S: SheetsApi + ?Sized> AccountService<P, S> {
    pub fn new(store: P, sheets: Arc<S>) -> Self {
        Self { store, sheets }
    }

    pub async fn load_index(&self) -> Result<AccountIndex, AccountError> {
        match self.read_stored().await? {
            Some(index) => Ok(index),
            None => {
                tracing::info!("Account index missing from property store, rebuilding");
                self.rebuild_index().await
            }
        }
    }

    async fn read_stored(&self) -> Result<Option<AccountIndex>, AccountError> {
        let customers = self.store.get_property(CUSTOMERS_KEY).await?;
        let campaigns = self.store.get_property(CAMPAIGNS_KEY).await?;
        let asset_groups = self.store.get_property(ASSET_GROUPS_KEY).await?;
        let (Some(customers), Some(campaigns), Some(asset_groups)) =
            (customers, campaigns, asset_groups)
        else {
            return Ok(None);
        };

        let decoded = (|| -> Result<AccountIndex, serde_json::Error> {
            Ok(AccountIndex::from_parts(
                serde_json::from_str(&customers)?,
                serde_json::from_str(&campaigns)?,
                serde_json::from_str(&asset_groups)?,
            ))
        })();

        match decoded {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                tracing::warn!("Stored account index is unreadable: {}", e);
                Ok(None)
            }
        }
    }

    /// Rebuilds the index from the list sheets and stores it.
    pub async fn rebuild_index(&self) -> Result<AccountIndex, AccountError> {
        for key in [CUSTOMERS_KEY, CAMPAIGNS_KEY, ASSET_GROUPS_KEY] {
            self.store.delete_property(key).await?;
        }

        let customers = self.read_list(SheetName::Customers).await?;
        let campaigns = self.read_list(SheetName::Campaigns).await?;
        let asset_groups = self.read_list(SheetName::AssetGroups).await?;
        let index = AccountIndex::from_sheets(&customers, &campaigns, &asset_groups);

        tracing::info!(
            customers = index.customers().len(),
            "Rebuilt account index from list sheets"
        );
        self.save_index(&index).await?;
        Ok(index)
    }

    async fn read_list(&self, sheet: SheetName) -> Result<Vec<Row>, SheetsError> {
        self.sheets.get_values(&sheet.range()).await
    }

    pub async fn save_index(&self, index: &AccountIndex) -> Result<(), AccountError> {
        let (customers, campaigns, asset_groups) = index.clone().into_parts();
        self.store
            .set_property(CUSTOMERS_KEY, serde_json::to_string(&customers)?)
            .await?;
        self.store
            .set_property(CAMPAIGNS_KEY, serde_json::to_string(&campaigns)?)
            .await?;
        self.store
            .set_property(ASSET_GROUPS_KEY, serde_json::to_string(&asset_groups)?)
            .await?;
        Ok(())
    }

    /// Applies a list-sheet cell edit; returns whether the index changed.
    pub async fn patch_from_edit(
        &self,
        sheet: SheetName,
        column: usize,
        old_value: &str,
        row: &[String],
    ) -> Result<bool, AccountError> {
        let mut index = self.load_index().await?;
        let changed = index.apply_list_edit(sheet, column, old_value, row);
        if changed {
            self.save_index(&index).await?;
            tracing::debug!(sheet = %sheet, column, "Account index patched");
        }
        Ok(changed)
    }

    pub async fn record_created(&self, entities: &[CreatedEntity]) -> Result<bool, AccountError> {
        if entities.is_empty() {
            return Ok(false);
        }
        let mut index = self.load_index().await?;
        let mut changed = false;
        for entity in entities {
            changed |= index.record(entity);
        }
        if changed {
            self.save_index(&index).await?;
        }
        Ok(changed)
    }

    pub async fn merge_index(&self, other: &AccountIndex) -> Result<bool, AccountError> {
        let mut index = self.load_index().await?;
        let changed = index.merge(other);
        if changed {
            self.save_index(&index).await?;
        }
        Ok(changed)
    }
}
