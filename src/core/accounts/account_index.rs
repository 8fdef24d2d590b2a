// The account index: customer → campaigns → asset groups, denormalized into
// three name lists so dropdowns can be filled without reading the list sheets.

use crate::core::sheets::sheet_models::{asset_group_list, campaign_list, customer_list};
use crate::core::sheets::sheet_rows::{cell, join_key, padded};
use crate::core::sheets::{Row, SheetName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An entity created by an upload that the index should learn about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedEntity {
    Campaign {
        customer: String,
        campaign: String,
    },
    AssetGroup {
        customer: String,
        campaign: String,
        asset_group: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIndex {
    customers: Vec<String>,
    /// customer → campaign names
    campaigns: BTreeMap<String, Vec<String>>,
    /// `customer;campaign` → asset group names
    asset_groups: BTreeMap<String, Vec<String>>,
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|existing| existing == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_value(list: &mut Vec<String>, value: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != value);
    list.len() != before
}

impl AccountIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        customers: Vec<String>,
        campaigns: BTreeMap<String, Vec<String>>,
        asset_groups: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            customers,
            campaigns,
            asset_groups,
        }
    }

    pub fn into_parts(
        self,
    ) -> (
        Vec<String>,
        BTreeMap<String, Vec<String>>,
        BTreeMap<String, Vec<String>>,
    ) {
        (self.customers, self.campaigns, self.asset_groups)
    }

    /// Builds the index from the three list sheets' data rows.
    pub fn from_sheets(customer_rows: &[Row], campaign_rows: &[Row], asset_group_rows: &[Row]) -> Self {
        let mut index = Self::new();
        for row in customer_rows {
            index.add_customer(cell(row, customer_list::CUSTOMER_NAME));
        }
        for row in campaign_rows {
            index.add_campaign(
                cell(row, campaign_list::CUSTOMER_NAME),
                cell(row, campaign_list::CAMPAIGN_NAME),
            );
        }
        for row in asset_group_rows {
            index.add_asset_group(
                cell(row, asset_group_list::CUSTOMER_NAME),
                cell(row, asset_group_list::CAMPAIGN_NAME),
                cell(row, asset_group_list::ASSET_GROUP_NAME),
            );
        }
        index
    }

    pub fn customers(&self) -> &[String] {
        &self.customers
    }

    pub fn campaigns_for(&self, customer: &str) -> &[String] {
        self.campaigns
            .get(customer.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn asset_groups_for(&self, customer: &str, campaign: &str) -> &[String] {
        self.asset_groups
            .get(&join_key(&[customer.trim(), campaign.trim()]))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty() && self.campaigns.is_empty() && self.asset_groups.is_empty()
    }

    pub fn add_customer(&mut self, customer: &str) -> bool {
        let customer = customer.trim();
        if customer.is_empty() {
            return false;
        }
        push_unique(&mut self.customers, customer)
    }

    /// Adds a campaign, adding its customer when missing.
    pub fn add_campaign(&mut self, customer: &str, campaign: &str) -> bool {
        let (customer, campaign) = (customer.trim(), campaign.trim());
        if customer.is_empty() || campaign.is_empty() {
            return false;
        }
        let added_customer = self.add_customer(customer);
        let list = self.campaigns.entry(customer.to_string()).or_default();
        push_unique(list, campaign) || added_customer
    }

    /// Adds an asset group, adding its campaign and customer when missing.
    pub fn add_asset_group(&mut self, customer: &str, campaign: &str, asset_group: &str) -> bool {
        let (customer, campaign, asset_group) = (customer.trim(), campaign.trim(), asset_group.trim());
        if customer.is_empty() || campaign.is_empty() || asset_group.is_empty() {
            return false;
        }
        let added_campaign = self.add_campaign(customer, campaign);
        let list = self
            .asset_groups
            .entry(join_key(&[customer, campaign]))
            .or_default();
        push_unique(list, asset_group) || added_campaign
    }

    /// Removes a customer with all of its campaigns and asset groups.
    pub fn remove_customer(&mut self, customer: &str) -> bool {
        let customer = customer.trim();
        let mut changed = remove_value(&mut self.customers, customer);
        if let Some(campaigns) = self.campaigns.remove(customer) {
            changed = true;
            for campaign in campaigns {
                self.asset_groups.remove(&join_key(&[customer, &campaign]));
            }
        }
        changed
    }

    /// Removes a campaign with its asset groups.
    pub fn remove_campaign(&mut self, customer: &str, campaign: &str) -> bool {
        let (customer, campaign) = (customer.trim(), campaign.trim());
        let mut changed = false;
        if let Some(list) = self.campaigns.get_mut(customer) {
            changed = remove_value(list, campaign);
            if list.is_empty() {
                self.campaigns.remove(customer);
            }
        }
        changed |= self
            .asset_groups
            .remove(&join_key(&[customer, campaign]))
            .is_some();
        changed
    }

    pub fn remove_asset_group(&mut self, customer: &str, campaign: &str, asset_group: &str) -> bool {
        let key = join_key(&[customer.trim(), campaign.trim()]);
        let Some(list) = self.asset_groups.get_mut(&key) else {
            return false;
        };
        let changed = remove_value(list, asset_group.trim());
        if list.is_empty() {
            self.asset_groups.remove(&key);
        }
        changed
    }

    pub fn rename_customer(&mut self, old: &str, new: &str) -> bool {
        let removed = self.remove_customer(old);
        self.add_customer(new) || removed
    }

    pub fn rename_campaign(&mut self, customer: &str, old: &str, new: &str) -> bool {
        let removed = self.remove_campaign(customer, old);
        self.add_campaign(customer, new) || removed
    }

    pub fn rename_asset_group(&mut self, customer: &str, campaign: &str, old: &str, new: &str) -> bool {
        let removed = self.remove_asset_group(customer, campaign, old);
        self.add_asset_group(customer, campaign, new) || removed
    }

    /// Adds everything in `other` that is missing here.
    pub fn merge(&mut self, other: &AccountIndex) -> bool {
        let mut changed = false;
        for customer in &other.customers {
            changed |= self.add_customer(customer);
        }
        // Walk campaigns rather than splitting group keys; names may contain `;`.
        for (customer, campaigns) in &other.campaigns {
            for campaign in campaigns {
                changed |= self.add_campaign(customer, campaign);
                for group in other.asset_groups_for(customer, campaign) {
                    changed |= self.add_asset_group(customer, campaign, group);
                }
            }
        }
        changed
    }

    pub fn record(&mut self, entity: &CreatedEntity) -> bool {
        match entity {
            CreatedEntity::Campaign { customer, campaign } => self.add_campaign(customer, campaign),
            CreatedEntity::AssetGroup {
                customer,
                campaign,
                asset_group,
            } => self.add_asset_group(customer, campaign, asset_group),
        }
    }

    /// Patches the index after one cell of a list sheet changed.
    ///
    /// `column` is zero-based, `row` holds the values after the edit. The
    /// entity the row described before the edit is removed and the current
    /// one added, so editing any name column behaves as a rename.
    pub fn apply_list_edit(
        &mut self,
        sheet: SheetName,
        column: usize,
        old_value: &str,
        row: &[String],
    ) -> bool {
        let width = sheet.width();
        if !sheet.is_list_sheet() || column >= width {
            return false;
        }
        let current = padded(row, width);
        let mut previous = current.clone();
        previous[column] = old_value.to_string();

        match sheet {
            SheetName::Customers => {
                let name_of = |r: &[String]| cell(r, customer_list::CUSTOMER_NAME).trim().to_string();
                let (old, new) = (name_of(previous.as_slice()), name_of(current.as_slice()));
                if old == new {
                    return self.add_customer(&new);
                }
                if old.is_empty() {
                    return self.add_customer(&new);
                }
                self.rename_customer(&old, &new)
            }
            SheetName::Campaigns => {
                let path_of = |r: &[String]| {
                    (
                        cell(r, campaign_list::CUSTOMER_NAME).trim().to_string(),
                        cell(r, campaign_list::CAMPAIGN_NAME).trim().to_string(),
                    )
                };
                let (old, new) = (path_of(previous.as_slice()), path_of(current.as_slice()));
                if old == new {
                    return self.add_campaign(&new.0, &new.1);
                }
                if old.0.is_empty() || old.1.is_empty() {
                    return self.add_campaign(&new.0, &new.1);
                }
                if old.0 != new.0 {
                    let removed = self.remove_campaign(&old.0, &old.1);
                    return self.add_campaign(&new.0, &new.1) || removed;
                }
                self.rename_campaign(&new.0, &old.1, &new.1)
            }
            SheetName::AssetGroups => {
                let path_of = |r: &[String]| {
                    (
                        cell(r, asset_group_list::CUSTOMER_NAME).trim().to_string(),
                        cell(r, asset_group_list::CAMPAIGN_NAME).trim().to_string(),
                        cell(r, asset_group_list::ASSET_GROUP_NAME).trim().to_string(),
                    )
                };
                let (old, new) = (path_of(previous.as_slice()), path_of(current.as_slice()));
                if old == new {
                    return self.add_asset_group(&new.0, &new.1, &new.2);
                }
                if old.0.is_empty() || old.1.is_empty() || old.2.is_empty() {
                    return self.add_asset_group(&new.0, &new.1, &new.2);
                }
                if (&old.0, &old.1) != (&new.0, &new.1) {
                    let removed = self.remove_asset_group(&old.0, &old.1, &old.2);
                    return self.add_asset_group(&new.0, &new.1, &new.2) || removed;
                }
                self.rename_asset_group(&new.0, &new.1, &old.2, &new.2)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sheets::testing::row;

    fn sample() -> AccountIndex {
        let mut index = AccountIndex::new();
        index.add_asset_group("Acme", "Summer", "Shoes");
        index.add_asset_group("Acme", "Summer", "Hats");
        index.add_campaign("Acme", "Winter");
        index.add_customer("Globex");
        index
    }

    #[test]
    fn test_add_cascades_upwards() {
        let index = sample();
        assert_eq!(index.customers(), &["Acme".to_string(), "Globex".to_string()]);
        assert_eq!(index.campaigns_for("Acme"), &["Summer".to_string(), "Winter".to_string()]);
        assert_eq!(
            index.asset_groups_for("Acme", "Summer"),
            &["Shoes".to_string(), "Hats".to_string()]
        );
        assert!(index.campaigns_for("Initech").is_empty());
        assert!(index.asset_groups_for("Acme", "Winter").is_empty());
    }

    #[test]
    fn test_add_is_idempotent_and_ignores_blanks() {
        let mut index = sample();
        assert!(!index.add_campaign("Acme", "Summer"));
        assert!(!index.add_customer("   "));
        assert!(!index.add_asset_group("Acme", "", "Shoes"));
    }

    #[test]
    fn test_remove_cascades_downwards() {
        let mut index = sample();
        assert!(index.remove_campaign("Acme", "Summer"));
        assert!(index.asset_groups_for("Acme", "Summer").is_empty());
        assert_eq!(index.campaigns_for("Acme"), &["Winter".to_string()]);

        assert!(index.remove_customer("Acme"));
        assert!(index.campaigns_for("Acme").is_empty());
        assert_eq!(index.customers(), &["Globex".to_string()]);
        assert!(!index.remove_customer("Acme"));
    }

    #[test]
    fn test_rename_campaign_drops_its_groups() {
        let mut index = sample();
        assert!(index.rename_campaign("Acme", "Summer", "Spring"));
        assert_eq!(index.campaigns_for("Acme"), &["Winter".to_string(), "Spring".to_string()]);
        assert!(index.asset_groups_for("Acme", "Spring").is_empty());
    }

    #[test]
    fn test_from_sheets() {
        let index = AccountIndex::from_sheets(
            &[row(&["Acme", "111"]), row(&["Globex", "222"])],
            &[row(&["Acme", "111", "Summer", "9"])],
            &[row(&["Acme", "111", "Summer", "9", "Shoes", "77"])],
        );
        assert_eq!(index.customers().len(), 2);
        assert_eq!(index.asset_groups_for("Acme", "Summer"), &["Shoes".to_string()]);
    }

    #[test]
    fn test_apply_list_edit_renames_campaign() {
        let mut index = sample();
        let edited = row(&["Acme", "111", "Autumn", "9"]);
        assert!(index.apply_list_edit(SheetName::Campaigns, campaign_list::CAMPAIGN_NAME, "Summer", &edited));
        assert!(index.campaigns_for("Acme").contains(&"Autumn".to_string()));
        assert!(!index.campaigns_for("Acme").contains(&"Summer".to_string()));
    }

    #[test]
    fn test_apply_list_edit_new_row_only_adds() {
        let mut index = AccountIndex::new();
        let edited = row(&["Acme", "111", "Summer", "9", "Shoes"]);
        assert!(index.apply_list_edit(SheetName::AssetGroups, asset_group_list::ASSET_GROUP_NAME, "", &edited));
        assert_eq!(index.asset_groups_for("Acme", "Summer"), &["Shoes".to_string()]);

        // Editing the id column leaves the names untouched.
        assert!(!index.apply_list_edit(SheetName::AssetGroups, asset_group_list::ASSET_GROUP_ID, "", &edited));
        assert!(!index.apply_list_edit(SheetName::Assets, 2, "", &edited));
    }

    #[test]
    fn test_merge_keeps_names_with_separator() {
        let mut other = AccountIndex::new();
        other.add_asset_group("A;B", "Summer", "Shoes");

        let mut index = AccountIndex::new();
        assert!(index.merge(&other));
        assert_eq!(index.customers(), &["A;B".to_string()]);
        assert_eq!(index.campaigns_for("A;B"), &["Summer".to_string()]);
        assert_eq!(index.asset_groups_for("A;B", "Summer"), &["Shoes".to_string()]);
        assert!(index.campaigns_for("A").is_empty());
    }

    #[test]
    fn test_apply_list_edit_customer_rename_drops_children() {
        let mut index = sample();
        let edited = row(&["Acme Corp", "111"]);
        assert!(index.apply_list_edit(SheetName::Customers, customer_list::CUSTOMER_NAME, "Acme", &edited));

        assert_eq!(index.customers(), &["Globex".to_string(), "Acme Corp".to_string()]);
        assert!(index.campaigns_for("Acme").is_empty());
        assert!(index.asset_groups_for("Acme", "Summer").is_empty());
        assert!(index.campaigns_for("Acme Corp").is_empty());
    }

    #[test]
    fn test_apply_list_edit_moves_asset_group() {
        let mut index = sample();
        let edited = row(&["Acme", "111", "Winter", "10", "Shoes", "77"]);
        assert!(index.apply_list_edit(SheetName::AssetGroups, asset_group_list::CAMPAIGN_NAME, "Summer", &edited));
        assert_eq!(index.asset_groups_for("Acme", "Summer"), &["Hats".to_string()]);
        assert_eq!(index.asset_groups_for("Acme", "Winter"), &["Shoes".to_string()]);

        let edited = row(&["Globex", "222", "Winter", "10", "Shoes", "77"]);
        assert!(index.apply_list_edit(SheetName::AssetGroups, asset_group_list::CUSTOMER_NAME, "Acme", &edited));
        assert!(index.asset_groups_for("Acme", "Winter").is_empty());
        assert_eq!(index.asset_groups_for("Globex", "Winter"), &["Shoes".to_string()]);
        assert_eq!(index.campaigns_for("Globex"), &["Winter".to_string()]);
    }

    #[test]
    fn test_remove_asset_group() {
        let mut index = sample();
        assert!(index.remove_asset_group("Acme", " Summer ", "Shoes"));
        assert_eq!(index.asset_groups_for("Acme", "Summer"), &["Hats".to_string()]);
        assert!(!index.remove_asset_group("Acme", "Summer", "Shoes"));

        assert!(index.remove_asset_group("Acme", "Summer", "Hats"));
        assert!(index.asset_groups_for("Acme", "Summer").is_empty());
        assert_eq!(index.campaigns_for("Acme"), &["Summer".to_string(), "Winter".to_string()]);
        assert!(!index.remove_asset_group("Initech", "Launch", "Main"));
    }

    #[test]
    fn test_merge() {
        let mut index = AccountIndex::new();
        index.add_customer("Initech");
        assert!(index.merge(&sample()));
        assert!(!index.merge(&sample()));
        assert_eq!(index.customers()[0], "Initech");
        assert_eq!(index.asset_groups_for("Acme", "Summer").len(), 2);
    }
}
