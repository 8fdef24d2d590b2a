// GAQL queries used by the refresh step. Everything is limited to Performance
// Max entities that are not removed, under enabled customers.

pub const CAMPAIGNS_QUERY: &str = "SELECT
    campaign.name,
    campaign.id,
    customer.descriptive_name,
    customer.id
  FROM campaign
  WHERE campaign.advertising_channel_type = 'PERFORMANCE_MAX'
    AND campaign.status != 'REMOVED'
    AND customer.status = 'ENABLED'
  ORDER BY campaign.id ASC";

pub const ASSET_GROUPS_QUERY: &str = "SELECT
    asset_group.name,
    asset_group.id,
    campaign.name,
    campaign.id,
    customer.descriptive_name,
    customer.id
  FROM asset_group
  WHERE campaign.advertising_channel_type = 'PERFORMANCE_MAX'
    AND asset_group.status != 'REMOVED'
    AND campaign.status != 'REMOVED'
    AND customer.status = 'ENABLED'
  ORDER BY campaign.id ASC, asset_group.id ASC";

pub const ASSETS_QUERY: &str = "SELECT
    customer.id,
    customer.descriptive_name,
    campaign.id,
    campaign.name,
    asset_group.id,
    asset_group.name,
    asset_group_asset.resource_name,
    asset_group_asset.field_type,
    asset.id,
    asset.name,
    asset.resource_name,
    asset.text_asset.text,
    asset.youtube_video_asset.youtube_video_id,
    asset.lead_form_asset.business_name,
    asset.call_to_action_asset.call_to_action,
    asset.image_asset.full_size.url
  FROM asset_group_asset
  WHERE campaign.advertising_channel_type = 'PERFORMANCE_MAX'
    AND asset_group.status != 'REMOVED'
    AND campaign.status != 'REMOVED'
    AND customer.status = 'ENABLED'
    AND asset_group_asset.status != 'REMOVED'
  ORDER BY asset_group.id ASC, asset_group_asset.field_type ASC";

pub const SITELINKS_QUERY: &str = "SELECT
    customer.id,
    customer.descriptive_name,
    campaign.id,
    campaign.name,
    campaign_asset.resource_name,
    campaign_asset.field_type,
    asset.sitelink_asset.description1,
    asset.sitelink_asset.description2,
    asset.sitelink_asset.link_text,
    asset.final_urls
  FROM campaign_asset
  WHERE campaign.advertising_channel_type = 'PERFORMANCE_MAX'
    AND campaign_asset.primary_status NOT IN ('NOT_ELIGIBLE', 'REMOVED', 'UNKNOWN')
    AND campaign_asset.field_type = 'SITELINK'
    AND campaign.status != 'REMOVED'
    AND customer.status = 'ENABLED'";

/// Enabled client accounts under the manager account, optionally restricted
/// to an inclusion list.
pub fn customers_query(login_customer_id: &str, inclusion_list: &[String]) -> String {
    let mut query = format!(
        "SELECT
    customer.id,
    customer_client.descriptive_name,
    customer_client.id
  FROM customer_client
  WHERE customer_client.status = 'ENABLED'
    AND customer_client.id != {}",
        login_customer_id
    );
    if !inclusion_list.is_empty() {
        query.push_str(&format!(
            "\n    AND customer_client.id IN ({})",
            inclusion_list.join(", ")
        ));
    }
    query.push_str("\n  ORDER BY customer.id ASC");
    query
}

/// Table named in a query's FROM clause.
pub fn from_table(query: &str) -> Option<&str> {
    let mut words = query.split_whitespace();
    words
        .by_ref()
        .find(|word| word.eq_ignore_ascii_case("FROM"))?;
    words.next()
}
