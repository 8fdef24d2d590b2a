// Sheet rows for entities pulled from Google Ads.

use crate::core::ads::GoogleAdsRow;
use crate::core::sheets::sheet_models::{assets, sitelinks};
use crate::core::sheets::sheet_rows::padded;
use crate::core::sheets::{AssetType, Row, RowStatus};

const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Id and name of a `customer_client` row.
pub fn client_customer(row: &GoogleAdsRow) -> Option<(String, String)> {
    let client = row.customer_client.as_ref()?;
    let id = client.id.clone().filter(|id| !id.is_empty())?;
    let name = client.descriptive_name.clone().unwrap_or_default();
    Some((id, name))
}

pub fn campaign_list_row(row: &GoogleAdsRow) -> Row {
    vec![
        row.customer_name().to_string(),
        row.customer_id().to_string(),
        row.campaign_name().to_string(),
        row.campaign_id().to_string(),
    ]
}

pub fn asset_group_list_row(row: &GoogleAdsRow) -> Row {
    vec![
        row.customer_name().to_string(),
        row.customer_id().to_string(),
        row.campaign_name().to_string(),
        row.campaign_id().to_string(),
        row.asset_group_name().to_string(),
        row.asset_group_id().to_string(),
    ]
}

/// Assets sheet row for an asset-group asset. Returns the row and the parsed
/// field type (unknown field types yield `None` and the raw name is kept).
pub fn asset_sheet_row(row: &GoogleAdsRow) -> (Row, Option<AssetType>) {
    let link = row.asset_group_asset.clone().unwrap_or_default();
    let asset = row.asset.clone().unwrap_or_default();
    let field_type = link.field_type.unwrap_or_default();
    let asset_type = field_type.parse::<AssetType>().ok();

    let mut out = padded(&[], assets::WIDTH);
    out[assets::STATUS] = RowStatus::Uploaded.to_string();
    out[assets::CUSTOMER_NAME] = row.customer_name().to_string();
    out[assets::CAMPAIGN_NAME] = row.campaign_name().to_string();
    out[assets::ASSET_GROUP_NAME] = row.asset_group_name().to_string();
    out[assets::TYPE] = field_type;
    out[assets::ASSET_GROUP_ASSET] = link.resource_name.unwrap_or_default();

    let name = asset.name.clone().unwrap_or_default();
    match asset_type {
        Some(t) if t.is_text() => {
            out[assets::TEXT] = asset
                .text_asset
                .map(|text| text.text)
                .or_else(|| asset.lead_form_asset.and_then(|form| form.business_name))
                .unwrap_or_default();
        }
        Some(t) if t.is_image() => {
            out[assets::TEXT] = name;
            out[assets::URL] = asset
                .image_asset
                .and_then(|image| image.full_size)
                .and_then(|size| size.url)
                .unwrap_or_default();
        }
        Some(AssetType::CallToActionSelection) => {
            out[assets::TEXT] = name;
            out[assets::CALL_TO_ACTION] = asset
                .call_to_action_asset
                .map(|cta| cta.call_to_action)
                .unwrap_or_default();
        }
        Some(AssetType::YoutubeVideo) => {
            out[assets::TEXT] = name;
            out[assets::URL] = asset
                .youtube_video_asset
                .map(|video| format!("{}{}", YOUTUBE_WATCH_URL, video.youtube_video_id))
                .unwrap_or_default();
        }
        _ => out[assets::TEXT] = name,
    }
    (out, asset_type)
}

pub fn sitelink_sheet_row(row: &GoogleAdsRow) -> Row {
    let asset = row.asset.clone().unwrap_or_default();
    let sitelink = asset.sitelink_asset.unwrap_or_default();

    let mut out = padded(&[], sitelinks::WIDTH);
    out[sitelinks::STATUS] = RowStatus::Uploaded.to_string();
    out[sitelinks::CUSTOMER_NAME] = row.customer_name().to_string();
    out[sitelinks::CAMPAIGN_NAME] = row.campaign_name().to_string();
    out[sitelinks::LINK_TEXT] = sitelink.link_text;
    out[sitelinks::FINAL_URL] = asset.final_urls.into_iter().next().unwrap_or_default();
    out[sitelinks::DESCRIPTION1] = sitelink.description1.unwrap_or_default();
    out[sitelinks::DESCRIPTION2] = sitelink.description2.unwrap_or_default();
    out[sitelinks::SITELINK_RESOURCE] = row
        .campaign_asset
        .as_ref()
        .and_then(|link| link.resource_name.clone())
        .unwrap_or_default();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ads_row(value: serde_json::Value) -> GoogleAdsRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_image_asset_row() {
        let row = ads_row(json!({
            "customer": { "id": "111", "descriptiveName": "Acme" },
            "campaign": { "id": "5", "name": "Summer" },
            "assetGroup": { "id": "77", "name": "Shoes" },
            "assetGroupAsset": {
                "resourceName": "customers/111/assetGroupAssets/77~900~LOGO",
                "fieldType": "LOGO"
            },
            "asset": {
                "name": "Acme logo",
                "imageAsset": { "fullSize": { "url": "https://tpc.googlesyndication.com/logo.png" } }
            }
        }));
        let (values, asset_type) = asset_sheet_row(&row);
        assert_eq!(asset_type, Some(AssetType::Logo));
        assert_eq!(values.len(), assets::WIDTH);
        assert_eq!(values[assets::STATUS], "UPLOADED");
        assert_eq!(values[assets::ASSET_GROUP_NAME], "Shoes");
        assert_eq!(values[assets::TEXT], "Acme logo");
        assert_eq!(values[assets::URL], "https://tpc.googlesyndication.com/logo.png");
        assert_eq!(values[assets::ASSET_GROUP_ASSET], "customers/111/assetGroupAssets/77~900~LOGO");
    }

    #[test]
    fn test_text_video_and_business_name_rows() {
        let headline = ads_row(json!({
            "assetGroupAsset": { "fieldType": "HEADLINE" },
            "asset": { "textAsset": { "text": "Fast shoes" } }
        }));
        assert_eq!(asset_sheet_row(&headline).0[assets::TEXT], "Fast shoes");

        let business = ads_row(json!({
            "assetGroupAsset": { "fieldType": "BUSINESS_NAME" },
            "asset": { "leadFormAsset": { "businessName": "Acme Inc" } }
        }));
        assert_eq!(asset_sheet_row(&business).0[assets::TEXT], "Acme Inc");

        let video = ads_row(json!({
            "assetGroupAsset": { "fieldType": "YOUTUBE_VIDEO" },
            "asset": { "name": "Promo", "youtubeVideoAsset": { "youtubeVideoId": "abc123" } }
        }));
        assert_eq!(
            asset_sheet_row(&video).0[assets::URL],
            "https://www.youtube.com/watch?v=abc123"
        );
    }

    #[test]
    fn test_sitelink_and_list_rows() {
        let row = ads_row(json!({
            "customer": { "id": "111", "descriptiveName": "Acme" },
            "campaign": { "id": "5", "name": "Summer" },
            "campaignAsset": { "resourceName": "customers/111/campaignAssets/5~9~SITELINK" },
            "asset": {
                "finalUrls": ["https://example.com/sale"],
                "sitelinkAsset": { "linkText": "Sale", "description1": "Up to 50%" }
            }
        }));
        let values = sitelink_sheet_row(&row);
        assert_eq!(values[sitelinks::LINK_TEXT], "Sale");
        assert_eq!(values[sitelinks::FINAL_URL], "https://example.com/sale");
        assert_eq!(values[sitelinks::DESCRIPTION2], "");
        assert_eq!(values[sitelinks::SITELINK_RESOURCE], "customers/111/campaignAssets/5~9~SITELINK");

        assert_eq!(campaign_list_row(&row), vec!["Acme", "111", "Summer", "5"]);

        let client = ads_row(json!({ "customerClient": { "id": "222", "descriptiveName": "Globex" } }));
        assert_eq!(client_customer(&client), Some(("222".to_string(), "Globex".to_string())));
        assert_eq!(client_customer(&GoogleAdsRow::default()), None);
    }
}
