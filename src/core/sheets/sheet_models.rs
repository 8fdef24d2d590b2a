use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rows 1-5 of every sheet are headers; data starts at row 6.
pub const SHEET_HEADER_SIZE: usize = 5;

/// The sheets of the spreadsheet template. Renaming a tab in the template
/// means updating the title here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetName {
    Customers,
    Campaigns,
    NewCampaigns,
    AssetGroups,
    NewAssetGroups,
    Sitelinks,
    Assets,
}

impl SheetName {
    pub const ALL: [SheetName; 7] = [
        SheetName::Customers,
        SheetName::Campaigns,
        SheetName::NewCampaigns,
        SheetName::AssetGroups,
        SheetName::NewAssetGroups,
        SheetName::Sitelinks,
        SheetName::Assets,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SheetName::Customers => "CustomerList",
            SheetName::Campaigns => "CampaignList",
            SheetName::NewCampaigns => "NewCampaigns",
            SheetName::AssetGroups => "AssetGroupList",
            SheetName::NewAssetGroups => "NewAssetGroups",
            SheetName::Sitelinks => "Sitelinks",
            SheetName::Assets => "Assets",
        }
    }

    /// Data range without the sheet prefix.
    pub fn data_range(&self) -> &'static str {
        match self {
            SheetName::Customers => "A6:B",
            SheetName::Campaigns => "A6:D",
            SheetName::NewCampaigns => "A6:L",
            SheetName::AssetGroups => "A6:F",
            SheetName::NewAssetGroups => "A6:U",
            SheetName::Sitelinks => "A6:J",
            SheetName::Assets => "A6:L",
        }
    }

    /// Fully qualified A1 range, e.g. `CustomerList!A6:B`.
    pub fn range(&self) -> String {
        format!("{}!{}", self.title(), self.data_range())
    }

    /// Width of a data row in columns.
    pub fn width(&self) -> usize {
        match self {
            SheetName::Customers => customer_list::WIDTH,
            SheetName::Campaigns => campaign_list::WIDTH,
            SheetName::NewCampaigns => new_campaigns::WIDTH,
            SheetName::AssetGroups => asset_group_list::WIDTH,
            SheetName::NewAssetGroups => new_asset_groups::WIDTH,
            SheetName::Sitelinks => sitelinks::WIDTH,
            SheetName::Assets => assets::WIDTH,
        }
    }

    pub fn from_title(title: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sheet| sheet.title() == title)
    }

    /// Sheets that mirror entities already in Google Ads.
    pub fn is_list_sheet(&self) -> bool {
        matches!(
            self,
            SheetName::Customers | SheetName::Campaigns | SheetName::AssetGroups
        )
    }
}

impl fmt::Display for SheetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

pub mod customer_list {
    pub const CUSTOMER_NAME: usize = 0;
    pub const CUSTOMER_ID: usize = 1;
    pub const WIDTH: usize = 2;
}

pub mod campaign_list {
    pub const CUSTOMER_NAME: usize = 0;
    pub const CUSTOMER_ID: usize = 1;
    pub const CAMPAIGN_NAME: usize = 2;
    pub const CAMPAIGN_ID: usize = 3;
    pub const WIDTH: usize = 4;
}

pub mod asset_group_list {
    pub const CUSTOMER_NAME: usize = 0;
    pub const CUSTOMER_ID: usize = 1;
    pub const CAMPAIGN_NAME: usize = 2;
    pub const CAMPAIGN_ID: usize = 3;
    pub const ASSET_GROUP_NAME: usize = 4;
    pub const ASSET_GROUP_ID: usize = 5;
    pub const WIDTH: usize = 6;
}

pub mod new_campaigns {
    pub const STATUS: usize = 0;
    pub const CUSTOMER_NAME: usize = 1;
    pub const CAMPAIGN_NAME: usize = 2;
    pub const BUDGET: usize = 3;
    pub const BUDGET_DELIVERY_METHOD: usize = 4;
    pub const CAMPAIGN_STATUS: usize = 5;
    pub const BIDDING_STRATEGY: usize = 6;
    pub const TARGET_ROAS: usize = 7;
    pub const TARGET_CPA: usize = 8;
    pub const START_DATE: usize = 9;
    pub const END_DATE: usize = 10;
    pub const MESSAGE: usize = 11;
    pub const WIDTH: usize = 12;
}

pub mod new_asset_groups {
    pub const STATUS: usize = 0;
    pub const ASSET_CHECK: usize = 1;
    pub const CUSTOMER_NAME: usize = 2;
    pub const CAMPAIGN_NAME: usize = 3;
    pub const ASSET_GROUP_NAME: usize = 4;
    pub const ASSET_GROUP_STATUS: usize = 5;
    pub const FINAL_URL: usize = 6;
    pub const MOBILE_URL: usize = 7;
    pub const PATH1: usize = 8;
    pub const PATH2: usize = 9;
    pub const HEADLINE1: usize = 10;
    pub const HEADLINE2: usize = 11;
    pub const HEADLINE3: usize = 12;
    pub const DESCRIPTION1: usize = 13;
    pub const DESCRIPTION2: usize = 14;
    pub const LONG_HEADLINE: usize = 15;
    pub const BUSINESS_NAME: usize = 16;
    pub const MARKETING_IMAGE: usize = 17;
    pub const SQUARE_MARKETING_IMAGE: usize = 18;
    pub const LOGO: usize = 19;
    pub const MESSAGE: usize = 20;
    pub const WIDTH: usize = 21;
}

pub mod assets {
    pub const STATUS: usize = 0;
    pub const DELETE: usize = 1;
    pub const CUSTOMER_NAME: usize = 2;
    pub const CAMPAIGN_NAME: usize = 3;
    pub const ASSET_GROUP_NAME: usize = 4;
    pub const TYPE: usize = 5;
    pub const TEXT: usize = 6;
    pub const CALL_TO_ACTION: usize = 7;
    pub const URL: usize = 8;
    pub const THUMBNAIL: usize = 9;
    pub const MESSAGE: usize = 10;
    pub const ASSET_GROUP_ASSET: usize = 11;
    pub const WIDTH: usize = 12;
}

pub mod sitelinks {
    pub const STATUS: usize = 0;
    pub const DELETE: usize = 1;
    pub const CUSTOMER_NAME: usize = 2;
    pub const CAMPAIGN_NAME: usize = 3;
    pub const LINK_TEXT: usize = 4;
    pub const FINAL_URL: usize = 5;
    pub const DESCRIPTION1: usize = 6;
    pub const DESCRIPTION2: usize = 7;
    pub const MESSAGE: usize = 8;
    pub const SITELINK_RESOURCE: usize = 9;
    pub const WIDTH: usize = 10;
}

/// Upload status written to the first column of input sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    Uploaded,
    Error,
    Removed,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Uploaded => "UPLOADED",
            RowStatus::Error => "ERROR",
            RowStatus::Removed => "REMOVED",
        }
    }

    pub fn is_uploaded(cell: &str) -> bool {
        cell.trim().eq_ignore_ascii_case(RowStatus::Uploaded.as_str())
    }

    pub fn is_removed(cell: &str) -> bool {
        cell.trim().eq_ignore_ascii_case(RowStatus::Removed.as_str())
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset types as they appear in the sheet's type column. The names double as
/// Google Ads `AssetFieldType` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
    MarketingImage,
    SquareMarketingImage,
    PortraitMarketingImage,
    Logo,
    LandscapeLogo,
    YoutubeVideo,
    Headline,
    Description,
    LongHeadline,
    BusinessName,
    CallToActionSelection,
    Sitelink,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::MarketingImage => "MARKETING_IMAGE",
            AssetType::SquareMarketingImage => "SQUARE_MARKETING_IMAGE",
            AssetType::PortraitMarketingImage => "PORTRAIT_MARKETING_IMAGE",
            AssetType::Logo => "LOGO",
            AssetType::LandscapeLogo => "LANDSCAPE_LOGO",
            AssetType::YoutubeVideo => "YOUTUBE_VIDEO",
            AssetType::Headline => "HEADLINE",
            AssetType::Description => "DESCRIPTION",
            AssetType::LongHeadline => "LONG_HEADLINE",
            AssetType::BusinessName => "BUSINESS_NAME",
            AssetType::CallToActionSelection => "CALL_TO_ACTION_SELECTION",
            AssetType::Sitelink => "SITELINK",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            AssetType::MarketingImage
                | AssetType::SquareMarketingImage
                | AssetType::PortraitMarketingImage
                | AssetType::Logo
                | AssetType::LandscapeLogo
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            AssetType::Headline
                | AssetType::Description
                | AssetType::LongHeadline
                | AssetType::BusinessName
        )
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let asset_type = match normalized.as_str() {
            "MARKETING_IMAGE" => AssetType::MarketingImage,
            "SQUARE_MARKETING_IMAGE" => AssetType::SquareMarketingImage,
            "PORTRAIT_MARKETING_IMAGE" => AssetType::PortraitMarketingImage,
            "LOGO" => AssetType::Logo,
            "LANDSCAPE_LOGO" => AssetType::LandscapeLogo,
            "YOUTUBE_VIDEO" => AssetType::YoutubeVideo,
            "HEADLINE" => AssetType::Headline,
            "DESCRIPTION" => AssetType::Description,
            "LONG_HEADLINE" => AssetType::LongHeadline,
            "BUSINESS_NAME" => AssetType::BusinessName,
            // Older templates used the short name in the type dropdown.
            "CALL_TO_ACTION_SELECTION" | "CALL_TO_ACTION" => AssetType::CallToActionSelection,
            "SITELINK" => AssetType::Sitelink,
            _ => return Err(format!("Unknown asset type: {}", s)),
        };
        Ok(asset_type)
    }
}
