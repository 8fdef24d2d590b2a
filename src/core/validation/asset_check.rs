// Minimum-asset validator for NewAssetGroups rows.
//
// Google Ads refuses to create a Performance Max asset group without a
// minimum set of assets, so each row is counted against these thresholds
// before anything is sent.

use crate::core::sheets::sheet_models::new_asset_groups as cols;
use crate::core::sheets::sheet_rows::{cell_range, non_blank};
use crate::core::sheets::{AssetType, SheetName, ValueRange};

pub struct AssetRequirement {
    pub asset_type: AssetType,
    pub minimum: usize,
    pub columns: &'static [usize],
}

pub const REQUIREMENTS: [AssetRequirement; 7] = [
    AssetRequirement {
        asset_type: AssetType::Headline,
        minimum: 3,
        columns: &[cols::HEADLINE1, cols::HEADLINE2, cols::HEADLINE3],
    },
    AssetRequirement {
        asset_type: AssetType::Description,
        minimum: 2,
        columns: &[cols::DESCRIPTION1, cols::DESCRIPTION2],
    },
    AssetRequirement {
        asset_type: AssetType::LongHeadline,
        minimum: 1,
        columns: &[cols::LONG_HEADLINE],
    },
    AssetRequirement {
        asset_type: AssetType::BusinessName,
        minimum: 1,
        columns: &[cols::BUSINESS_NAME],
    },
    AssetRequirement {
        asset_type: AssetType::MarketingImage,
        minimum: 1,
        columns: &[cols::MARKETING_IMAGE],
    },
    AssetRequirement {
        asset_type: AssetType::SquareMarketingImage,
        minimum: 1,
        columns: &[cols::SQUARE_MARKETING_IMAGE],
    },
    AssetRequirement {
        asset_type: AssetType::Logo,
        minimum: 1,
        columns: &[cols::LOGO],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub asset_type: AssetType,
    pub found: usize,
    pub required: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetCheck {
    pub shortfalls: Vec<Shortfall>,
}

impl AssetCheck {
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }

    /// Empty when complete, e.g. `Missing required assets: HEADLINE 1/3, LOGO 0/1`.
    pub fn message(&self) -> String {
        if self.is_complete() {
            return String::new();
        }
        let parts: Vec<String> = self
            .shortfalls
            .iter()
            .map(|s| format!("{} {}/{}", s.asset_type, s.found, s.required))
            .collect();
        format!("Missing required assets: {}", parts.join(", "))
    }

    /// Value for the asset-check checkbox column.
    pub fn check_cell(&self) -> &'static str {
        if self.is_complete() {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// Writes for the check and message cells of one sheet row.
    pub fn cell_updates(&self, sheet_row: usize) -> Vec<ValueRange> {
        vec![
            ValueRange {
                range: cell_range(SheetName::NewAssetGroups, sheet_row, cols::ASSET_CHECK),
                values: vec![vec![self.check_cell().to_string()]],
            },
            ValueRange {
                range: cell_range(SheetName::NewAssetGroups, sheet_row, cols::MESSAGE),
                values: vec![vec![self.message()]],
            },
        ]
    }
}

pub fn check_asset_group_row(row: &[String]) -> AssetCheck {
    let shortfalls = REQUIREMENTS
        .iter()
        .filter_map(|req| {
            let found = req
                .columns
                .iter()
                .filter(|&&column| non_blank(row, column).is_some())
                .count();
            (found < req.minimum).then_some(Shortfall {
                asset_type: req.asset_type,
                found,
                required: req.minimum,
            })
        })
        .collect();
    AssetCheck { shortfalls }
}
