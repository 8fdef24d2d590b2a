pub mod asset_check;
pub mod dropdowns;
pub mod validation_service;

pub use asset_check::{check_asset_group_row, AssetCheck};
pub use dropdowns::{dropdown_requests, row_dropdowns};
pub use validation_service::{ValidationService, ValidationSummary};
