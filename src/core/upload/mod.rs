pub mod asset_fetcher;
pub mod asset_groups;
pub mod assets;
pub mod campaigns;
pub mod results;
pub mod sitelinks;
pub mod upload_models;
pub mod upload_service;

#[cfg(test)]
pub mod testing;

pub use asset_fetcher::{AssetFetcher, FetchError};
pub use upload_models::{StepReport, UploadError, UploadReport};
pub use upload_service::UploadService;
