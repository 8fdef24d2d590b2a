pub mod drive_fetcher;

pub use drive_fetcher::DriveAssetFetcher;
