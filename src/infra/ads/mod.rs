pub mod ads_client;

pub use ads_client::GoogleAdsClient;
