pub mod ads_models;
pub mod ads_port;
pub mod gaql;

#[cfg(test)]
pub mod testing;

pub use ads_models::{resources, GoogleAdsRow, MutateOperation, MutateResponse, TempIdAllocator};
pub use ads_port::{AdsApi, AdsError};
