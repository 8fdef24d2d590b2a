pub mod sheet_requests;
pub mod sheets_client;

pub use sheets_client::GoogleSheetsClient;
