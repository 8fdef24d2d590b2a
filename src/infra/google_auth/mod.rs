pub mod token_source;

pub use token_source::{AuthError, GoogleAuth};
