pub mod cell_edit;
pub mod edit_service;

pub use cell_edit::{CellEdit, EditOutcome};
pub use edit_service::{EditError, EditService};
