// Maps mutate responses back onto sheet rows.
//
// Every row contributes an asset create and a link (or a single remove), and
// all of them name the same asset or link resource. That name is how an
// operation index finds its row again.

use super::upload_models::{RowResult, RowResults};
use crate::core::ads::{AdsError, MutateOperation, MutateResponse};
use std::collections::HashMap;

/// Operations for one customer plus the row each of them came from.
#[derive(Debug, Default)]
pub struct OperationBatch {
    pub customer_id: String,
    pub operations: Vec<MutateOperation>,
    rows: HashMap<String, usize>,
}

fn row_key(operation: &MutateOperation) -> Option<&str> {
    operation.created_asset().or_else(|| operation.link_target())
}

impl OperationBatch {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            ..Default::default()
        }
    }

    pub fn push_row(&mut self, row: usize, operations: Vec<MutateOperation>) {
        for operation in &operations {
            if let Some(key) = row_key(operation) {
                self.rows.insert(key.to_string(), row);
            }
        }
        self.operations.extend(operations);
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn row_for(&self, operation: &MutateOperation) -> Option<usize> {
        row_key(operation).and_then(|key| self.rows.get(key).copied())
    }

    pub fn row_indexes(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.rows.values().copied().collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}

/// Per-row results of a partial-failure mutate.
pub fn map_response(batch: &OperationBatch, response: &MutateResponse) -> RowResults {
    let errors = response.errors_by_operation();
    let mut results = RowResults::new();

    for (i, operation) in batch.operations.iter().enumerate() {
        let Some(row) = batch.row_for(operation) else {
            continue;
        };

        if let Some(message) = errors.get(&i) {
            match results.get_mut(&row) {
                Some(existing) if existing.is_error() => {
                    existing.message.push('\n');
                    existing.message.push_str(message);
                }
                _ => {
                    results.insert(row, RowResult::error(message.clone()));
                }
            }
            continue;
        }

        if results.get(&row).map(RowResult::is_error).unwrap_or(false) {
            continue;
        }
        if operation.is_remove() {
            results.insert(row, RowResult::removed());
        } else if operation.link_target().is_some() {
            let resource = response.resource_name(i).map(str::to_string);
            results.insert(row, RowResult::uploaded(resource));
        }
    }
    results
}

/// The whole request failed: every row of the batch gets the error.
pub fn map_failure(batch: &OperationBatch, error: &AdsError) -> RowResults {
    let message = error.to_string();
    batch
        .row_indexes()
        .into_iter()
        .map(|row| (row, RowResult::error(message.clone())))
        .collect()
}
