use super::trigger_message::TriggerMessage;
use crate::core::accounts::{AccountError, AccountService, PropertyStore};
use crate::core::ads::AdsApi;
use crate::core::edits::{EditError, EditOutcome, EditService};
use crate::core::refresh::{RefreshError, RefreshService};
use crate::core::sheets::{SheetsApi, SheetsError};
use crate::core::upload::{AssetFetcher, UploadError, UploadReport, UploadService};
use crate::core::validation::{ValidationService, ValidationSummary};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    Refreshed { customers: usize, index_changed: bool },
    Uploaded(UploadReport),
    IndexRebuilt { customers: usize },
    Validated(ValidationSummary),
    Edited(Vec<EditOutcome>),
}

/// Routes trigger messages to the services that do the work.
pub struct TriggerHandler<P, S: ?Sized, A: ?Sized, F: ?Sized> {
    accounts: Arc<AccountService<P, S>>,
    edits: EditService<P, S>,
    upload: UploadService<S, A, F>,
    refresh: RefreshService<S, A>,
    validation: ValidationService<S>,
}

impl<P, S, A, F> TriggerHandler<P, S, A, F>
where
    P: PropertyStore,
    S: SheetsApi + ?Sized,
    A: AdsApi + ?Sized,
    F: AssetFetcher + ?Sized,
{
    pub fn new(
        accounts: Arc<AccountService<P, S>>,
        upload: UploadService<S, A, F>,
        refresh: RefreshService<S, A>,
        sheets: Arc<S>,
    ) -> Self {
        Self {
            edits: EditService::new(Arc::clone(&accounts), Arc::clone(&sheets)),
            validation: ValidationService::new(sheets),
            accounts,
            upload,
            refresh,
        }
    }

    pub async fn handle(&self, message: &TriggerMessage) -> Result<HandlerOutcome, HandlerError> {
        tracing::info!("------- START {} EXECUTION -------", message);
        let outcome = self.dispatch(message).await;
        match &outcome {
            Ok(result) => tracing::debug!(?result, "Message handled"),
            Err(e) => tracing::error!("{} failed: {}", message, e),
        }
        tracing::info!("------- END {} EXECUTION -------", message);
        outcome
    }

    async fn dispatch(&self, message: &TriggerMessage) -> Result<HandlerOutcome, HandlerError> {
        match message {
            TriggerMessage::Refresh(scope) => {
                let known = self.accounts.load_index().await?;
                let index = self.refresh.refresh(*scope, &known).await?;
                let index_changed = self.accounts.merge_index(&index).await?;
                Ok(HandlerOutcome::Refreshed {
                    customers: index.customers().len(),
                    index_changed,
                })
            }
            TriggerMessage::Upload => {
                let report = self.upload.run().await?;
                self.accounts.record_created(&report.created).await?;
                Ok(HandlerOutcome::Uploaded(report))
            }
            TriggerMessage::RebuildIndex => {
                let index = self.accounts.rebuild_index().await?;
                Ok(HandlerOutcome::IndexRebuilt {
                    customers: index.customers().len(),
                })
            }
            TriggerMessage::ValidateAssetGroups => Ok(HandlerOutcome::Validated(
                self.validation.validate_asset_groups().await?,
            )),
            TriggerMessage::Edit(edit) => Ok(HandlerOutcome::Edited(self.edits.handle_edit(edit).await?)),
        }
    }
}
