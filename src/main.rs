// This is the entry point of the sheet sync tool.
//
// **Architecture Overview:**
// - `core/` = Business logic (sheet model, upload, refresh, edits)
// - `infra/` = Implementations of core traits (Google APIs, property files)
// - `trigger/` = Command line and Pub/Sub adapters
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Dispatch the requested command

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "trigger/trigger_layer.rs"]
mod trigger;

use crate::core::accounts::AccountService;
use crate::core::config::AppConfig;
use crate::core::refresh::RefreshService;
use crate::core::trigger::{MessagePublisher, TriggerHandler};
use crate::core::upload::UploadService;
use crate::infra::ads::GoogleAdsClient;
use crate::infra::drive::DriveAssetFetcher;
use crate::infra::google_auth::GoogleAuth;
use crate::infra::properties::JsonPropertyStore;
use crate::infra::pubsub::PubSubClient;
use crate::infra::sheets::GoogleSheetsClient;
use crate::trigger::cli::publishable;
use crate::trigger::{Cli, Command, Listener};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

type AppHandler =
    TriggerHandler<JsonPropertyStore, GoogleSheetsClient, GoogleAdsClient, DriveAssetFetcher>;

fn pubsub_client(config: &AppConfig, auth: &Arc<GoogleAuth>) -> anyhow::Result<(PubSubClient, u64)> {
    let pubsub = config
        .pubsub
        .as_ref()
        .context("Missing PUBSUB_PROJECT_ID environment variable")?;
    let client = PubSubClient::new(
        Arc::clone(auth),
        pubsub.project_id.clone(),
        pubsub.topic.clone(),
        pubsub.subscription.clone(),
    );
    Ok((client, pubsub.poll_interval_secs))
}

// ============================================================================
// DEPENDENCY INJECTION
// ============================================================================
// This is the "composition root" where we wire everything together.
fn build_handler(config: &AppConfig, auth: &Arc<GoogleAuth>) -> anyhow::Result<AppHandler> {
    let sheets = Arc::new(GoogleSheetsClient::new(
        Arc::clone(auth),
        config.spreadsheet_id.clone(),
    ));
    let ads = Arc::new(GoogleAdsClient::new(
        Arc::clone(auth),
        config.ads_api_version.clone(),
        config.developer_token.clone(),
        config.login_customer_id.clone(),
    ));
    let fetcher = Arc::new(DriveAssetFetcher::new(Arc::clone(auth)));

    let store = JsonPropertyStore::open(&config.property_store_dir, &config.spreadsheet_id)
        .context("Failed to open property store")?;
    let accounts = Arc::new(AccountService::new(store, Arc::clone(&sheets)));

    Ok(TriggerHandler::new(
        accounts,
        UploadService::new(Arc::clone(&sheets), Arc::clone(&ads), fetcher),
        RefreshService::new(
            Arc::clone(&sheets),
            ads,
            config.login_customer_id.clone(),
            config.customer_id_inclusion_list.clone(),
        ),
        sheets,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let auth = Arc::new(
        GoogleAuth::from_source(&config.credentials)
            .await
            .context("Failed to load Google credentials")?,
    );

    match &cli.command {
        Command::Publish { message } => {
            let data = publishable(message)?;
            let (pubsub, _) = pubsub_client(&config, &auth)?;
            let message_id = pubsub.publish(&data).await?;
            tracing::info!(message_id = %message_id, "Published {}", data);
        }
        Command::Listen { max_messages } => {
            let (pubsub, poll_interval_secs) = pubsub_client(&config, &auth)?;
            let handler = Arc::new(build_handler(&config, &auth)?);
            Listener::new(
                handler,
                Arc::new(pubsub),
                Duration::from_secs(poll_interval_secs),
                *max_messages as usize,
            )
            .run()
            .await;
        }
        command => {
            let handler = build_handler(&config, &auth)?;
            if let Some(message) = command.message().await? {
                let outcome = handler.handle(&message).await?;
                tracing::info!(?outcome, "Done");
            }
        }
    }

    Ok(())
}
