//! Diliguard server binary

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use diliguard_lib::config::DiliguardConfig;
use diliguard_lib::server::{generate_auth_token, run_server, DiliguardState};
use diliguard_lib::store::{HttpAccountStore, HttpRecordStore, MemoryStore};
use diliguard_lib::webhook::{HttpWebhook, NoopWebhook, WebhookDispatcher};

#[derive(Parser, Debug)]
#[command(name = "diliguard", version, about = "Due-diligence research server")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "DILIGUARD_PORT", default_value_t = 8787)]
    port: u16,

    /// Address to bind to
    #[arg(long, env = "DILIGUARD_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Allowed CORS origins (repeatable; permissive when unset)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Path to a config file (defaults to ~/.diliguard/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DiliguardConfig::load_from(path)?,
        None => DiliguardConfig::load()?,
    };

    let auth_token = config
        .auth_token
        .clone()
        .unwrap_or_else(generate_auth_token);

    let state = if config.has_remote_store() {
        let store_url = config.store_url.clone().unwrap();
        let api_key = config.store_api_key.clone().unwrap();
        let Some(webhook_url) = config.webhook_url.clone() else {
            bail!("webhook_url must be configured when the hosted store is used");
        };

        log::info!("Using hosted record store at {}", store_url);
        DiliguardState::new(
            auth_token.clone(),
            Arc::new(HttpRecordStore::new(store_url.clone(), api_key.clone())),
            Arc::new(HttpAccountStore::new(store_url, api_key)),
            Arc::new(HttpWebhook::new(webhook_url)),
        )
    } else {
        // Local development mode: everything in-process
        log::warn!("No hosted store configured; using the in-process store");
        let store = Arc::new(MemoryStore::new());
        let webhook: Arc<dyn WebhookDispatcher> = match config.webhook_url.clone() {
            Some(url) => Arc::new(HttpWebhook::new(url)),
            None => Arc::new(NoopWebhook),
        };
        DiliguardState::new(auth_token.clone(), store.clone(), store, webhook)
    };

    let shutdown_state = state.shutdown_state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_state.request_shutdown();
        }
    });

    println!("Diliguard server starting on http://{}:{}", args.bind, args.port);
    println!("Auth token: {}", auth_token);

    let cors_origins = if args.cors_origins.is_empty() {
        None
    } else {
        Some(args.cors_origins)
    };

    run_server(args.port, &args.bind, state, cors_origins)
        .await
        .map_err(anyhow::Error::msg)
}
