//! Globus share manager
//!
//! Command-line front end for the ACL reconciler and the credential bootstrap.

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use globus_share::{
    api::{IdentityClient, TransferClient},
    auth::create_auth_provider,
    config::{
        AUTH_RESOURCE_SERVER, AppConfig, LogFormat, TRANSFER_RESOURCE_SERVER,
        load_bootstrap_config, load_config,
    },
    credentials::{self, CredentialStore, NativeAppClient},
    reconciler::{Reconciler, ReconcilerSettings, RevokeResult, ShareResult},
};
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Manage per-user access rules on a shared Globus endpoint
#[derive(Parser, Debug)]
#[command(name = "globus-share")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "GLOBUS_SHARE_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "GLOBUS_SHARE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grant a user read/write access to a directory on the endpoint
    CreateShare {
        /// Directory to share; created if missing
        #[arg(long, visible_alias = "share-dir")]
        path: PathBuf,

        /// Username to share with
        #[arg(long, visible_alias = "share-name")]
        user: String,
    },

    /// Remove an access rule by id
    DeleteShare {
        /// Id of the rule to remove
        #[arg(long, visible_alias = "share-id")]
        rule_id: String,
    },

    /// List access rules, optionally only those under a path segment
    ListShares {
        /// Path segment to match, e.g. a username
        filter: Option<String>,
    },

    /// Mint or renew the tokens in the credential store
    RefreshCredential {
        /// Renew from stored refresh tokens instead of asking for a login
        #[arg(long)]
        non_interactive: bool,
    },
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for command output
    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Build the reconciler with clients for both resource servers
fn build_reconciler(config: &AppConfig) -> globus_share::Result<Reconciler> {
    let store_path = config.credentials.resolved_path();
    let store = CredentialStore::load(&store_path)
        .inspect_err(|e| error!(error = %e, "Failed to load credential store"))?;

    let transfer_auth = create_auth_provider(TRANSFER_RESOURCE_SERVER, &store)
        .inspect_err(|e| error!(error = %e, "Failed to create transfer auth provider"))?;
    let identity_auth = create_auth_provider(AUTH_RESOURCE_SERVER, &store)
        .inspect_err(|e| error!(error = %e, "Failed to create auth provider"))?;

    let transfer = Arc::new(TransferClient::new(&config.transfer, transfer_auth)?);
    let identities = Arc::new(IdentityClient::new(&config.auth, identity_auth)?);

    Ok(Reconciler::new(
        transfer,
        identities,
        ReconcilerSettings::from_config(config),
    ))
}

/// Give the credential and service time to settle before the first call
async fn startup_grace(config: &AppConfig) {
    let secs = config.share.startup_grace_secs;
    if secs > 0 {
        info!(secs, "Waiting before first API call");
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}

async fn create_share(config: &AppConfig, path: PathBuf, user: String) -> anyhow::Result<()> {
    let reconciler = build_reconciler(config)?;
    startup_grace(config).await;

    let result = reconciler
        .ensure_share(&path, &user)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to create share"))?;

    match result {
        ShareResult::Created { rule_id } => {
            println!(
                "Created share {} on {} for {}",
                rule_id,
                path.display(),
                user
            );
        }
        ShareResult::AlreadyExists => {
            println!("Share already exists on {} for {}", path.display(), user);
        }
    }
    Ok(())
}

async fn delete_share(config: &AppConfig, rule_id: String) -> anyhow::Result<()> {
    let reconciler = build_reconciler(config)?;
    startup_grace(config).await;

    // A failed delete is reported but does not fail the command
    match reconciler.revoke_share(&rule_id).await {
        RevokeResult::Deleted => println!("Deleted share {}", rule_id),
        RevokeResult::Failed(e) => println!("{}", e),
    }
    Ok(())
}

async fn list_shares(config: &AppConfig, filter: Option<String>) -> anyhow::Result<()> {
    let reconciler = build_reconciler(config)?;
    startup_grace(config).await;

    let listing = reconciler
        .list_shares(filter.as_deref())
        .await
        .inspect_err(|e| error!(error = %e, "Failed to list shares"))?;

    if !listing.is_detailed() {
        for rule in listing.abbreviated() {
            println!("{}", serde_json::to_string(rule)?);
        }
    } else {
        let mut rules = pin!(listing.stream());
        while let Some(rule) = rules.next().await {
            let rule = rule.inspect_err(|e| error!(error = %e, "Failed to fetch share detail"))?;
            for line in rule.detail_lines() {
                println!("{}", line);
            }
            println!();
        }
    }

    println!("Done");
    Ok(())
}

async fn refresh_credential(config: &AppConfig, non_interactive: bool) -> anyhow::Result<()> {
    let client_id = config
        .auth
        .client_id
        .as_deref()
        .context("auth.client_id is not configured")?;
    let client = NativeAppClient::new(&config.auth, client_id)?;
    let store_path = config.credentials.resolved_path();

    let store = if non_interactive {
        credentials::refresh_stored(&client, &store_path).await
    } else {
        let stdin = std::io::stdin();
        credentials::bootstrap_interactive(&client, &store_path, stdin.lock(), std::io::stdout())
            .await
    }
    .inspect_err(|e| error!(error = %e, "Failed to refresh credentials"))?;

    println!("Credential store written to {}", store_path.display());
    for token in store.tokens() {
        let expires = token
            .expires_at_seconds
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        println!("{:<28} expires {}", token.resource_server, expires);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = match &args.command {
        Command::RefreshCredential { .. } => load_bootstrap_config(args.config.as_deref()),
        _ => load_config(args.config.as_deref()),
    }
    .context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level, config.logging.format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %config.endpoint.id,
        "Starting globus-share"
    );

    match args.command {
        Command::CreateShare { path, user } => create_share(&config, path, user).await,
        Command::DeleteShare { rule_id } => delete_share(&config, rule_id).await,
        Command::ListShares { filter } => list_shares(&config, filter).await,
        Command::RefreshCredential { non_interactive } => {
            refresh_credential(&config, non_interactive).await
        }
    }
}
