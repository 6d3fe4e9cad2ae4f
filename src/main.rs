// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{debug, info};

use broker_cli::adapter::HttpAdapter;
use broker_cli::auth::{OAuthTokenSource, TokenSource};
use broker_cli::commands::{self, Cli, Context};
use broker_cli::config::Config;
use broker_cli::transport::ReqwestTransport;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration, command-line flags win over the environment
    let config = Config::from_env()?.with_overrides(
        cli.host.clone(),
        cli.api_version.clone(),
        cli.creds.clone(),
    )?;
    debug!(
        "Configuration loaded: host={}, api_version={}",
        config.host, config.api_version
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!("broker-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    let tokens: Arc<dyn TokenSource> = match &config.credentials {
        Some(path) => Arc::new(
            OAuthTokenSource::from_file(http.clone(), path).with_context(|| {
                format!("Error creating credentials from service account file {}", path.display())
            })?,
        ),
        None => Arc::new(
            OAuthTokenSource::from_default_credentials(http.clone())
                .context("Error creating credentials using gcloud application default credentials")?,
        ),
    };
    info!("Credentials configured");

    let ctx = Context {
        adapter: HttpAdapter::new(ReqwestTransport::new(http, tokens)),
        host: config.host,
        api_version: config.api_version,
        show_progress: cli.verbose > 0,
    };

    commands::run(&ctx, cli.command).await?;
    Ok(())
}
