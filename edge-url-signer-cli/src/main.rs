/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Prints a signed edge access URL.
//!
//! Settings are read from environment variables (`URL`, `KEY`, `KEY_ID`, `EXP`,
//! `FIRST_EXP`, `CO`, `REG`, `NO_SSN`, `SSN`, `UA`, `REF`, `QS`); command line flags
//! override them.

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use edge_url_signer::UrlSigner;
use env::Env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod env;

#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub(crate) struct Args {
    /// Destination URL, e.g. `https://cdn.example.com/video.mp4` [env: URL]
    #[arg(long)]
    pub(crate) url: Option<String>,
    /// Signing secret [env: KEY]
    #[arg(long)]
    pub(crate) key: Option<String>,
    /// Signing key identifier [env: KEY_ID]
    #[arg(long)]
    pub(crate) key_id: Option<String>,
    /// Token validity, e.g. `24h` or `1h30m` [env: EXP, default: 24h]
    #[arg(long)]
    pub(crate) expires_in: Option<String>,
    /// First-access validity [env: FIRST_EXP, default: 5m]
    #[arg(long)]
    pub(crate) first_access_expires_in: Option<String>,
    /// Viewer country; binds the country when non-empty [env: CO]
    #[arg(long)]
    pub(crate) country: Option<String>,
    /// Viewer region; binds the region when non-empty [env: REG]
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// Do not bind a session id [env: NO_SSN]
    #[arg(long)]
    pub(crate) no_session: bool,
    /// Session id to bind instead of generating one [env: SSN]
    #[arg(long)]
    pub(crate) session_id: Option<String>,
    /// Viewer `user-agent` header; bound when non-empty [env: UA]
    #[arg(long)]
    pub(crate) user_agent: Option<String>,
    /// Viewer `referer` header; bound when non-empty [env: REF]
    #[arg(long)]
    pub(crate) referer: Option<String>,
    /// Query parameter to bind, repeatable [env: QS, comma separated]
    #[arg(long, value_name = "NAME=VALUE")]
    pub(crate) query: Vec<String>,
    /// Log debug output to stderr when `RUST_LOG` is unset
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = Config::load(&Env::real(), &args).context("failed to load configuration")?;
    tracing::debug!(
        destination = %config.destination(),
        key_id = config.key_id(),
        "loaded configuration"
    );

    let signer = UrlSigner::builder()
        .key(config.key_id(), config.key().clone())
        .build()
        .context("failed to create signer")?;
    let signed = signer
        .sign_url(
            config.destination(),
            config.key_id(),
            &config.policy(),
            &config.viewer(),
        )
        .context("failed to sign URL")?;

    println!("URL: {signed}");
    Ok(())
}
