//! Storefront CLI - command line administration for a hosted storefront

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use storefront_cli::logging::init_logging;
use storefront_cli::{print_json, print_period, resolve_period, run, Cli, Commands};
use storefront_core::test_utils::{seeded_store_at, MemoryAuth, DEMO_ADMIN};
use storefront_core::{
    AccessToken, AuthService, Clock, ConfigLoader, FixedClock, RestAuth, RestStore, Storefront,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_paths(vec![path.clone()]);
    }
    let config = loader.load().context("failed to load configuration")?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logging(level, cli.log_json)?;

    // Read the wall clock once so every panel sees the same "now"
    let offset = config.utc_offset();
    let clock = FixedClock::new(Utc::now().with_timezone(&offset).naive_local());
    let mut stdout = std::io::stdout().lock();

    if let Commands::Period { period } = &cli.command {
        let report = resolve_period(period, clock, &offset)?;
        if cli.json {
            print_json(&report, &mut stdout)?;
        } else {
            print_period(&report, &mut stdout)?;
        }
        return Ok(());
    }

    if cli.demo {
        let store = Arc::new(seeded_store_at(clock.now(), offset)?);
        let auth = AuthService::new(MemoryAuth::demo(Arc::clone(&store)), Arc::clone(&store));
        let (email, password) = cli.credentials().unwrap_or(DEMO_ADMIN);
        auth.sign_in(email, password).await?;
        info!(user = email, "running against demo data");

        let storefront = Storefront::new(store, &config);
        run(&storefront, &clock, &cli.command, cli.json, &mut stdout).await?;
        return Ok(());
    }

    config
        .validate_remote()
        .context("the hosted backend is not configured; set STOREFRONT_API_URL and STOREFRONT_API_KEY or use --demo")?;
    let (email, password) = cli
        .credentials()
        .context("--email and --password (or STOREFRONT_EMAIL and STOREFRONT_PASSWORD) are required")?;

    let token = AccessToken::new();
    let auth = AuthService::new(
        RestAuth::new(&config, token.clone())?,
        RestStore::new(&config, token.clone())?,
    );
    auth.sign_in(email, password).await?;

    let storefront = Storefront::new(RestStore::new(&config, token)?, &config);
    let outcome = run(&storefront, &clock, &cli.command, cli.json, &mut stdout).await;
    auth.sign_out().await?;
    outcome?;
    Ok(())
}
