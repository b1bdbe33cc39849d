//! Logistics server executable
//!
//! `serve` runs the HTTP endpoints; `client`, `request` and `shipment` are
//! operator commands working on the same database.

use anyhow::Context;
use logistics_core::{paths, Database, LogisticsConfig};
use logistics_server::{admin, cli::cli, http, AppContext};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    let data_dir = matches
        .get_one::<String>("data-dir")
        .context("--data-dir is required")?;
    if let Err(e) = paths::init_data_root(data_dir.clone()) {
        log::warn!("Data root initialization warning: {}", e);
    }
    log::info!("Using data directory: {}", data_dir);

    let templates_dir = matches
        .get_one::<String>("templates-dir")
        .context("--templates-dir is required")?;
    if let Err(e) = paths::init_templates_root(templates_dir.clone()) {
        log::warn!("Templates root initialization warning: {}", e);
    }
    log::info!("Using templates directory: {}", templates_dir);

    let config_path = matches
        .get_one::<String>("config")
        .context("--config is required")?;
    let config = LogisticsConfig::from_file(config_path)?;
    log::info!("Loaded configuration from {}", config_path);

    let db = Database::open(paths::database_path(), &config.database)?;
    let ctx = AppContext::new(config, db)?;

    match matches.subcommand() {
        Some(("serve", sub)) => {
            let addr: SocketAddr = match sub.get_one::<String>("bind") {
                Some(bind) => bind
                    .parse()
                    .with_context(|| format!("Invalid bind address '{}'", bind))?,
                None => ctx.config.bind_address()?,
            };
            http::serve(ctx, addr).await
        }
        Some(_) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            admin::execute(&ctx, &matches, &mut out).await
        }
        None => {
            log::error!("No action specified. Use --help for options.");
            std::process::exit(1);
        }
    }
}
