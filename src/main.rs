use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locker_core::constants::DATA_DIR_ENV;
use locker_core::{CoreConfig, LockerEngine};

mod menu;

/// Main entry point for the interactive locker
///
/// Resolves the data directory, creates it if needed and runs the console menu
/// on stdin/stdout until the user exits or input ends.
///
/// # Environment Variables
/// - `LOCKER_DATA_DIR`: Directory for locker data (default: "data")
/// - `RUST_LOG`: Log filter; logs go to stderr (default directive: "locker=info")
///
/// # Returns
/// * `Ok(())` - On exit or end of input
/// * `Err(anyhow::Error)` - If the data directory cannot be created or the terminal fails
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("locker=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cfg = CoreConfig::from_env_value(std::env::var(DATA_DIR_ENV).ok())?;
    cfg.ensure_data_dir()?;
    tracing::info!("++ Using locker data in {}", cfg.data_dir().display());

    let engine = LockerEngine::new(Arc::new(cfg));
    menu::Console::new(&engine, io::stdin().lock(), io::stdout().lock()).run()?;

    Ok(())
}
