//! Settings host: activates the store, waits for shutdown, deactivates.

use anyhow::Context;
use connector_settings::config::ConfigLoader;
use connector_settings::logging::init_logging;
use connector_settings::{Settings, SledSettings};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let base_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let config = ConfigLoader::load(&base_dir).context("Failed to load configuration")?;
    init_logging(Some(&config.logging))?;

    let db_path = config.storage.resolve_db_path(&base_dir);
    let settings = match SledSettings::activate(&db_path) {
        Ok(settings) => settings,
        Err(e) => {
            error!(path = %db_path.display(), error = %e, "Settings activation failed, aborting startup");
            return Err(e.into());
        }
    };

    let report = settings.migration_report();
    info!(
        path = %db_path.display(),
        schema_version = report.to_version,
        migrated_steps = report.steps_applied,
        future_version = report.future_version,
        users = settings.users()?.len(),
        "Settings store active"
    );

    shutdown_signal().await?;

    info!("Shutdown requested, closing settings store");
    settings.deactivate()?;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
