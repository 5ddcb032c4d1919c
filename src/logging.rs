//! Structured logging setup

use anyhow::{anyhow, Result};

/// Install a global `tracing` subscriber filtered at `log_level`
///
/// `RUST_LOG` takes precedence over `log_level` when set.
pub fn init_logging(log_level: &str) -> Result<()> {
    match log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", log_level)),
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.to_lowercase().into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
