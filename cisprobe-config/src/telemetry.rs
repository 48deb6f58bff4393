use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("tracing subscriber already initialised: {0}")]
    AlreadyInitialised(#[from] TryInitError),
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`
/// when set.
pub fn init_tracing(default_directive: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}
