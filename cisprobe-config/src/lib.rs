//! Shared configuration library for cisprobe.
//!
//! Resolves the evaluator configuration from the environment, files or
//! inline JSON, applies point overrides, enforces guard rails, and installs
//! the tracing subscriber used by the invocation entry point.

pub mod loader;
pub mod telemetry;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoader, ProbeConfigSource, load_from_file,
    parse_from_str, parse_json,
};
pub use telemetry::{TelemetryError, init_tracing};
pub use validation::{ConfigGuardRailError, ConfigWarning, validate};
