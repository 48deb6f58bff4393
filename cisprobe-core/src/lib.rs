//! # cisprobe core
//!
//! Compliance evaluation for a single changed resource: decide whether the
//! resource is in scope, run the remote benchmark scan against it, poll until
//! the scan settles, and turn the outcome into one compliance verdict that is
//! reported back to the monitoring service.
//!
//! ## Architecture
//!
//! - [`gatekeeper`]: pure classification of inbound notifications
//! - [`prober`]: dispatch plus bounded polling of the remote check
//! - [`parser`]: pluggable interpretation of scan output
//! - [`ports`]: collaborator traits for the execution and reporting services
//! - [`handler`]: one invocation end to end
//! - [`config`]: tunables shared with the config loader
//! - [`testing`]: in-memory collaborators for tests and dry runs
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cisprobe_core::{
//!     config::ProbeConfig,
//!     handler::EvaluationHandler,
//!     testing::{RecordingReporter, ScriptedCheckService},
//! };
//! use cisprobe_model::InvocationEnvelope;
//!
//! async fn run(raw: &str) -> cisprobe_core::error::Result<()> {
//!     let handler = EvaluationHandler::from_config(
//!         &ProbeConfig::default(),
//!         Arc::new(ScriptedCheckService::new()),
//!         Arc::new(RecordingReporter::new()),
//!     );
//!     let envelope = InvocationEnvelope::from_json(raw)?;
//!     let evaluation = handler.handle(&envelope).await?;
//!     println!("{}", evaluation.compliance_type);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gatekeeper;
pub mod handler;
pub mod parser;
pub mod ports;
pub mod prober;
pub mod testing;

pub use config::{BenchmarkDocument, PollPolicy, ProbeConfig};
pub use error::{ProbeError, Result};
pub use gatekeeper::{Admission, Gatekeeper};
pub use handler::EvaluationHandler;
pub use parser::{
    ComplianceOutputParser, MarkerPhraseParser, OutputAssessment,
    SummaryCountParser,
};
pub use ports::{
    CheckExecutionService, ComplianceReporter, DispatchRequest, StatusQuery,
};
pub use prober::ComplianceProber;
