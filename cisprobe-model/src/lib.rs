//! Core data model definitions shared across cisprobe crates.
#![allow(missing_docs)]

pub mod error;
pub mod notification;
pub mod scan;
pub mod verdict;

pub use error::{ModelError, Result as ModelResult};
pub use notification::{
    ChangeNotification, ConfigurationItem, InvocationEnvelope, InvokingEvent,
    ResourceConfiguration,
};
pub use scan::{
    ExecutionId, ExecutionSnapshot, ExecutionStatus, ScanExecution,
    ScanRequest, TargetId,
};
pub use verdict::{ComplianceType, Evaluation, Verdict};
