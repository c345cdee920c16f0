// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the binding engine.

use crate::accessor::InputKind;
use thiserror::Error;

/// A capability call on the external runtime failed.
///
/// The probe layer never lets these escape: a failed capability call is
/// treated exactly like a missing one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The runtime object does not implement the capability
    #[error("capability `{0}` is not supported")]
    Unsupported(&'static str),

    /// The runtime raised an error while servicing the call
    #[error("runtime call failed: {0}")]
    Failed(String),
}

/// Result of a single capability call on a runtime object.
pub type ProbeResult<T> = std::result::Result<Option<T>, ProbeError>;

/// Write-back failures for callers that want to know why nothing happened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// No live accessor currently resolves at the path
    #[error("no live accessor at `{path}`")]
    NotAvailable {
        /// Address that failed to resolve
        path: String,
    },

    /// The accessor at the path has a different kind than the value
    #[error("`{path}` is a {found} input, not {expected}")]
    KindMismatch {
        /// Address of the accessor
        path: String,
        /// Kind the caller expected
        expected: InputKind,
        /// Kind the runtime exposes
        found: InputKind,
    },

    /// The value cannot be applied (non-finite number, unknown enum value)
    #[error("invalid value for `{path}`: {reason}")]
    InvalidValue {
        /// Address of the accessor
        path: String,
        /// Human readable reason
        reason: String,
    },
}

/// Viewer level errors (configuration, documents, IO).
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Configuration could not be parsed or is unsupported
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A runtime document could not be parsed
    #[error("Invalid runtime document: {0}")]
    Document(String),

    /// The runtime could not be instantiated
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;
