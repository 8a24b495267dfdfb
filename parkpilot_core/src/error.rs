//! Error types for ParkPilot core.
//!
//! The animator itself is total over its closed enums; these errors only
//! surface at the edges where free-form text is parsed (CLI flags, exported
//! files).

use thiserror::Error;

/// Errors raised while parsing or exporting ParkPilot data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PilotError {
    /// Scenario name did not match any scripted trajectory
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
    
    /// Phase name did not match any mission phase
    #[error("Unknown phase: {0}")]
    UnknownPhase(String),
    
    /// Snapshot could not be written or encoded
    #[error("Export error: {0}")]
    Export(String),
}

impl PilotError {
    /// Creates an export error.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

/// Result type alias for ParkPilot operations
pub type PilotResult<T> = Result<T, PilotError>;
