//! Error types for the ParkPilot environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Context operation failed (input channel closed, clock unavailable, etc.)
    #[error("Context error: {0}")]
    ContextError(String),
    
    /// Operation did not finish within its time budget
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl EnvError {
    /// Creates a context error.
    pub fn context(msg: impl Into<String>) -> Self {
        Self::ContextError(msg.into())
    }
    
    /// Creates a timeout error from a duration.
    pub fn timeout(after: std::time::Duration) -> Self {
        Self::Timeout(after.as_millis() as u64)
    }
}
