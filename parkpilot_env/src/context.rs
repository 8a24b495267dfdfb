//! Core environment context trait for ParkPilot sessions.

use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Mixing constant used to split one master seed into independent streams.
pub const STREAM_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// The central interface for Environment Interaction.
///
/// This trait abstracts the "real world" so that the parking session can run
/// against the wall clock (interactive demo) or a virtual clock (tests,
/// headless export).
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, seeded ChaCha8 streams
/// - **Simulation**: `SimContext` - virtual clock, `ChaCha8Rng(seed)`
///
/// # Determinism
///
/// Everything that would normally introduce non-determinism (time,
/// randomness) is owned by the implementation.
#[async_trait]
pub trait PilotContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;
    
    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock
    async fn sleep(&self, duration: Duration);
    
    /// Returns an RNG for one named stream of the session.
    ///
    /// Separate subsystems (sensor panel, decision metrics) each draw from
    /// their own stream so that adding draws in one never shifts the other.
    fn rng_stream(&self, stream: u64) -> ChaCha8Rng;
    
    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    fn seed(&self) -> u64;
}

/// Derives a stream seed from a master seed.
pub fn stream_seed(master: u64, stream: u64) -> u64 {
    master.wrapping_mul(STREAM_MIX) ^ stream.wrapping_add(1).wrapping_mul(0x517c_c1b7_2722_0a95)
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_stream_seed_separates_streams() {
        assert_ne!(stream_seed(42, 0), stream_seed(42, 1));
        assert_eq!(stream_seed(42, 3), stream_seed(42, 3));
    }
    
    #[test]
    fn test_stream_seed_separates_masters() {
        assert_ne!(stream_seed(1, 0), stream_seed(2, 0));
    }
}
