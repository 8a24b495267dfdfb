//! Simulation context implementing PilotContext for deterministic runs.

use async_trait::async_trait;
use parkpilot_env::{stream_seed, PilotContext};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Simulation context backed by a virtual clock and seeded RNG streams.
///
/// - A virtual clock that only moves when advanced (or slept on)
/// - ChaCha8 streams derived from one master seed
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,
    
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
        }
    }
    
    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }
    
    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap_or_else(|e| e.into_inner());
        *time += duration.as_nanos() as u64;
    }
    
    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time_ns: u64) {
        let mut time = self.virtual_time_ns.lock().unwrap_or_else(|e| e.into_inner());
        *time = time_ns;
    }
    
    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
        }
    }
}

#[async_trait]
impl PilotContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }
    
    async fn sleep(&self, duration: Duration) {
        // In simulation, sleep just advances the virtual clock
        self.advance_time(duration);
    }
    
    fn rng_stream(&self, stream: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(stream_seed(self.seed, stream))
    }
    
    fn seed(&self) -> u64 {
        self.seed
    }
}
