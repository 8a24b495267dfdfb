//! Wall-clock context for interactive runs.

use crate::context::stream_seed;
use crate::PilotContext;
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Paces the session with Tokio timers.
///
/// Only the clock is real. Panel randomness still comes from ChaCha8 streams
/// derived from `seed`, so a real-time run samples the same panels as a
/// virtual-clock run with the same seed.
pub struct TokioContext {
    started_at: Instant,
    seed: u64,
}

impl TokioContext {
    pub fn new(seed: u64) -> Self {
        Self {
            started_at: Instant::now(),
            seed,
        }
    }

    /// Seeded context behind an `Arc`, ready to hand to a world.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Picks a fresh master seed from OS entropy.
    ///
    /// The seed is still reported by `seed()`, so the run can be replayed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }
}

#[async_trait]
impl PilotContext for TokioContext {
    fn now(&self) -> Duration {
        self.started_at.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn rng_stream(&self, stream: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(stream_seed(self.seed, stream))
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[tokio::test]
    async fn test_sleep_moves_wall_clock() {
        let ctx = TokioContext::new(1);
        let before = ctx.now();
        ctx.sleep(Duration::from_millis(15)).await;

        assert!(ctx.now() - before >= Duration::from_millis(15));
    }

    #[test]
    fn test_streams_follow_seed() {
        let a = TokioContext::new(42);
        let b = TokioContext::new(42);

        let draw = |ctx: &TokioContext, stream| -> Vec<u32> {
            let mut rng = ctx.rng_stream(stream);
            (0..4).map(|_| rng.gen_range(0..1000)).collect()
        };

        assert_eq!(draw(&a, 1), draw(&b, 1));
        assert_ne!(draw(&a, 1), draw(&a, 2));
        assert_ne!(draw(&a, 1), draw(&TokioContext::new(43), 1));
    }

    #[test]
    fn test_entropy_seed_is_reported() {
        let ctx = TokioContext::from_entropy();
        let replay = TokioContext::new(ctx.seed());

        assert_eq!(ctx.rng_stream(3).gen::<u64>(), replay.rng_stream(3).gen::<u64>());
    }
}
