//! ParkPilot Environment Abstraction Layer
//!
//! This crate lets the parking session run against either the wall clock
//! (interactive demo, **Production**) or a virtual clock (tests and headless
//! export, **Simulation**).
//!
//! # Core Concept
//!
//! The session loop never touches `tokio::time` or an OS RNG directly:
//! - Time (`now()`, `sleep()`)
//! - Randomness (`rng_stream()`)
//!
//! By deriving all entropy from a single 64-bit seed, any odd-looking run
//! becomes reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use parkpilot_env::PilotContext;
//!
//! async fn session_loop<Ctx: PilotContext>(ctx: &Ctx) {
//!     loop {
//!         ctx.sleep(Duration::from_millis(60)).await;
//!         tick();
//!     }
//! }
//! ```

mod context;
mod error;
mod tokio_impl;

pub use context::{stream_seed, PilotContext, STREAM_MIX};
pub use error::EnvError;
pub use tokio_impl::TokioContext;
