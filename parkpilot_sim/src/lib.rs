//! ParkPilot Simulation Harness
//!
//! Runs the parking demo headless. The same `ParkingWorld` can be paced by
//! a virtual clock for deterministic tests or by Tokio for real-time runs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ParkingWorld                          │
//! │  ┌──────────────┐   phase    ┌────────────────────────┐     │
//! │  │ MissionClock │──────────►│  TrajectoryAnimator    │     │
//! │  └──────┬───────┘            └────────────────────────┘     │
//! │         │ phase entered                                     │
//! │  ┌──────▼─────────┐   ┌─────────────┐                       │
//! │  │ DecisionEngine │   │ SensorPanel │   (seeded streams)    │
//! │  └────────────────┘   └─────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//!          ▲ tick(dt)
//!   ScenarioRunner (SimContext)  or  driver::drive (any PilotContext)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use parkpilot_sim::ScenarioRunner;
//! use parkpilot_core::Scenario;
//!
//! let result = ScenarioRunner::new(42).run(Scenario::Parallel);
//! assert!(result.passed);
//! ```

mod context;
mod exporter;
mod runner;
mod world;
pub mod driver;
pub mod scenarios;

pub use context::SimContext;
pub use exporter::{SimExport, SimFrame, VehiclePose};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{ParkingWorld, SimConfig, WorldFrame, DECISION_STREAM, SENSOR_STREAM};
