//! ParkPilot Core - Scripted Autonomous Parking Demo Engine
//!
//! This library produces everything the parking demo shows, as plain data:
//! 1. **Trajectory Animator**: eases a car pose through scripted waypoints
//! 2. **Mission Clock**: cycles scanning / planning / executing / completed
//! 3. **Panels**: seeded sensor readings, decision log, PEAS cards
//!
//! There is no perception, planning or control in here. All "AI" output is
//! scripted per phase or drawn from a seeded RNG.

pub mod animator;
pub mod decisions;
pub mod error;
pub mod mission;
pub mod peas;
pub mod sensors;
pub mod trajectory;
pub mod types;

// Re-export key types for convenience
pub use animator::{
    advance, Advance, AnimationSession, AnimatorFrame, AnimatorInputs, TickObservation,
    TrajectoryAnimator, NOMINAL_TICK,
};
pub use decisions::{AiMetrics, Decision, DecisionEngine, DecisionStatus, DecisionSummary};
pub use error::{PilotError, PilotResult};
pub use mission::{MissionClock, PhaseTransition};
pub use peas::{peas_model, PeasCard, PeasComponent};
pub use sensors::{sensor_cones, ConeKind, SensorCone, SensorPanel, SensorReading, SensorStatus};
pub use types::{Gear, Phase, Scenario, VehicleState, Waypoint};
