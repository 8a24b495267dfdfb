//! Domain types shared by the animator, the mission clock and the panels.

use crate::error::PilotError;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Start pose x coordinate (normalized plane, 0-100)
pub const ORIGIN_X: f64 = 20.0;

/// Start pose y coordinate (normalized plane, 0-100, y grows downward)
pub const ORIGIN_Y: f64 = 80.0;

/// Action label shown before the first tick of a session
pub const IDLE_ACTION: &str = "System ready";

/// Discrete motion mode copied verbatim from the active waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gear {
    Forward,
    Reverse,
    Park,
}

impl Gear {
    /// Returns the gear name.
    pub fn name(&self) -> &'static str {
        match self {
            Gear::Forward => "forward",
            Gear::Reverse => "reverse",
            Gear::Park => "park",
        }
    }
}

impl std::fmt::Display for Gear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parking scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Pull past the gap, reverse in, straighten up
    Parallel,
    
    /// Swing into a 90 degree bay
    Perpendicular,
    
    /// Drive into a 45 degree bay
    Angled,
}

impl Scenario {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<Scenario> {
        vec![Scenario::Parallel, Scenario::Perpendicular, Scenario::Angled]
    }
    
    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Parallel => "parallel",
            Scenario::Perpendicular => "perpendicular",
            Scenario::Angled => "angled",
        }
    }
    
    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Parallel => "Parallel parking between two kerbside cars, with a reverse leg",
            Scenario::Perpendicular => "Perpendicular parking into a bay at 90 degrees",
            Scenario::Angled => "Angled parking into a bay at 45 degrees",
        }
    }
    
    /// Lenient lookup used by the presentation layer.
    ///
    /// Unknown names fall back to `Parallel` instead of failing.
    pub fn from_name(name: &str) -> Scenario {
        name.parse().unwrap_or_else(|_| {
            warn!("Unknown scenario '{}', falling back to parallel", name);
            Scenario::Parallel
        })
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::Parallel
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Scenario {
    type Err = PilotError;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "parallel" => Ok(Scenario::Parallel),
            "perpendicular" => Ok(Scenario::Perpendicular),
            "angled" | "angle" => Ok(Scenario::Angled),
            _ => Err(PilotError::UnknownScenario(s.to_string())),
        }
    }
}

/// External simulation stage gating when the animator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Scanning,
    Planning,
    Executing,
    Completed,
}

impl Phase {
    /// Returns the phases in cycle order.
    pub fn all() -> [Phase; 4] {
        [Phase::Scanning, Phase::Planning, Phase::Executing, Phase::Completed]
    }
    
    /// Returns the phase name.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Scanning => "scanning",
            Phase::Planning => "planning",
            Phase::Executing => "executing",
            Phase::Completed => "completed",
        }
    }
    
    /// Returns the next phase; `Completed` wraps back to `Scanning`.
    pub fn next(&self) -> Phase {
        match self {
            Phase::Scanning => Phase::Planning,
            Phase::Planning => Phase::Executing,
            Phase::Executing => Phase::Completed,
            Phase::Completed => Phase::Scanning,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Scanning
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Phase {
    type Err = PilotError;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scanning" => Ok(Phase::Scanning),
            "planning" => Ok(Phase::Planning),
            "executing" => Ok(Phase::Executing),
            "completed" => Ok(Phase::Completed),
            _ => Err(PilotError::UnknownPhase(s.to_string())),
        }
    }
}

/// A fixed target pose plus motion intent in a scripted trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    /// Position in the normalized 0-100 plane
    pub position: Vector2<f64>,
    
    /// Heading in degrees, 0 = "up"
    pub heading: f64,
    
    /// Target speed on a unitless 0-1 scale
    pub speed: f64,
    
    pub gear: Gear,
    
    /// Display string for the decision overlay
    pub action: &'static str,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, heading: f64, speed: f64, gear: Gear, action: &'static str) -> Self {
        Self {
            position: Vector2::new(x, y),
            heading,
            speed,
            gear,
            action,
        }
    }
}

/// Live pose of the animated vehicle.
///
/// Written only by the animator tick; everyone else reads snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub position: Vector2<f64>,
    
    /// Heading in degrees, 0 = "up"
    pub heading: f64,
    
    /// Low-pass filtered speed (0-1)
    pub speed: f64,
    
    pub gear: Gear,
    
    /// Action label of the waypoint being approached
    pub action: String,
}

impl VehicleState {
    /// The fixed start pose every session resets to.
    pub fn origin() -> Self {
        Self {
            position: Vector2::new(ORIGIN_X, ORIGIN_Y),
            heading: 0.0,
            speed: 0.0,
            gear: Gear::Park,
            action: IDLE_ACTION.to_string(),
        }
    }
    
    /// Snaps the state onto a waypoint's pose.
    pub fn at_waypoint(waypoint: &Waypoint) -> Self {
        Self {
            position: waypoint.position,
            heading: waypoint.heading,
            speed: waypoint.speed,
            gear: waypoint.gear,
            action: waypoint.action.to_string(),
        }
    }
    
    pub fn is_reversing(&self) -> bool {
        self.gear == Gear::Reverse
    }
    
    /// Planar distance to a waypoint.
    pub fn distance_to(&self, waypoint: &Waypoint) -> f64 {
        (waypoint.position - self.position).norm()
    }
    
    /// Absolute heading gap to a waypoint in degrees.
    pub fn heading_gap_to(&self, waypoint: &Waypoint) -> f64 {
        (waypoint.heading - self.heading).abs()
    }
    
    /// True if the state sits exactly on the origin pose.
    pub fn is_origin(&self) -> bool {
        self.position == Vector2::new(ORIGIN_X, ORIGIN_Y)
            && self.heading == 0.0
            && self.speed == 0.0
            && self.gear == Gear::Park
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::origin()
    }
}
