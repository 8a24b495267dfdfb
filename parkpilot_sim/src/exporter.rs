//! JSON exporter for recorded sessions.
//!
//! Exports world frames as JSON for offline playback and plotting.

use crate::world::WorldFrame;
use nalgebra::Vector2;
use parkpilot_core::{
    Decision, Gear, Phase, PilotError, PilotResult, SensorCone, SensorReading, VehicleState,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Simulation time in seconds
    pub time_sec: f64,
    
    pub phase: Phase,
    
    /// Index of the last waypoint reached
    pub cursor: usize,
    
    /// Vehicle pose
    pub state: VehiclePose,
    
    pub action: String,
    pub is_reversing: bool,
    pub cones: [SensorCone; 4],
    
    /// Decisions released since the previous exported frame
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<Decision>,
    
    /// Panel readings, present only when they changed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensors: Vec<SensorReading>,
}

impl SimFrame {
    /// Builds an export frame from a world frame.
    pub fn from_world(frame: &WorldFrame) -> Self {
        Self {
            time_sec: frame.time_sec,
            phase: frame.phase,
            cursor: frame.animator.cursor,
            state: VehiclePose::from(&frame.animator.state),
            action: frame.animator.action.clone(),
            is_reversing: frame.animator.is_reversing,
            cones: frame.animator.cones,
            decisions: frame.decisions.clone(),
            sensors: if frame.transitions.is_empty() {
                Vec::new()
            } else {
                frame.sensors.clone()
            },
        }
    }
}

/// Flattened vehicle pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed: f64,
    pub gear: Gear,
}

impl VehiclePose {
    pub fn new(pos: Vector2<f64>, heading: f64, speed: f64, gear: Gear) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            heading,
            speed,
            gear,
        }
    }
}

impl From<&VehicleState> for VehiclePose {
    fn from(state: &VehicleState) -> Self {
        Self::new(state.position, state.heading, state.speed, state.gear)
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,
    
    /// Seed used
    pub seed: u64,
    
    /// Tick interval in milliseconds
    pub tick_ms: u64,
    
    /// Duration in seconds
    pub duration_sec: f64,
    
    /// All frames
    pub frames: Vec<SimFrame>,
    
    /// Whether the car reached its final pose
    pub parked: bool,
    
    /// Final distance to the last waypoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_error: Option<f64>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, tick_ms: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            tick_ms,
            duration_sec: 0.0,
            frames: Vec::new(),
            parked: false,
            final_error: None,
        }
    }
    
    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }
    
    /// Finalizes the export.
    pub fn finalize(&mut self, parked: bool, final_error: Option<f64>) {
        self.parked = parked;
        self.final_error = final_error;
    }
    
    /// Encodes the export as pretty-printed JSON.
    pub fn to_json(&self) -> PilotResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PilotError::export(e.to_string()))
    }
    
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
