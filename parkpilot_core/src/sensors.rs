//! Sensor display model.
//!
//! Two unrelated things share this module because the demo shows them side
//! by side:
//! - **Sensor cones**: circles drawn around the car, placed from its heading
//! - **Sensor panel**: four fake range readings drawn from the session RNG
//!
//! Neither is a sensor model. Nothing here measures anything.

use crate::types::{Phase, VehicleState};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

// =============================================================================
// SENSOR CONES
// =============================================================================

/// Distance from the vehicle center to each cone center
pub const CONE_OFFSET: f64 = 15.0;

/// Radius of the cone facing the direction of travel
pub const CONE_RADIUS_WIDE: f64 = 25.0;

/// Radius of the cone facing away from the direction of travel
pub const CONE_RADIUS_NARROW: f64 = 20.0;

/// Radius of both side cones
pub const CONE_RADIUS_SIDE: f64 = 18.0;

/// Which side of the vehicle a cone covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConeKind {
    Front,
    Rear,
    Left,
    Right,
}

/// A display-only circular region around the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorCone {
    pub kind: ConeKind,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub active: bool,
}

/// Computes the four cones for a vehicle pose.
///
/// Headings follow the screen convention (0 = up, clockwise positive, y
/// down), so the front offset runs along `heading - 90` and the rear along
/// `heading + 90`.
pub fn sensor_cones(state: &VehicleState) -> [SensorCone; 4] {
    let reversing = state.is_reversing();
    let (x, y) = (state.position.x, state.position.y);
    
    let along = |deg: f64| {
        let rad = deg.to_radians();
        (rad.cos(), rad.sin())
    };
    let (fx, fy) = along(state.heading - 90.0);
    let (rx, ry) = along(state.heading + 90.0);
    let (sx, sy) = along(state.heading);
    
    let (front_radius, rear_radius) = if reversing {
        (CONE_RADIUS_NARROW, CONE_RADIUS_WIDE)
    } else {
        (CONE_RADIUS_WIDE, CONE_RADIUS_NARROW)
    };
    
    [
        SensorCone {
            kind: ConeKind::Front,
            x: x + fx * CONE_OFFSET,
            y: y + fy * CONE_OFFSET,
            radius: front_radius,
            active: !reversing,
        },
        SensorCone {
            kind: ConeKind::Rear,
            x: x + rx * CONE_OFFSET,
            y: y + ry * CONE_OFFSET,
            radius: rear_radius,
            active: reversing,
        },
        SensorCone {
            kind: ConeKind::Left,
            x: x - sx * CONE_OFFSET,
            y: y - sy * CONE_OFFSET,
            radius: CONE_RADIUS_SIDE,
            active: true,
        },
        SensorCone {
            kind: ConeKind::Right,
            x: x + sx * CONE_OFFSET,
            y: y + sy * CONE_OFFSET,
            radius: CONE_RADIUS_SIDE,
            active: true,
        },
    ]
}

// =============================================================================
// SENSOR PANEL
// =============================================================================

/// Status badge of a simulated sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Active,
    Warning,
    Monitoring,
    Inactive,
}

/// Static description of one simulated sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSpec {
    pub name: &'static str,
    /// Full-scale range shown on the gauge (cm)
    pub range_cm: u32,
    /// Reading bounds while active, `[min, max)` (cm)
    pub min_cm: u32,
    pub max_cm: u32,
}

/// The four sensors on the panel, in display order.
pub const SENSOR_SUITE: [SensorSpec; 4] = [
    SensorSpec { name: "Front Ultrasonic", range_cm: 250, min_cm: 50, max_cm: 250 },
    SensorSpec { name: "Rear Camera", range_cm: 200, min_cm: 30, max_cm: 180 },
    SensorSpec { name: "Side Radar", range_cm: 300, min_cm: 40, max_cm: 220 },
    SensorSpec { name: "Surround View", range_cm: 150, min_cm: 20, max_cm: 120 },
];

impl SensorSpec {
    /// Status badge for this sensor in the given phase.
    pub fn status(&self, active: bool, phase: Phase) -> SensorStatus {
        if !active {
            return SensorStatus::Inactive;
        }
        match (self.name, phase) {
            ("Front Ultrasonic", Phase::Executing) => SensorStatus::Warning,
            ("Side Radar", Phase::Scanning) => SensorStatus::Active,
            ("Side Radar", _) => SensorStatus::Monitoring,
            _ => SensorStatus::Active,
        }
    }
}

/// One sampled row of the sensor panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub name: String,
    pub distance_cm: u32,
    pub range_cm: u32,
    pub status: SensorStatus,
}

impl SensorReading {
    /// Gauge fill in percent of full-scale range.
    pub fn percent(&self) -> f64 {
        if self.range_cm == 0 {
            return 0.0;
        }
        self.distance_cm as f64 / self.range_cm as f64 * 100.0
    }
}

/// Counts shown under the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSummary {
    pub active: usize,
    pub warning: usize,
}

/// Draws panel readings from a seeded stream.
pub struct SensorPanel {
    rng: ChaCha8Rng,
}

impl SensorPanel {
    /// Creates a panel drawing from the given RNG stream.
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
    
    /// Samples one reading per sensor.
    ///
    /// Inactive sensors read 0 and consume no randomness.
    pub fn sample(&mut self, active: bool, phase: Phase) -> Vec<SensorReading> {
        SENSOR_SUITE
            .iter()
            .map(|spec| {
                let distance_cm = if active {
                    Uniform::new(spec.min_cm, spec.max_cm).sample(&mut self.rng)
                } else {
                    0
                };
                SensorReading {
                    name: spec.name.to_string(),
                    distance_cm,
                    range_cm: spec.range_cm,
                    status: spec.status(active, phase),
                }
            })
            .collect()
    }
}

/// Counts active and warning sensors.
pub fn summarize(readings: &[SensorReading]) -> SensorSummary {
    SensorSummary {
        active: readings.iter().filter(|r| r.status == SensorStatus::Active).count(),
        warning: readings.iter().filter(|r| r.status == SensorStatus::Warning).count(),
    }
}
