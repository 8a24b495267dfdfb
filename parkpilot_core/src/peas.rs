//! PEAS (Performance, Environment, Actuators, Sensors) teaching widget.
//!
//! Pure lookup tables keyed on the mission phase.

use crate::types::Phase;
use serde::Serialize;

/// The four parts of a PEAS agent description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeasComponent {
    Performance,
    Environment,
    Actuators,
    Sensors,
}

/// A named gauge inside a PEAS card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeasMetric {
    pub name: &'static str,
    /// Percent
    pub value: u8,
}

/// One rendered PEAS card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeasCard {
    pub component: PeasComponent,
    pub description: &'static str,
    pub active: bool,
    pub metrics: [PeasMetric; 3],
}

impl PeasComponent {
    pub fn all() -> [PeasComponent; 4] {
        [
            PeasComponent::Performance,
            PeasComponent::Environment,
            PeasComponent::Actuators,
            PeasComponent::Sensors,
        ]
    }
    
    pub fn title(&self) -> &'static str {
        match self {
            PeasComponent::Performance => "Performance",
            PeasComponent::Environment => "Environment",
            PeasComponent::Actuators => "Actuators",
            PeasComponent::Sensors => "Sensors",
        }
    }
    
    pub fn description(&self) -> &'static str {
        match self {
            PeasComponent::Performance => "Measure success metrics",
            PeasComponent::Environment => "Parking lot conditions",
            PeasComponent::Actuators => "Vehicle control systems",
            PeasComponent::Sensors => "Data collection systems",
        }
    }
    
    /// Whether the card is highlighted in `phase`.
    pub fn is_active(&self, phase: Phase) -> bool {
        match self {
            PeasComponent::Sensors => phase != Phase::Completed,
            PeasComponent::Environment => phase != Phase::Scanning,
            PeasComponent::Actuators => phase == Phase::Executing,
            PeasComponent::Performance => phase == Phase::Completed,
        }
    }
    
    /// Gauge values for `phase`.
    pub fn metrics(&self, phase: Phase) -> [PeasMetric; 3] {
        let when = |on: bool, value: u8| if on { value } else { 0 };
        let m = |name, value| PeasMetric { name, value };
        
        match self {
            PeasComponent::Performance => {
                let done = phase == Phase::Completed;
                [
                    m("Parking Accuracy", when(done, 95)),
                    m("Time Efficiency", when(done, 88)),
                    m("Safety Score", when(done, 98)),
                ]
            }
            PeasComponent::Environment => {
                let mapped = phase != Phase::Scanning;
                [
                    m("Space Detection", when(mapped, 92)),
                    m("Obstacle Mapping", when(mapped, 96)),
                    m("Weather Conditions", 85),
                ]
            }
            PeasComponent::Actuators => {
                let driving = phase == Phase::Executing;
                [
                    m("Steering Control", when(driving, 90)),
                    m("Speed Control", when(driving, 88)),
                    m("Brake System", when(driving, 100)),
                ]
            }
            PeasComponent::Sensors => {
                let sensing = phase != Phase::Completed;
                [
                    m("Camera Feed", when(sensing, 94)),
                    m("Ultrasonic Array", when(sensing, 91)),
                    m("Radar Coverage", when(sensing, 89)),
                ]
            }
        }
    }
    
    pub fn card(&self, phase: Phase) -> PeasCard {
        PeasCard {
            component: *self,
            description: self.description(),
            active: self.is_active(phase),
            metrics: self.metrics(phase),
        }
    }
}

/// All four cards for a phase.
pub fn peas_model(phase: Phase) -> Vec<PeasCard> {
    PeasComponent::all().iter().map(|c| c.card(phase)).collect()
}
