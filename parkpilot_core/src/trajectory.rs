//! Scripted waypoint tables for each parking scenario.
//!
//! Every table starts at the origin pose and ends on a parked waypoint
//! (speed 0, gear park). The animator treats index 0 as "already reached",
//! so the first leg targets index 1.

use crate::types::{Gear, Scenario, Waypoint};

impl Scenario {
    /// Returns the scripted waypoint sequence for this scenario.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        match self {
            Scenario::Parallel => parallel(),
            Scenario::Perpendicular => perpendicular(),
            Scenario::Angled => angled(),
        }
    }
    
    /// Final parked pose of the scenario.
    pub fn final_waypoint(&self) -> Option<Waypoint> {
        self.waypoints().pop()
    }
}

fn parallel() -> Vec<Waypoint> {
    vec![
        Waypoint::new(20.0, 80.0, 0.0, 0.0, Gear::Forward, "Starting maneuver"),
        Waypoint::new(30.0, 60.0, 0.0, 0.6, Gear::Forward, "Pulling alongside space"),
        Waypoint::new(62.0, 36.0, 0.0, 0.4, Gear::Forward, "Aligning with lead vehicle"),
        Waypoint::new(56.0, 38.0, -30.0, 0.3, Gear::Reverse, "Reversing into space"),
        Waypoint::new(49.0, 41.0, -10.0, 0.2, Gear::Reverse, "Counter-steering"),
        Waypoint::new(50.0, 40.0, 0.0, 0.0, Gear::Park, "Parked"),
    ]
}

fn perpendicular() -> Vec<Waypoint> {
    vec![
        Waypoint::new(20.0, 80.0, 0.0, 0.0, Gear::Forward, "Starting maneuver"),
        Waypoint::new(35.0, 65.0, 0.0, 0.5, Gear::Forward, "Approaching target bay"),
        Waypoint::new(55.0, 55.0, 60.0, 0.35, Gear::Forward, "Turning into bay"),
        Waypoint::new(70.0, 50.0, 90.0, 0.0, Gear::Park, "Parked"),
    ]
}

fn angled() -> Vec<Waypoint> {
    vec![
        Waypoint::new(20.0, 80.0, 0.0, 0.0, Gear::Forward, "Starting maneuver"),
        Waypoint::new(40.0, 65.0, 20.0, 0.5, Gear::Forward, "Approaching angled bay"),
        Waypoint::new(58.0, 52.0, 40.0, 0.3, Gear::Forward, "Entering bay"),
        Waypoint::new(65.0, 45.0, 45.0, 0.0, Gear::Park, "Parked"),
    ]
}
