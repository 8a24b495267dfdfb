//! Scenario selection for the CLI and the runner.

use parkpilot_core::{PilotError, Scenario};

/// Which scenarios a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioSelection {
    All,
    One(Scenario),
}

impl ScenarioSelection {
    /// Expands the selection into the scenarios to run, in order.
    pub fn scenarios(&self) -> Vec<Scenario> {
        match self {
            ScenarioSelection::All => Scenario::all(),
            ScenarioSelection::One(scenario) => vec![*scenario],
        }
    }
    
    pub fn is_single(&self) -> bool {
        matches!(self, ScenarioSelection::One(_))
    }
}

impl std::fmt::Display for ScenarioSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioSelection::All => write!(f, "all"),
            ScenarioSelection::One(scenario) => write!(f, "{}", scenario),
        }
    }
}

impl std::str::FromStr for ScenarioSelection {
    type Err = PilotError;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(ScenarioSelection::All);
        }
        s.parse().map(ScenarioSelection::One)
    }
}
