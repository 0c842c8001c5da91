//! Scenario configuration: named staffing requests loaded from JSON.
//!
//! File shape:
//! ```json
//! { "scenarios": [ { "name": "weekday_peak", "request": { ... } } ] }
//! ```

use crate::{
    error::{ErlangError, ErlangResult},
    staffing::{calc_staffing, StaffingRequest, StaffingResult},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub request: StaffingRequest,
}

#[derive(Debug, Clone, Deserialize)]
struct ScenarioFile {
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioConfig {
    /// Load and validate a scenario file.
    /// In tests, use ScenarioConfig::default_test().
    pub fn load(path: impl AsRef<Path>) -> ErlangResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ErlangError::Config(format!("Cannot read {}: {e}", path.display())))?;
        let config = Self::from_json(&content)?;
        log::debug!("loaded {} scenarios from {}", config.scenarios.len(), path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> ErlangResult<Self> {
        let file: ScenarioFile = serde_json::from_str(json)?;
        Self::from_scenarios(file.scenarios)
    }

    /// Every scenario must carry a unique, non-empty name and a valid request.
    pub fn from_scenarios(scenarios: Vec<Scenario>) -> ErlangResult<Self> {
        let mut seen = HashSet::new();
        for scenario in &scenarios {
            if scenario.name.trim().is_empty() {
                return Err(ErlangError::Config("scenario with empty name".into()));
            }
            if !seen.insert(scenario.name.as_str()) {
                return Err(ErlangError::Config(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
            scenario
                .request
                .validate()
                .map_err(|e| ErlangError::Config(format!("scenario '{}': {e}", scenario.name)))?;
        }
        Ok(Self { scenarios })
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Solve every scenario independently, in file order.
    /// One failing scenario does not stop the others.
    pub fn solve_all(&self) -> Vec<(&str, ErlangResult<StaffingResult>)> {
        self.scenarios
            .iter()
            .map(|s| (s.name.as_str(), calc_staffing(&s.request)))
            .collect()
    }

    /// Reference scenarios with hardcoded values for use in tests.
    pub fn default_test() -> Self {
        let searched = StaffingRequest::new(1000.0, 120.0, 20.0, 0.8)
            .with_max_occupancy(0.85)
            .with_shrinkage(0.3);
        let fixed = searched.clone().with_agents(35);

        Self {
            scenarios: vec![
                Scenario { name: "reference_search".into(), request: searched },
                Scenario { name: "reference_fixed".into(),  request: fixed },
            ],
        }
    }
}
