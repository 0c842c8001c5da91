//! Staffing solver: turns call volume and targets into a headcount.
//!
//! Two entry points:
//!   - `evaluate_fixed_agents`: every metric for a given agent count.
//!   - `minimize_agents`: smallest agent count meeting the target service
//!     level, then raised for the occupancy ceiling, then inflated for
//!     shrinkage.
//!
//! `calc_staffing` picks between them based on `StaffingRequest::agents`.
//!
//! A target is met when `service_level >= target_service_level` (inclusive).

use crate::{
    erlang,
    error::{ErlangError, ErlangResult},
    types::{AgentCount, Erlangs, Probability, TimeUnit},
};
use serde::{Deserialize, Serialize};

/// Highest power of two the bracketing search will try.
const MAX_SEARCH_EXPONENT: u32 = 63;

/// Largest agent count the search will consider before giving up.
pub const MAX_SEARCH_AGENTS: AgentCount = 1 << MAX_SEARCH_EXPONENT;

/// Inputs for one staffing calculation.
///
/// `aht` and `target_answer_time` share `aht_unit`; `calls_per_hour` is
/// always per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingRequest {
    pub calls_per_hour: f64,
    pub aht: f64,
    #[serde(default)]
    pub aht_unit: TimeUnit,
    /// Fixed headcount. When set, no search is performed.
    #[serde(default)]
    pub agents: Option<AgentCount>,
    #[serde(default)]
    pub max_occupancy: Option<Probability>,
    pub target_answer_time: f64,
    pub target_service_level: Probability,
    #[serde(default)]
    pub shrinkage: Option<f64>,
}

impl StaffingRequest {
    pub fn new(
        calls_per_hour: f64,
        aht: f64,
        target_answer_time: f64,
        target_service_level: Probability,
    ) -> Self {
        Self {
            calls_per_hour,
            aht,
            aht_unit: TimeUnit::Seconds,
            agents: None,
            max_occupancy: None,
            target_answer_time,
            target_service_level,
            shrinkage: None,
        }
    }

    pub fn with_aht_unit(mut self, unit: TimeUnit) -> Self {
        self.aht_unit = unit;
        self
    }

    pub fn with_agents(mut self, agents: AgentCount) -> Self {
        self.agents = Some(agents);
        self
    }

    pub fn with_max_occupancy(mut self, max_occupancy: Probability) -> Self {
        self.max_occupancy = Some(max_occupancy);
        self
    }

    pub fn with_shrinkage(mut self, shrinkage: f64) -> Self {
        self.shrinkage = Some(shrinkage);
        self
    }

    /// Reject malformed inputs before any computation runs.
    ///
    /// A target service level of exactly 1.0 passes validation; the search
    /// reports it as `NoSolution`.
    pub fn validate(&self) -> ErlangResult<()> {
        self.validate_scenario()?;
        if self.agents == Some(0) {
            return Err(ErlangError::invalid("agents", "must be a positive integer"));
        }
        Ok(())
    }

    /// Every rule except the fixed headcount.
    fn validate_scenario(&self) -> ErlangResult<()> {
        if !self.calls_per_hour.is_finite() || self.calls_per_hour < 0.0 {
            return Err(ErlangError::invalid(
                "calls_per_hour",
                format!("must be >= 0, got {}", self.calls_per_hour),
            ));
        }
        if !self.aht.is_finite() || self.aht <= 0.0 {
            return Err(ErlangError::invalid("aht", format!("must be > 0, got {}", self.aht)));
        }
        if !self.target_answer_time.is_finite() || self.target_answer_time < 0.0 {
            return Err(ErlangError::invalid(
                "target_answer_time",
                format!("must be >= 0, got {}", self.target_answer_time),
            ));
        }
        let sl = self.target_service_level;
        if !sl.is_finite() || sl <= 0.0 || sl > 1.0 {
            return Err(ErlangError::invalid(
                "target_service_level",
                format!("must be in (0, 1], got {sl}"),
            ));
        }
        if let Some(occ) = self.max_occupancy {
            if !occ.is_finite() || occ <= 0.0 || occ > 1.0 {
                return Err(ErlangError::invalid(
                    "max_occupancy",
                    format!("must be in (0, 1], got {occ}"),
                ));
            }
        }
        if let Some(shrinkage) = self.shrinkage {
            if !shrinkage.is_finite() || !(0.0..1.0).contains(&shrinkage) {
                return Err(ErlangError::invalid(
                    "shrinkage",
                    format!("must be in [0, 1), got {shrinkage}"),
                ));
            }
        }
        Ok(())
    }

    pub fn traffic_intensity(&self) -> ErlangResult<Erlangs> {
        erlang::traffic_intensity(self.calls_per_hour, self.aht, self.aht_unit)
    }
}

/// Every metric for one resolved agent count.
///
/// `average_speed_of_answer` is in the request's `aht_unit`.
/// `agents` is authoritative; `agents_with_shrinkage` is the paid headcount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaffingResult {
    pub traffic_intensity:       Erlangs,
    pub wait_probability:        Probability,
    pub immediate_answer:        Probability,
    pub service_level:           Probability,
    pub average_speed_of_answer: f64,
    pub occupancy:               Probability,
    pub agents:                  AgentCount,
    pub agents_with_shrinkage:   AgentCount,
}

/// Validate, then evaluate `request.agents` if given, otherwise search.
pub fn calc_staffing(request: &StaffingRequest) -> ErlangResult<StaffingResult> {
    match request.agents {
        Some(agents) => evaluate_fixed_agents(request, agents),
        None => minimize_agents(request),
    }
}

/// Metrics at exactly `agents`. No occupancy adjustment is applied.
///
/// The `agents` argument wins: `request.agents` is neither read nor
/// validated here.
///
/// Fails with `Unstable` when `agents` cannot keep up with the traffic,
/// since average speed of answer is undefined there.
pub fn evaluate_fixed_agents(
    request: &StaffingRequest,
    agents: AgentCount,
) -> ErlangResult<StaffingResult> {
    request.validate_scenario()?;
    if agents == 0 {
        return Err(ErlangError::invalid("agents", "must be a positive integer"));
    }
    let traffic = request.traffic_intensity()?;
    let result = evaluate_at(request, traffic, agents)?;
    log::debug!(
        "fixed agents={agents} traffic={traffic:.3} sl={:.4} occ={:.4}",
        result.service_level,
        result.occupancy
    );
    Ok(result)
}

/// Smallest headcount meeting the target service level, adjusted for the
/// occupancy ceiling and shrinkage when configured.
///
/// Zero call volume needs zero agents and scores a perfect service level.
pub fn minimize_agents(request: &StaffingRequest) -> ErlangResult<StaffingResult> {
    request.validate()?;
    let target = request.target_service_level;
    if target >= 1.0 {
        return Err(ErlangError::NoSolution {
            target_service_level: target,
            max_agents: MAX_SEARCH_AGENTS,
        });
    }

    let traffic = request.traffic_intensity()?;
    if traffic == 0.0 {
        log::debug!("zero traffic, no agents required");
        return evaluate_at(request, traffic, 0);
    }

    let goal = ServiceGoal {
        traffic,
        aht: request.aht,
        target_answer_time: request.target_answer_time,
        target,
    };
    let bracket = goal.bracket()?;
    let mut agents = goal.resolve(bracket);
    log::debug!(
        "traffic={traffic:.3} bracket=({}, {}] resolved agents={agents}",
        bracket.low,
        bracket.high
    );

    if let Some(max_occupancy) = request.max_occupancy {
        let (raised, occ) = erlang::optimise_occupancy(traffic, agents, max_occupancy)?;
        if raised > agents {
            log::info!(
                "occupancy ceiling {max_occupancy} raised agents {agents} -> {raised} (occ={occ:.4})"
            );
        }
        agents = raised;
    }

    evaluate_at(request, traffic, agents)
}

/// Straight-line composition of the engine at one agent count.
fn evaluate_at(
    request: &StaffingRequest,
    traffic: Erlangs,
    agents: AgentCount,
) -> ErlangResult<StaffingResult> {
    let agents_with_shrinkage = match request.shrinkage {
        Some(shrinkage) => erlang::apply_shrinkage(agents, shrinkage)?,
        None => agents,
    };

    if agents == 0 {
        // Only reachable with zero traffic: nobody calls, nobody waits.
        return Ok(StaffingResult {
            traffic_intensity: traffic,
            wait_probability: 0.0,
            immediate_answer: 1.0,
            service_level: 1.0,
            average_speed_of_answer: 0.0,
            occupancy: 0.0,
            agents,
            agents_with_shrinkage,
        });
    }

    let wait = erlang::wait_probability(traffic, agents);
    let service_level = erlang::service_level(
        traffic,
        agents,
        wait,
        request.target_answer_time,
        request.aht,
    );
    let asa = erlang::average_speed_of_answer(traffic, agents, wait, request.aht)?;

    Ok(StaffingResult {
        traffic_intensity: traffic,
        wait_probability: wait,
        immediate_answer: erlang::immediate_answer(wait),
        service_level,
        average_speed_of_answer: asa,
        occupancy: erlang::occupancy(traffic, agents),
        agents,
        agents_with_shrinkage,
    })
}

/// Half-open agent range `(low, high]`: `low` misses the target (or is 0),
/// `high` meets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AgentBracket {
    low:  AgentCount,
    high: AgentCount,
}

/// The service-level question the search keeps asking.
struct ServiceGoal {
    traffic:            Erlangs,
    aht:                f64,
    target_answer_time: f64,
    target:             Probability,
}

impl ServiceGoal {
    fn service_level(&self, agents: AgentCount) -> Probability {
        let wait = erlang::wait_probability(self.traffic, agents);
        erlang::service_level(self.traffic, agents, wait, self.target_answer_time, self.aht)
    }

    fn is_met(&self, agents: AgentCount) -> bool {
        let sl = self.service_level(agents);
        log::trace!("candidate agents={agents} sl={sl:.6}");
        sl >= self.target
    }

    /// Double from `2^floor(log2(traffic))` until the target is met.
    fn bracket(&self) -> ErlangResult<AgentBracket> {
        let start = if self.traffic >= 1.0 {
            self.traffic.log2().floor() as u32
        } else {
            0
        };

        for exponent in start..=MAX_SEARCH_EXPONENT {
            let agents: AgentCount = 1 << exponent;
            if self.is_met(agents) {
                let low = if exponent == start { 0 } else { agents >> 1 };
                return Ok(AgentBracket { low, high: agents });
            }
        }

        Err(ErlangError::NoSolution {
            target_service_level: self.target,
            max_agents: MAX_SEARCH_AGENTS,
        })
    }

    /// Binary search inside the bracket. Relies on service level being
    /// non-decreasing in agents.
    fn resolve(&self, bracket: AgentBracket) -> AgentCount {
        let AgentBracket { mut low, mut high } = bracket;
        while high - low > 1 {
            let mid = low + (high - low) / 2;
            if self.is_met(mid) {
                high = mid;
            } else {
                low = mid;
            }
        }
        high
    }
}
