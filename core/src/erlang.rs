//! Erlang formula primitives.
//!
//! Every function here is a pure function of its scalar inputs.
//! Inputs are assumed validated by the caller (see `StaffingRequest::validate`)
//! except where a function returns `ErlangResult`.
//!
//! SATURATION RULES (the solver's search depends on these):
//!   - agents <= traffic intensity  => wait probability is exactly 1.0
//!   - agents <= traffic intensity  => service level is exactly 0.0
//!   - agents <= traffic intensity  => average speed of answer is an error
//!
//! With those clamps, wait probability is non-increasing and service level
//! is non-decreasing as the agent count grows.

use crate::{
    error::{ErlangError, ErlangResult},
    types::{AgentCount, Erlangs, Probability, TimeUnit},
};

/// Offered load in Erlangs: calls per hour times handling time in hours.
pub fn traffic_intensity(
    calls_per_period: f64,
    avg_handling_time: f64,
    handling_time_unit: TimeUnit,
) -> ErlangResult<Erlangs> {
    if !calls_per_period.is_finite() || calls_per_period < 0.0 {
        return Err(ErlangError::invalid(
            "calls_per_period",
            format!("must be a non-negative number, got {calls_per_period}"),
        ));
    }
    if !avg_handling_time.is_finite() || avg_handling_time < 0.0 {
        return Err(ErlangError::invalid(
            "avg_handling_time",
            format!("must be a non-negative number, got {avg_handling_time}"),
        ));
    }
    Ok(calls_per_period * (avg_handling_time / handling_time_unit.divisor()))
}

/// Erlang C: probability that an arriving call has to wait.
///
/// Evaluated through the running product
/// `term_i = term_{i-1} * (agents - i) / traffic` instead of factorials and
/// powers, so large agent counts never overflow into NaN. Once the terms are
/// shrinking and can no longer move the sum, the loop stops early; the
/// result is identical to running it to the end.
pub fn wait_probability(traffic_intensity: Erlangs, agents: AgentCount) -> Probability {
    let n = agents as f64;
    if n <= traffic_intensity {
        return 1.0;
    }
    if traffic_intensity <= 0.0 {
        return 0.0;
    }

    let mut term = 1.0_f64;
    let mut sum = 0.0_f64;
    for i in 0..agents {
        let remaining = n - i as f64;
        term *= remaining / traffic_intensity;
        sum += term;

        if term.is_infinite() {
            break;
        }
        // Past the peak every further term is below half an ulp of `sum`.
        if remaining <= traffic_intensity && term < sum * f64::EPSILON / 4.0 {
            break;
        }
    }

    let result = 1.0 / (sum * (n - traffic_intensity) / n + 1.0);
    result.min(1.0)
}

/// Erlang B: probability that a call is blocked when there is no queue.
pub fn blocking_probability(traffic_intensity: Erlangs, agents: AgentCount) -> Probability {
    let mut blocking = 1.0_f64;
    for n in 1..=agents {
        let offered = traffic_intensity * blocking;
        blocking = offered / (n as f64 + offered);
        if blocking == 0.0 {
            break;
        }
    }
    blocking.clamp(0.0, 1.0)
}

/// Probability a call is answered without queueing.
pub fn immediate_answer(wait_probability: Probability) -> Probability {
    1.0 - wait_probability
}

/// Fraction of calls answered within `target_answer_time`.
///
/// `target_answer_time` and `avg_handling_time` must share a unit.
/// Understaffed queues (agents <= traffic) have no attainable service level.
pub fn service_level(
    traffic_intensity: Erlangs,
    agents: AgentCount,
    wait_probability: Probability,
    target_answer_time: f64,
    avg_handling_time: f64,
) -> Probability {
    let n = agents as f64;
    if n <= traffic_intensity {
        return 0.0;
    }
    let exponent = -((n - traffic_intensity) * target_answer_time / avg_handling_time).abs();
    (1.0 - (wait_probability * exponent.exp()).abs()).clamp(0.0, 1.0)
}

/// Share of agent time spent on calls, capped at 100%.
pub fn occupancy(traffic_intensity: Erlangs, agents: AgentCount) -> Probability {
    if agents == 0 {
        return if traffic_intensity > 0.0 { 1.0 } else { 0.0 };
    }
    (traffic_intensity / agents as f64).min(1.0)
}

/// Mean wait of a queued call, in the unit of `avg_handling_time`.
pub fn average_speed_of_answer(
    traffic_intensity: Erlangs,
    agents: AgentCount,
    wait_probability: Probability,
    avg_handling_time: f64,
) -> ErlangResult<f64> {
    let n = agents as f64;
    if n <= traffic_intensity {
        return Err(ErlangError::Unstable { traffic_intensity, agents });
    }
    Ok((wait_probability * avg_handling_time) / (n - traffic_intensity))
}

/// Smallest agent count whose occupancy does not exceed `occupancy_target`.
pub fn occupancy_floor_agents(
    traffic_intensity: Erlangs,
    occupancy_target: Probability,
) -> ErlangResult<AgentCount> {
    check_occupancy_target(occupancy_target)?;
    Ok((traffic_intensity.max(0.0) / occupancy_target).ceil() as AgentCount)
}

/// Raise `agents` until occupancy is at or below `max_occupancy`.
/// Never lowers the count. Returns the agent count and its occupancy.
pub fn optimise_occupancy(
    traffic_intensity: Erlangs,
    agents: AgentCount,
    max_occupancy: Probability,
) -> ErlangResult<(AgentCount, Probability)> {
    check_occupancy_target(max_occupancy)?;
    let current = occupancy(traffic_intensity, agents);
    if current <= max_occupancy {
        return Ok((agents, current));
    }
    let raised = occupancy_floor_agents(traffic_intensity, max_occupancy)?.max(agents);
    Ok((raised, occupancy(traffic_intensity, raised)))
}

/// Inflate a productive headcount to cover shrinkage (breaks, training, ...).
pub fn apply_shrinkage(agents: AgentCount, shrinkage_fraction: f64) -> ErlangResult<AgentCount> {
    if !shrinkage_fraction.is_finite() || !(0.0..1.0).contains(&shrinkage_fraction) {
        return Err(ErlangError::invalid(
            "shrinkage",
            format!("must be in [0, 1), got {shrinkage_fraction}"),
        ));
    }
    Ok((agents as f64 / (1.0 - shrinkage_fraction)).ceil() as AgentCount)
}

fn check_occupancy_target(target: Probability) -> ErlangResult<()> {
    if !target.is_finite() || target <= 0.0 || target > 1.0 {
        return Err(ErlangError::invalid(
            "max_occupancy",
            format!("must be in (0, 1], got {target}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_to(value: f64, places: i32) -> f64 {
        let scale = 10f64.powi(places);
        (value * scale).round() / scale
    }

    #[test]
    fn early_exit_matches_full_recurrence() {
        // Full loop with no early exit, for comparison.
        fn full(traffic: f64, agents: u64) -> f64 {
            let n = agents as f64;
            let mut term = 1.0_f64;
            let mut sum = 0.0_f64;
            for i in 0..agents {
                term *= (n - i as f64) / traffic;
                sum += term;
            }
            (1.0 / (sum * (n - traffic) / n + 1.0)).min(1.0)
        }

        for &(traffic, agents) in &[(123.0, 132), (33.3, 40), (2.5, 9), (0.4, 3), (500.0, 560)] {
            assert_eq!(
                wait_probability(traffic, agents).to_bits(),
                full(traffic, agents).to_bits(),
                "early exit changed the result for traffic={traffic} agents={agents}"
            );
        }
    }

    #[test]
    fn huge_agent_counts_do_not_produce_nan() {
        let w = wait_probability(10.0, 1 << 40);
        assert!(!w.is_nan());
        assert_eq!(w, 0.0);
    }

    #[test]
    fn erlang_b_and_c_are_consistent() {
        // C = N·B / (N − A·(1 − B))
        for &(traffic, agents) in &[(123.0, 132u64), (10.0, 14), (50.5, 60)] {
            let b = blocking_probability(traffic, agents);
            let n = agents as f64;
            let from_b = n * b / (n - traffic * (1.0 - b));
            let c = wait_probability(traffic, agents);
            assert!((c - from_b).abs() < 1e-9, "C={c} vs via B={from_b}");
        }
    }

    #[test]
    fn occupancy_with_no_agents() {
        assert_eq!(occupancy(0.0, 0), 0.0);
        assert_eq!(occupancy(4.0, 0), 1.0);
    }

    #[test]
    fn asa_reference_value() {
        let asa = average_speed_of_answer(123.0, 130, 0.4244, 300.0).unwrap();
        assert_eq!(round_to(asa, 2), 18.19);
    }
}
