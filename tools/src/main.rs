//! staffing-runner: command-line driver for the staffing calculator.
//!
//! Usage:
//!   staffing-runner --calls 1000 --aht 120 --target-service-level 0.8
//!   staffing-runner --agents 35 --json
//!   staffing-runner --scenarios scenarios.json
//!   staffing-runner --stdin-mode

use anyhow::{Context, Result};
use serde::Serialize;
use staffing_core::{
    calc_staffing, config::ScenarioConfig, StaffingRequest, StaffingResult, TimeUnit,
};
use std::env;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Staff(StaffingRequest),
    Quit,
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: String,
    scenario: &'a str,
    inputs: &'a StaffingRequest,
    result: StaffingResult,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let json = has_flag(&args, "--json");

    if has_flag(&args, "--stdin-mode") {
        return run_stdin_loop();
    }

    if let Some(path) = flag_value(&args, "--scenarios") {
        let config = ScenarioConfig::load(path)
            .with_context(|| format!("loading scenarios from {path}"))?;
        for (scenario, (name, outcome)) in config.scenarios.iter().zip(config.solve_all()) {
            match outcome {
                Ok(result) => emit(name, &scenario.request, &result, json)?,
                Err(e) => log::error!("scenario '{name}' failed: {e}"),
            }
        }
        return Ok(());
    }

    let request = request_from_args(&args)?;
    let result = calc_staffing(&request)?;
    emit("command_line", &request, &result, json)
}

fn request_from_args(args: &[String]) -> Result<StaffingRequest> {
    let aht_unit: TimeUnit = match flag_value(args, "--aht-unit") {
        Some(raw) => raw.parse::<TimeUnit>().map_err(anyhow::Error::msg)?,
        None => TimeUnit::Seconds,
    };

    let mut request = StaffingRequest::new(
        parse_arg(args, "--calls", 1000.0),
        parse_arg(args, "--aht", 120.0),
        parse_arg(args, "--target-answer-time", 20.0),
        parse_arg(args, "--target-service-level", 0.8),
    )
    .with_aht_unit(aht_unit);

    if let Some(max_occupancy) = parse_optional(args, "--max-occupancy") {
        request = request.with_max_occupancy(max_occupancy);
    }
    if let Some(shrinkage) = parse_optional(args, "--shrinkage") {
        request = request.with_shrinkage(shrinkage);
    }
    if let Some(agents) = flag_value(args, "--agents") {
        request = request.with_agents(agents.parse().context("--agents must be an integer")?);
    }
    Ok(request)
}

/// One JSON command per line in, one JSON line out.
/// Bad lines and failed calculations are reported and skipped.
fn run_stdin_loop() -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Staff(request) => {
                let reply = match calc_staffing(&request) {
                    Ok(result) => serde_json::json!({ "result": result }),
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };
                writeln!(stdout, "{}", reply)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn emit(scenario: &str, request: &StaffingRequest, result: &StaffingResult, json: bool) -> Result<()> {
    if json {
        let report = Report {
            generated_at: chrono::Utc::now().to_rfc3339(),
            scenario,
            inputs: request,
            result: *result,
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_summary(scenario, request, result);
    }
    Ok(())
}

fn print_summary(scenario: &str, request: &StaffingRequest, result: &StaffingResult) {
    let unit = request.aht_unit;

    println!("=== {scenario} ===");
    println!("Inputs:");
    println!("  Calls per hour:           {}", request.calls_per_hour);
    println!("  Average handling time:    {} {unit}", request.aht);
    if let Some(agents) = request.agents {
        println!("  Available agents:         {agents}");
    }
    if let Some(shrinkage) = request.shrinkage {
        println!("  Shrinkage:                {:.1} %", shrinkage * 100.0);
    }
    if let Some(max_occupancy) = request.max_occupancy {
        println!("  Max occupancy:            {:.1} %", max_occupancy * 100.0);
    }
    println!("  Target answer time:       {} {unit}", request.target_answer_time);
    println!("  Target service level:     {:.1} %", request.target_service_level * 100.0);
    println!();

    println!("Outputs:");
    println!("  Traffic intensity:        {:.3} Erlang", result.traffic_intensity);
    println!("  Waiting probability:      {:.2} %", result.wait_probability * 100.0);
    println!("  Immediate answer:         {:.2} %", result.immediate_answer * 100.0);
    println!("  Service level:            {:.2} %", result.service_level * 100.0);
    println!("  Average speed of answer:  {:.2} {unit}", result.average_speed_of_answer);
    println!("  Occupancy:                {:.2} %", result.occupancy * 100.0);
    if request.agents.is_none() {
        println!("  Agents:                   {}", result.agents);
    }
    if request.shrinkage.is_some() {
        println!("  Agents + shrinkage:       {}", result.agents_with_shrinkage);
    }
    println!();
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: FromStr + Copy + Display>(args: &[String], flag: &str, default: T) -> T {
    match flag_value(args, flag) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("ignoring {flag} {raw:?}: not a number, using {default}");
            default
        }),
        None => default,
    }
}

/// Like `parse_arg` but with no default: an absent or malformed flag is `None`.
fn parse_optional<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    let raw = flag_value(args, flag)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring {flag} {raw:?}: not a number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("staffing-runner")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn omitted_optional_flags_stay_unset() {
        let request = request_from_args(&args(&["--calls", "500"])).unwrap();
        assert_eq!(request.calls_per_hour, 500.0);
        assert_eq!(request.max_occupancy, None);
        assert_eq!(request.shrinkage, None);
        assert_eq!(request.agents, None);
    }

    #[test]
    fn given_optional_flags_are_applied() {
        let request = request_from_args(&args(&[
            "--max-occupancy", "0.85", "--shrinkage", "0.3", "--agents", "35",
        ]))
        .unwrap();
        assert_eq!(request.max_occupancy, Some(0.85));
        assert_eq!(request.shrinkage, Some(0.3));
        assert_eq!(request.agents, Some(35));
    }

    #[test]
    fn malformed_values_fall_back() {
        let request =
            request_from_args(&args(&["--calls", "lots", "--shrinkage", "thirty"])).unwrap();
        assert_eq!(request.calls_per_hour, 1000.0);
        assert_eq!(request.shrinkage, None);
    }

    #[test]
    fn malformed_agents_is_an_error() {
        assert!(request_from_args(&args(&["--agents", "many"])).is_err());
    }
}
