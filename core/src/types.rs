//! Shared primitive types used across the engine and the solver.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Offered load. One Erlang = one agent kept busy continuously.
pub type Erlangs = f64;

/// A probability or fraction in [0.0, 1.0].
pub type Probability = f64;

/// A whole number of agents.
pub type AgentCount = u64;

/// Unit of an average handling time.
/// The divisor converts a duration in this unit into hours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn divisor(&self) -> f64 {
        match self {
            Self::Seconds => 3600.0,
            Self::Minutes => 60.0,
            Self::Hours   => 1.0,
        }
    }

    /// Short label used by the runner when printing durations.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Seconds => "sec",
            Self::Minutes => "min",
            Self::Hours   => "hour",
        }
    }

    /// Convert a duration in this unit into hours.
    pub fn to_hours(&self, value: f64) -> f64 {
        value / self.divisor()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hr" | "hour" | "hours"               => Ok(Self::Hours),
            other => Err(format!("unknown time unit '{other}'")),
        }
    }
}
