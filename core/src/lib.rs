//! Call-center staffing from Erlang C queueing formulas.
//!
//! `erlang` holds the formula primitives; `staffing` composes them into a
//! fixed-headcount evaluation and a minimum-headcount search.

pub mod config;
pub mod erlang;
pub mod error;
pub mod staffing;
pub mod types;

pub use error::{ErlangError, ErlangResult};
pub use staffing::{
    calc_staffing, evaluate_fixed_agents, minimize_agents, StaffingRequest, StaffingResult,
};
pub use types::TimeUnit;
