use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErlangError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Unstable queue: {agents} agents cannot serve {traffic_intensity:.3} Erlangs")]
    Unstable { traffic_intensity: f64, agents: u64 },

    #[error("No agent count up to {max_agents} reaches service level {target_service_level}")]
    NoSolution { target_service_level: f64, max_agents: u64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ErlangError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput { field, reason: reason.into() }
    }
}

pub type ErlangResult<T> = Result<T, ErlangError>;
