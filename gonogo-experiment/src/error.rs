use thiserror::Error;

/// Reasons a session configuration is refused before any trial runs
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("trial count must be greater than zero")]
    NoTrials,
    #[error("go probability {0} is outside [0, 1]")]
    GoProbability(f64),
    #[error("response window must be longer than zero")]
    EmptyResponseWindow,
    #[error("{field} of {ms} ms exceeds the one day limit")]
    DurationTooLong { field: &'static str, ms: u64 },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("session task stopped before the last trial resolved")]
    Interrupted,
    #[error("trial {trial} left its response window without an outcome")]
    Unresolved { trial: usize },
    #[error("outcome of trial {trial} was refused by the session record")]
    OutcomeRefused { trial: usize },
    #[error("session ended with {recorded} of {expected} outcomes")]
    Incomplete { recorded: usize, expected: usize },
}
