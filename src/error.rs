use std::time::Duration;

/// Result type for game-state mutations
pub type GameResult<T> = Result<T, GameError>;

/// Validation failures are synchronous and non-mutating; every variant maps
/// to one of the reporting categories the API surfaces to callers.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Lobby, player, event, section, or draft does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Actor lacks the role the action requires
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The action conflicts with current state (role taken, already
    /// revealed, already reviewed, lobby full, game already started)
    #[error("{0}")]
    Conflict(String),

    /// A per-round budget or configured resource is used up
    #[error("{0}")]
    Exhausted(String),

    /// The supplied arguments fail validation
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors from the external fact-check collaborator
#[derive(Debug, thiserror::Error)]
pub enum FactCheckError {
    /// No provider configured; callers must surface this distinctly
    #[error("fact checking is not configured")]
    NotConfigured,

    #[error("fact check request failed: {0}")]
    Request(String),

    #[error("fact check timed out after {0:?}")]
    Timeout(Duration),

    #[error("fact check response could not be parsed: {0}")]
    Parse(String),
}
