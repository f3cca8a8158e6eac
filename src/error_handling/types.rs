use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlError(String),
    #[error("Bind address error: {0}")]
    BadBindAddress(String),
    #[error("Storage configuration error: {0}")]
    BadStorage(String),
    #[error("Value out of range: {0}")]
    NotInRange(String),
}

/// Failures raised by a storage backend.
///
/// Constraint violations are kept apart from generic write failures so the
/// services above can turn them into domain errors (a unique violation on
/// `votos` is a duplicate vote, not an outage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Storage write failed: {0}")]
    WriteFailed(String),
    #[error("Storage read failed: {0}")]
    ReadFailed(String),
    #[error("Unique constraint violated")]
    UniqueViolation,
    #[error("Foreign key constraint violated")]
    ForeignKeyViolation,
    #[error("Stored row could not be decoded: {0}")]
    Corrupted(String),
    #[error("Storage unavailable")]
    Unavailable,
}

/// Error kinds of the session, attendance and voting workflow.
///
/// The web layer maps each variant to a transport status; the services never
/// deal with HTTP concerns themselves.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Cannot {action} {entity} in status '{from}'")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: &'static str,
    },
    #[error("{entity} {id} is in terminal status '{status}'")]
    InvalidState {
        entity: &'static str,
        id: Uuid,
        status: String,
    },
    #[error("Voting on projeto {projeto_id} is closed (status '{status}')")]
    VotingClosed { projeto_id: Uuid, status: String },
    #[error("Vereador {vereador_id} already voted on projeto {projeto_id}")]
    DuplicateVote { projeto_id: Uuid, vereador_id: Uuid },
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),
}

impl WorkflowError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Validation(_) => "validation",
            WorkflowError::NotFound { .. } => "not_found",
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::InvalidState { .. } => "invalid_state",
            WorkflowError::VotingClosed { .. } => "voting_closed",
            WorkflowError::DuplicateVote { .. } => "duplicate_vote",
            WorkflowError::Persistence(_) => "persistence",
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Could not bind HTTP server: {0}")]
    BindFailed(String),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("Web error: {0}")]
    WebError(#[from] WebError),
}
