use thiserror::Error;

/// Malformed inbound payloads, rejected at the transport boundary.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("missing channel message id")]
    MissingMessageId,

    #[error("missing sender address")]
    MissingSender,

    #[error("missing message body")]
    MissingBody,
}

/// Errors from repository operations (used by trait definitions in siteforge-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failure to extract code fences from a model response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no html code fence found in model response")]
    MissingMarkup,
}

/// Errors from the generation capability. A timed-out or unparsable response
/// is a generation failure, not a distinct condition.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("generation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("model response was unparsable: {0}")]
    Unparsable(#[from] ParseError),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors while materializing files or writing the site archive.
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(String),
}

/// Errors from the outbound message-sending capability.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("send rejected with status {status}")]
    Rejected { status: u16 },
}

/// Errors from the object storage upload capability.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),

    #[error("upload rejected with status {status}")]
    Rejected { status: u16 },
}

/// Errors from the deploy trigger capability.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deploy trigger failed: {0}")]
    Trigger(String),

    #[error("malformed deploy status response: {0}")]
    Status(String),
}

/// Everything that can abort one conversation turn.
///
/// Every variant is scoped to the turn it occurred in; nothing here is fatal
/// to the process. The turn handler converts these into one user-facing
/// notice plus a failed outcome for the transport layer.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("generation failure: {0}")]
    Generation(#[from] GenerationError),

    #[error("packaging failure: {0}")]
    Packaging(#[from] PackagingError),

    #[error("delivery failure: {0}")]
    Delivery(String),
}

impl From<StorageError> for TurnError {
    fn from(e: StorageError) -> Self {
        TurnError::Delivery(e.to_string())
    }
}

impl From<DeployError> for TurnError {
    fn from(e: DeployError) -> Self {
        TurnError::Delivery(e.to_string())
    }
}
