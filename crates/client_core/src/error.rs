use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid API url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Duplicate main ID. Please choose a different one.")]
    DuplicateId,
    #[error("Control not found: {0}")]
    NotFound(String),
    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),
    #[error("mainID is locked while control {0} is being edited")]
    MainIdLocked(String),
    #[error("control {0} is being edited; submit or cancel the edit first")]
    EditInProgress(String),
    #[error("no edit in progress")]
    NoActiveEdit,
    #[error("failed to write export: {0}")]
    Export(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateId) || self.status() == Some(409)
    }

    /// Message supplied by the server in a `{message}` error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => Some(message),
            _ => None,
        }
    }
}
