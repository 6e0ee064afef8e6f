use thiserror::Error;

/// The single error every gateway operation resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// A required identifier was empty; raised before any network call.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    /// The file picked for upload was rejected locally.
    #[error("invalid file: {0}")]
    InvalidFile(String),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    Url(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The human-readable message shown to the user.
    ///
    /// A message carried by the response body wins; otherwise the HTTP status
    /// picks a fixed message; otherwise the transport error is reported.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingParameter(name) => format!("Missing {name}."),
            Self::InvalidFile(message) => message.clone(),
            Self::Timeout => "Server unreachable: request timed out.".to_string(),
            Self::Transport(message) => format!("Server unreachable: {message}"),
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Status { status, .. } => status_message(*status),
            Self::Decode(message) => format!("Unexpected server response: {message}"),
            Self::Url(message) => format!("Invalid address: {message}"),
        }
    }
}

fn status_message(status: u16) -> String {
    match status {
        400 => "Invalid request.".to_string(),
        401 => "Not authorized.".to_string(),
        403 => "Access denied.".to_string(),
        404 => "Resource not found.".to_string(),
        500 => "Internal server error, try again later.".to_string(),
        503 => "Service unavailable.".to_string(),
        other => format!("Error {other}."),
    }
}
