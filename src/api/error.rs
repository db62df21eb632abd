use thiserror::Error;

/// Failure talking to the streaming service.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// The service answered with a non-success status.
    #[error("http status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("malformed response body: {0}")]
    Payload(String),
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The service signals an expired or missing session with 401; callers
    /// use this to drop stored credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
