use thiserror::Error;

/// Failures surfaced by the browser client. All of them are handled at the
/// call site; none is fatal to the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("server responded with HTTP status {status}")]
    HttpStatus { status: u16 },
    #[error("request failed before a response arrived: {cause}")]
    Transport { cause: String },
    #[error("server reported an error: {message}")]
    BackendReported { message: String },
    #[error("speech recognition is not available in this browser")]
    UnsupportedCapability,
    #[error("speech recognition error: {code}")]
    Recognition { code: String },
    #[error("failed to decode response body: {cause}")]
    Decode { cause: String },
    #[error("invalid configuration: {cause}")]
    Config { cause: String },
}

impl Error {
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Error::Transport { cause: cause.to_string() }
    }

    pub fn decode(cause: impl std::fmt::Display) -> Self {
        Error::Decode { cause: cause.to_string() }
    }

    /// True for failures that happened before any response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Decode { .. })
    }
}

/// Check an HTTP status code, accepting only the 2xx range
pub fn check_status(status: u16) -> Result<(), Error> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(Error::HttpStatus { status })
    }
}
