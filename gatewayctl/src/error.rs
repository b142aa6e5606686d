//! Client-side error taxonomy.

/// Everything that can go wrong between parsing arguments and printing a response.
///
/// Each variant maps to its own exit code so scripts can tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum CtlError {
    /// Bad local input, detected before any network I/O.
    #[error("{0}")]
    Validation(String),

    /// The gateway answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    Protocol { status: u16, body: String },

    /// Connection refused, DNS failure or timeout.
    #[error("Connection error: {0}")]
    Transport(String),

    /// The response body is not JSON.
    #[error("Bad JSON response: {0}")]
    Decode(String),
}

impl CtlError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CtlError::Validation(_) => 1,
            CtlError::Protocol { .. } => 2,
            CtlError::Transport(_) => 3,
            CtlError::Decode(_) => 4,
        }
    }
}

/// `err` followed by each of its sources, separated by `: `.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
