//! Errors reported by the CLI and their exit codes.

/// Exit code for a fully successful command.
pub const EXIT_OK: i32 = 0;
/// Exit code when the server reported a failure (per-tier or HTTP).
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the admin endpoint cannot be reached.
pub const EXIT_UNREACHABLE: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Nothing answered at the admin URL; no cache operation was attempted.
    #[error("UnreachableError: cannot reach admin endpoint at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// The server answered with an error status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The request could not be built or sent for a reason other than connectivity.
    #[error("request failed: {0}")]
    Request(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => EXIT_UNREACHABLE,
            _ => EXIT_FAILURE,
        }
    }

    /// Reports a failed connectivity check as unreachable, keeping the cause.
    ///
    /// A proxy answering 502 for a dead upstream, a timeout or an unexpected
    /// `/health` body all mean the admin endpoint is not usable.
    pub fn into_unreachable(self, url: &str) -> Self {
        match self {
            Self::Unreachable { .. } => self,
            other => Self::Unreachable {
                url: url.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Classifies a transport error from reqwest.
    pub fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Unreachable {
                url: url.to_string(),
                reason: root_cause(&err),
            }
        } else {
            Self::Request(root_cause(&err))
        }
    }
}

/// Innermost error message, which carries the OS-level detail.
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
