use thiserror::Error;

/// Crate-wide error type.
///
/// Every public operation returns either a well-formed success value or one of
/// these variants; raw transport errors never escape past the API client.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote service could not be reached (connect/timeout/body read).
    #[error("translation service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// Missing or invalid API credentials. Blocks all remote calls until the
    /// configuration is corrected.
    #[error("API credentials are missing or invalid: {0}")]
    Credentials(String),

    /// The remote service answered with a non-2xx status or an explicit error
    /// payload.
    #[error("translation service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The remote service answered 2xx but the body did not parse into the
    /// expected shape.
    #[error("malformed response from translation service: {0}")]
    Malformed(String),

    /// Bad input on an interactive path (unmapped language code, missing
    /// content record, malformed request).
    #[error("{0}")]
    Validation(String),

    /// Project store failure.
    #[error("project store error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Content store failure, reported by the platform collaborator.
    #[error("content store error: {0}")]
    Content(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify a reqwest failure: anything that happened before a status
    /// line was read is transport, the rest is a decode problem.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Malformed(err.to_string())
        } else {
            Error::Transport(err)
        }
    }
}
