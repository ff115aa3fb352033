use thiserror::Error;

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error taxonomy for remote operations.
///
/// The sign-in flow only ever discriminates three ways: a malformed
/// response body (special-cased by the refresh operation), a transport
/// problem, and a well-formed rejection from the server. The latter two
/// are handled identically by callers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("malformed response: {0}")]
    ParseFailure(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        // Arbitrary server bodies may put a multi-byte character across
        // the cut; back up to a char boundary before slicing
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::TransportFailure(format!("status {}: {}", status, Self::truncate_body(body)))
    }

    pub fn transport(err: reqwest::Error) -> Self {
        ApiError::TransportFailure(err.to_string())
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ApiError::ParseFailure(_))
    }
}
