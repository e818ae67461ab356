use std::time::Duration;

use thiserror::Error;

/// Failure of a single API call. The client logs these and hands them back
/// to the caller untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// No response was received
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The server answered outside the 2xx range
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: Option<String> },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Response payload, when the server sent one
    pub fn payload(&self) -> Option<&str> {
        match self {
            ApiError::Status { body: Some(body), .. } => Some(body.as_str()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// What gets logged: the payload if present, else the message
    pub fn diagnostic(&self) -> String {
        self.payload()
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_prefers_payload() {
        let error = ApiError::Status {
            status: 422,
            body: Some(r#"{"error":"name is required"}"#.to_string()),
        };
        assert_eq!(error.diagnostic(), r#"{"error":"name is required"}"#);
        assert_eq!(error.status(), Some(422));
    }

    #[test]
    fn test_diagnostic_falls_back_to_message() {
        let error = ApiError::Status { status: 502, body: None };
        assert_eq!(error.diagnostic(), "Request failed with status code 502");

        let timeout = ApiError::Timeout(Duration::from_millis(45_000));
        assert_eq!(timeout.diagnostic(), "Request timed out after 45000ms");
        assert_eq!(timeout.payload(), None);
    }
}
