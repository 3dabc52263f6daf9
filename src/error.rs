//! Error types for the analysis pipeline.
//!
//! Only validation failures and external-service failures end a request
//! unsuccessfully. Unparseable model output is not an error; the
//! interpreter substitutes a fallback result instead.

use crate::store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Input rejected before any pipeline stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing reportText in request body")]
    MissingText,

    #[error("Report text too long. Maximum {} characters allowed.", group_thousands(.max))]
    TooLong { len: usize, max: usize },
}

/// The generative model call failed.
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("Model API error: {status}")]
    Status { status: u16, body: String },

    #[error("Invalid response from model API")]
    Malformed,

    #[error("Failed to reach model API: {0}")]
    Transport(String),

    #[error("Model API did not respond within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Model API credential is not configured")]
    MissingCredential,
}

/// Any failure that terminates an analyze request.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ExternalService(#[from] ExternalServiceError),

    #[error("Interaction store failure: {0}")]
    Store(#[from] StoreError),
}

/// Formats `50000` as `50,000` for user-facing messages.
fn group_thousands(n: &usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_long_message_matches_client_contract() {
        let err = ValidationError::TooLong {
            len: 50_001,
            max: 50_000,
        };
        assert_eq!(
            err.to_string(),
            "Report text too long. Maximum 50,000 characters allowed."
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(&0), "0");
        assert_eq!(group_thousands(&999), "999");
        assert_eq!(group_thousands(&1000), "1,000");
        assert_eq!(group_thousands(&1234567), "1,234,567");
    }

    #[test]
    fn test_status_error_hides_body() {
        let err = ExternalServiceError::Status {
            status: 503,
            body: "upstream detail".to_string(),
        };
        assert_eq!(err.to_string(), "Model API error: 503");
    }

    #[test]
    fn test_timeout_message() {
        let err = ExternalServiceError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Model API did not respond within 30s");
    }
}
