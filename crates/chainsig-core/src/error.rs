//! Error types for signature ingestion, payload decoding and encoding.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while turning raw signature text into a [`SignatureRecord`].
///
/// [`SignatureRecord`]: crate::signature::SignatureRecord
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("malformed signature '{input}': {reason}")]
    MalformedSignature { input: String, reason: String },
}

impl SignatureError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSignature {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// The raw text that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            Self::MalformedSignature { input, .. } => input,
        }
    }
}

/// Errors raised while decoding a payload against one candidate layout.
///
/// Every variant means "this candidate does not match this payload". The
/// resolver uses them to filter candidates; they never escape as hard failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum DecodeError {
    #[error("value out of range for {ty}: {reason}")]
    OutOfRangeValue { ty: String, reason: String },

    #[error("truncated payload: need {needed} bytes, have {available}")]
    TruncatedPayload { needed: usize, available: usize },

    #[error("malformed encoding: {reason}")]
    MalformedEncoding { reason: String },

    #[error("topic count mismatch: expected {expected}, got {got}")]
    TopicCount { expected: usize, got: usize },

    #[error("type nesting deeper than {limit}")]
    DepthExceeded { limit: usize },
}

impl DecodeError {
    /// Short machine-readable label, used for metrics and logs.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::OutOfRangeValue { .. } => "out_of_range_value",
            Self::TruncatedPayload { .. } => "truncated_payload",
            Self::MalformedEncoding { .. } => "malformed_encoding",
            Self::TopicCount { .. } => "topic_count",
            Self::DepthExceeded { .. } => "depth_exceeded",
        }
    }
}

/// Errors raised when values do not conform to the types they are encoded as.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("argument count mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("value out of range for {ty}: {reason}")]
    ValueOutOfRange { ty: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        let e = DecodeError::TruncatedPayload {
            needed: 64,
            available: 36,
        };
        assert_eq!(e.to_string(), "truncated payload: need 64 bytes, have 36");
        assert_eq!(e.kind_str(), "truncated_payload");
    }

    #[test]
    fn decode_error_serializes_with_tag() {
        let e = DecodeError::MalformedEncoding {
            reason: "offset out of bounds".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["error"], "malformed_encoding");
        assert_eq!(json["reason"], "offset out of bounds");
    }
}
