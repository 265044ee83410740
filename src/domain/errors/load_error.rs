//! Failure taxonomy for image loading.

use thiserror::Error;

/// Result type for pipeline operations.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Why a request did not complete.
///
/// By the time one of these reaches a caller the decision to fail is final;
/// no retry or fallback happens downstream of this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Transport-level failure while fetching bytes.
    #[error("network error: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// Bytes were obtained but could not be decoded into an image.
    #[error("decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// The request was aborted before completion.
    #[error("request cancelled")]
    Cancelled,

    /// The request configuration was unsatisfiable.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What made the request unsatisfiable.
        reason: String,
    },

    /// The fetch succeeded but returned no usable bytes.
    #[error("no usable data returned")]
    EmptyData,

    /// I/O failure while reading or writing local storage.
    #[error("io error: {message}")]
    Io {
        /// Description of the I/O failure.
        message: String,
    },
}

impl LoadError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Returns the fieldless kind of this error, for branching and metrics.
    #[must_use]
    pub const fn kind(&self) -> LoadErrorKind {
        match self {
            Self::Network { .. } => LoadErrorKind::Network,
            Self::Decode { .. } => LoadErrorKind::Decode,
            Self::Cancelled => LoadErrorKind::Cancelled,
            Self::InvalidRequest { .. } => LoadErrorKind::InvalidRequest,
            Self::EmptyData => LoadErrorKind::EmptyData,
            Self::Io { .. } => LoadErrorKind::Io,
        }
    }

    /// Returns true if the request was cancelled rather than failed.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if retrying the same request later could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Io { .. })
    }
}

/// Fieldless mirror of [`LoadError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadErrorKind {
    /// Transport-level fetch failure.
    Network,
    /// Undecodable bytes.
    Decode,
    /// Aborted before completion.
    Cancelled,
    /// Unsatisfiable request configuration.
    InvalidRequest,
    /// No usable bytes.
    EmptyData,
    /// Local storage failure.
    Io,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(LoadError::network("dns"), LoadErrorKind::Network ; "network")]
    #[test_case(LoadError::decode("bad magic"), LoadErrorKind::Decode ; "decode")]
    #[test_case(LoadError::Cancelled, LoadErrorKind::Cancelled ; "cancelled")]
    #[test_case(LoadError::invalid_request("no source"), LoadErrorKind::InvalidRequest ; "invalid")]
    #[test_case(LoadError::EmptyData, LoadErrorKind::EmptyData ; "empty")]
    #[test_case(LoadError::io("disk full"), LoadErrorKind::Io ; "io")]
    fn test_kind_mapping(error: LoadError, kind: LoadErrorKind) {
        assert_eq!(error.kind(), kind);
    }

    #[test]
    fn test_display_includes_detail() {
        let error = LoadError::network("connection refused");
        assert_eq!(error.to_string(), "network error: connection refused");
    }

    #[test]
    fn test_transient_classification() {
        assert!(LoadError::network("timeout").is_transient());
        assert!(!LoadError::decode("bad data").is_transient());
        assert!(!LoadError::Cancelled.is_transient());
        assert!(LoadError::Cancelled.is_cancelled());
    }
}
