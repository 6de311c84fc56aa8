//!
//! _Errors_
//!
//! Every operation of the client returns [`Result`], whose error side is one of four
//! categories: configuration, network, decoding or a provider status.
//!

use thiserror::Error;

/// Errors returned by the client
#[derive(Error, Debug)]
pub enum Error {
    /// Bad base url, missing or empty credential, unreadable config
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failure, timeout or cancellation
    #[error("Network error: {0}")]
    Network(String),

    /// The body was not valid json for the expected shape
    #[error("Failed to parse json ({context}): {source}")]
    Decode {
        /// What was being decoded
        context: &'static str,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The provider answered with a status other than 200
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl Error {
    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// HTTP status of the response when this is a provider error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Provider(err) => Some(err.status()),
            _ => None,
        }
    }
}

/// Errors mapped from the provider's http status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 400
    #[error(
        "Bad request. Please check error message and your parameters. Error message is {message}"
    )]
    BadRequest {
        /// `message` field of the provider's error body
        message: String,
    },
    /// 403
    #[error("Authorization failed. Please supply a valid auth_key parameter.")]
    AuthorizationFailed,
    /// 404
    #[error("The requested resource could not be found.")]
    NotFound,
    /// 413
    #[error("The request size exceeds the limit.")]
    RequestTooLarge,
    /// 429
    #[error("Too many requests. Please wait and resend your request.")]
    TooManyRequests,
    /// 456
    #[error("Quota exceeded. The character limit has been reached.")]
    QuotaExceeded,
    /// 503
    #[error("Resource currently unavailable. Try again later.")]
    Unavailable,
    /// Any other 5xx
    #[error("Internal error (status {status})")]
    Internal {
        /// Status returned by the provider
        status: u16,
    },
    /// Anything else that is not 200
    #[error("Unexpected error (status {status})")]
    Unexpected {
        /// Status returned by the provider
        status: u16,
    },
}

impl ProviderError {
    /// Maps a non-200 status to its error. `message` is only kept for 400.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ProviderError::BadRequest { message },
            403 => ProviderError::AuthorizationFailed,
            404 => ProviderError::NotFound,
            413 => ProviderError::RequestTooLarge,
            429 => ProviderError::TooManyRequests,
            456 => ProviderError::QuotaExceeded,
            503 => ProviderError::Unavailable,
            s if s >= 500 => ProviderError::Internal { status: s },
            s => ProviderError::Unexpected { status: s },
        }
    }

    /// The http status this error stands for
    pub fn status(&self) -> u16 {
        match self {
            ProviderError::BadRequest { .. } => 400,
            ProviderError::AuthorizationFailed => 403,
            ProviderError::NotFound => 404,
            ProviderError::RequestTooLarge => 413,
            ProviderError::TooManyRequests => 429,
            ProviderError::QuotaExceeded => 456,
            ProviderError::Unavailable => 503,
            ProviderError::Internal { status } | ProviderError::Unexpected { status } => *status,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn test_status_round_trips_through_from_status() {
    for status in [400, 403, 404, 413, 429, 456, 503, 500, 502, 418, 302] {
        assert_eq!(
            ProviderError::from_status(status, String::new()).status(),
            status
        );
    }
}

#[test]
fn test_bad_request_display_carries_message() {
    let err = Error::from(ProviderError::from_status(400, "Bad request.".to_string()));
    assert!(err.to_string().contains("Bad request."));
    assert_eq!(err.status(), Some(400));
}

#[test]
fn test_only_bad_request_keeps_message() {
    let err = ProviderError::from_status(403, "Forbidden".to_string());
    assert_eq!(err, ProviderError::AuthorizationFailed);
    assert!(!err.to_string().contains("Forbidden"));
}
