use axum::{
    Json,
    response::{IntoResponse, Response},
};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The config file could not be read or parsed
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A request carried a bad token or lacked a required parameter
    #[error("{0}")]
    Validation(String),

    /// A remote host could not be reached or answered with a failure status
    #[error("network error: {0}")]
    Network(String),

    /// A remote host answered with a body we could not understand
    #[error("could not parse response: {0}")]
    ResponseParse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Validation(_) => "validation",
            Error::Network(_) => "network",
            Error::ResponseParse(_) => "response_parse",
            Error::Timeout(_) => "timeout",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

/// Body returned alongside every `400` response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::warn!(error = %self, "Rejecting request");

        let body = ErrorEnvelope {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
