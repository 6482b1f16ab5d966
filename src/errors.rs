use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

/// Failures talking to the annotation service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("the annotation service rejected the API key")]
    Unauthorized,

    #[error("the annotation service answered with status {0}")]
    Status(u16),

    #[error("could not reach the annotation service: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected response from the annotation service: {0}")]
    Decode(#[source] reqwest::Error),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Unauthorized => Self::unauthorized(err.to_string()),
            other => Self::bad_gateway(other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
