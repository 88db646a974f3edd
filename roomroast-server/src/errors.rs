use axum::{
    http,
    response::{IntoResponse, Response},
    Json,
};
use roomroast::ErrorBody;

pub type WebResult<T> = std::result::Result<T, WebError>;

/// Which model call a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Stage {
    Vision,
    Text,
}

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{stage} model failed: {body}")]
    Upstream { stage: Stage, body: String },
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl WebError {
    pub fn status(&self) -> http::StatusCode {
        match self {
            WebError::InvalidInput(_) => http::StatusCode::BAD_REQUEST,
            WebError::Upstream { .. } | WebError::Internal(_) => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let error = self.to_string();
        let details = match self {
            WebError::InvalidInput(msg) => msg.clone(),
            // The upstream body verbatim, so the caller can tell what the model server said
            WebError::Upstream { body, .. } => body.clone(),
            WebError::Internal(err) => format!("{:#}", err),
        };
        ErrorBody { error, details }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self {
            WebError::InvalidInput(msg) => tracing::warn!("Rejected request: {}", msg),
            WebError::Upstream { .. } => tracing::error!("{}", self),
            WebError::Internal(err) => tracing::error!("Internal error: {:#}", err),
        }
        (self.status(), Json(self.to_body())).into_response()
    }
}
