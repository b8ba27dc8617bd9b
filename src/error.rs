use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::cache::resource::Resource;

/// Message returned to clients when a resource cannot be served.
pub const UNAVAILABLE_MSG: &str = "cannot get data, check credentials";

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no upstream credentials configured")]
    NoCredentials,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream responded with status {status}")]
    Upstream { status: u16, body: String },

    #[error("credentials rejected by upstream")]
    CredentialsRejected,

    #[error("resource '{0}' is unavailable")]
    Unavailable(Resource),
}

/// Maximum length for upstream bodies kept in errors and log lines
const MAX_BODY_LENGTH: usize = 500;

pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

impl ProxyError {
    /// Short label used for the `reason` metric dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            ProxyError::InvalidInput(_) => "invalid_input",
            ProxyError::NoCredentials => "no_credentials",
            ProxyError::Transport(e) if e.is_timeout() => "timeout",
            ProxyError::Transport(_) => "transport",
            ProxyError::Upstream { .. } => "upstream_status",
            ProxyError::CredentialsRejected => "rejected",
            ProxyError::Unavailable(_) => "unavailable",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProxyError::CredentialsRejected => StatusCode::UNAUTHORIZED,
            ProxyError::NoCredentials => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Transport(_) | ProxyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match &self {
            ProxyError::Unavailable(_) => UNAVAILABLE_MSG.to_string(),
            other => other.to_string(),
        };
        (self.status_code(), message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("denied"), "denied");
    }

    #[test]
    fn truncate_cuts_on_char_boundary() {
        let body = "é".repeat(400);
        let truncated = truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
        assert!(truncated.starts_with("ééé"));
    }

    #[test]
    fn unavailable_maps_to_500() {
        let err = ProxyError::Unavailable(Resource::Primary);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.reason(), "unavailable");
    }
}
