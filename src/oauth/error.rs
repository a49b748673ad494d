//! OAuth client input errors

use std::fmt;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Request rejected before reaching the provider
///
/// The user has to restart the flow from `/auth`; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    /// `/auth` presented an origin outside the allow-list
    ForbiddenOrigin(String),

    /// `/auth` presented no origin and origins are mandatory
    MissingOrigin,

    /// `/callback` without `code` or `state`
    MissingCodeOrState,

    /// `/callback` state absent from the cookie or not equal to it
    InvalidState,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OAuthError::ForbiddenOrigin(_) => write!(f, "Forbidden origin"),
            OAuthError::MissingOrigin => write!(f, "Missing origin"),
            OAuthError::MissingCodeOrState => write!(f, "Missing code or state"),
            OAuthError::InvalidState => write!(f, "Invalid state"),
        }
    }
}

impl std::error::Error for OAuthError {}

impl OAuthError {
    /// Get corresponding HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            OAuthError::ForbiddenOrigin(_) | OAuthError::MissingOrigin => StatusCode::FORBIDDEN,
            OAuthError::MissingCodeOrState | OAuthError::InvalidState => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
