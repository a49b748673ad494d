//! OAuth flow types

use serde::{Deserialize, Serialize};

use super::github::ExchangeError;

/// Cookie carrying the anti-CSRF state between `/auth` and `/callback`
pub const STATE_COOKIE: &str = "decap_oauth_state";

/// Cookie carrying the allow-listed origin that started the flow
pub const ORIGIN_COOKIE: &str = "decap_oauth_origin";

/// Origins permitted to start a flow and receive the token
///
/// Order matters: the first entry is the default postMessage target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    /// Parse a comma-separated list, trimming entries and dropping empties
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|o| o == origin)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Query parameters for `/auth`
///
/// Decap CMS also sends `provider`, `site_id` and `scope`; those are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeParams {
    pub origin: Option<String>,
}

/// Query parameters for `/callback`
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// A checked authorization request, ready to become a 302
#[derive(Debug, Clone)]
pub struct AuthorizeRedirect {
    /// Provider authorize URL including query
    pub location: String,
    /// 32 lowercase hex characters
    pub state: String,
    /// Allow-listed origin that initiated the flow, if one was presented
    pub origin: Option<String>,
}

/// Result of a callback that passed input and state validation
#[derive(Debug)]
pub enum CallbackOutcome {
    Authorized {
        access_token: String,
        target_origin: String,
    },
    ExchangeFailed(ExchangeError),
}

/// Token endpoint response body
///
/// The provider answers 200 even for a bad code, so an `error` field wins
/// over everything else.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TokenResponse {
    Error {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    },
    Success {
        access_token: String,
        #[serde(default)]
        token_type: Option<String>,
        #[serde(default)]
        scope: Option<String>,
    },
}

/// Body of `GET /`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            service: "Decap CMS GitHub OAuth Provider",
            status: "ok",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_parse() {
        let origins = AllowedOrigins::parse("https://a.example, ,https://b.example ");
        assert!(origins.contains("https://a.example"));
        assert!(origins.contains("https://b.example"));
        assert!(!origins.contains("https://c.example"));
        assert!(!origins.contains(""));
        assert_eq!(origins.first(), Some("https://a.example"));
    }

    #[test]
    fn test_allowed_origins_exact_match() {
        let origins = AllowedOrigins::parse("https://a.example");
        assert!(!origins.contains("https://a.example/"));
        assert!(!origins.contains("http://a.example"));
        assert!(!origins.contains("https://a.example.evil.com"));
    }

    #[test]
    fn test_allowed_origins_empty() {
        let origins = AllowedOrigins::parse(" , ");
        assert!(origins.is_empty());
        assert_eq!(origins.first(), None);
    }

    #[test]
    fn test_token_response_success() {
        let resp: TokenResponse = serde_json::from_str(
            r#"{"access_token":"tok123","token_type":"bearer","scope":"repo"}"#,
        )
        .unwrap();
        assert_eq!(
            resp,
            TokenResponse::Success {
                access_token: "tok123".to_string(),
                token_type: Some("bearer".to_string()),
                scope: Some("repo".to_string()),
            }
        );
    }

    #[test]
    fn test_token_response_error() {
        let resp: TokenResponse = serde_json::from_str(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
        )
        .unwrap();
        assert!(matches!(
            resp,
            TokenResponse::Error { ref error, error_description: Some(_) } if error == "bad_verification_code"
        ));
    }

    #[test]
    fn test_token_response_error_takes_precedence() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok","error":"weird"}"#).unwrap();
        assert!(matches!(resp, TokenResponse::Error { .. }));
    }

    #[test]
    fn test_token_response_unknown_shape() {
        assert!(serde_json::from_str::<TokenResponse>(r#"{"message":"hi"}"#).is_err());
        assert!(serde_json::from_str::<TokenResponse>(r#"{"access_token":42}"#).is_err());
    }
}
