//! GitHub OAuth token endpoint client
//!
//! Performs the server-to-server authorization code exchange. The client
//! secret only ever travels on this request.

use std::fmt;

use reqwest::{Client, StatusCode, header};
use serde_json::json;

use crate::http_client::{ProxyConfig, build_client};
use crate::model::config::Config;

use super::types::TokenResponse;

/// Token exchange failure
///
/// All variants are handled the same way by the callback; the split only
/// exists for logging and for the message shown in the popup.
#[derive(Debug)]
pub enum ExchangeError {
    /// Request never produced a response (DNS, TLS, timeout, ...)
    Transport(String),

    /// Token endpoint answered with a non-2xx status
    Status(StatusCode),

    /// Token endpoint returned an OAuth error payload
    Provider {
        error: String,
        description: Option<String>,
    },

    /// Response body was neither a token nor an error
    MalformedResponse(String),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::Transport(msg) => write!(f, "GitHub token exchange failed: {}", msg),
            ExchangeError::Status(status) => {
                write!(f, "GitHub token exchange failed: {}", status.as_u16())
            }
            ExchangeError::Provider { .. } => {
                write!(f, "GitHub token error: {}", self.opener_message())
            }
            ExchangeError::MalformedResponse(msg) => {
                write!(f, "GitHub token exchange returned an invalid response: {}", msg)
            }
        }
    }
}

impl std::error::Error for ExchangeError {}

impl ExchangeError {
    /// Short message relayed to the opener window
    pub fn opener_message(&self) -> String {
        match self {
            ExchangeError::Transport(_) => "token_request_failed".to_string(),
            ExchangeError::Status(status) => format!("token_endpoint_status_{}", status.as_u16()),
            ExchangeError::Provider { error, description } => description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(error.as_str())
                .to_string(),
            ExchangeError::MalformedResponse(_) => "invalid_token_response".to_string(),
        }
    }
}

/// GitHub OAuth App client
pub struct GithubOAuthClient {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl GithubOAuthClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client_id = config
            .client_id()
            .ok_or_else(|| anyhow::anyhow!("GitHub client ID not configured"))?;
        let client_secret = config
            .client_secret()
            .ok_or_else(|| anyhow::anyhow!("GitHub client secret not configured"))?;

        let proxy = ProxyConfig::from_config(config);
        let http = build_client(proxy.as_ref(), config.request_timeout_secs, config.tls_backend)?;

        Ok(Self {
            http,
            token_url: config.token_url.clone(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Exchange an authorization code for an access token
    ///
    /// Single attempt, no retry.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, ExchangeError> {
        let payload = json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "code": code,
            "redirect_uri": redirect_uri,
        });

        let response = self
            .http
            .post(&self.token_url)
            .header(header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Token endpoint returned {}: {}", status, body);
            return Err(ExchangeError::Status(status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(TokenResponse::Success { access_token, .. }) if !access_token.is_empty() => {
                Ok(access_token)
            }
            Ok(TokenResponse::Success { .. }) => Err(ExchangeError::MalformedResponse(
                "empty access_token".to_string(),
            )),
            Ok(TokenResponse::Error {
                error,
                error_description,
            }) => Err(ExchangeError::Provider {
                error,
                description: error_description,
            }),
            Err(e) => Err(ExchangeError::MalformedResponse(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(token_url: String) -> Config {
        Config {
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            allowed_origins: Some("https://example.github.io".to_string()),
            token_url,
            ..Config::default()
        }
    }

    #[test]
    fn test_new_requires_credentials() {
        assert!(GithubOAuthClient::new(&Config::default()).is_err());
    }

    #[test]
    fn test_opener_message_prefers_description() {
        let err = ExchangeError::Provider {
            error: "bad_verification_code".to_string(),
            description: Some("The code passed is incorrect or expired.".to_string()),
        };
        assert_eq!(err.opener_message(), "The code passed is incorrect or expired.");

        let err = ExchangeError::Provider {
            error: "bad_verification_code".to_string(),
            description: None,
        };
        assert_eq!(err.opener_message(), "bad_verification_code");
        assert_eq!(err.to_string(), "GitHub token error: bad_verification_code");
    }

    #[test]
    fn test_status_display() {
        let err = ExchangeError::Status(StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "GitHub token exchange failed: 502");
        assert_eq!(err.opener_message(), "token_endpoint_status_502");
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(header_matcher("accept", "application/json"))
            .and(body_json(serde_json::json!({
                "client_id": "client-id",
                "client_secret": "client-secret",
                "code": "abc",
                "redirect_uri": "https://oauth.example.com/callback",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok123",
                "token_type": "bearer",
                "scope": "repo",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            GithubOAuthClient::new(&config(format!("{}/login/oauth/access_token", server.uri())))
                .unwrap();
        let token = client
            .exchange_code("abc", "https://oauth.example.com/callback")
            .await
            .unwrap();
        assert_eq!(token, "tok123");
    }

    #[tokio::test]
    async fn test_exchange_code_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "bad_verification_code",
            })))
            .mount(&server)
            .await;

        let client = GithubOAuthClient::new(&config(server.uri())).unwrap();
        let err = client.exchange_code("abc", "https://x/callback").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Provider { ref error, .. } if error == "bad_verification_code"));
    }

    #[tokio::test]
    async fn test_exchange_code_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = GithubOAuthClient::new(&config(server.uri())).unwrap();
        let err = client.exchange_code("abc", "https://x/callback").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_exchange_code_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("access_token=tok&scope=repo"))
            .mount(&server)
            .await;

        let client = GithubOAuthClient::new(&config(server.uri())).unwrap();
        let err = client.exchange_code("abc", "https://x/callback").await.unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_exchange_code_unreachable() {
        // Nothing listens on port 9 of the loopback in test environments
        let client = GithubOAuthClient::new(&config("http://127.0.0.1:9/token".to_string())).unwrap();
        let err = client.exchange_code("abc", "https://x/callback").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Transport(_)));
    }
}
