//! OAuth Web Handler
//!
//! Runs the two halves of the authorization-code flow. Nothing is stored
//! server side; the state lives in a cookie on the user's browser.

use rand::Rng;

use crate::common::auth::constant_time_eq;
use crate::model::config::Config;

use super::error::OAuthError;
use super::github::GithubOAuthClient;
use super::types::*;

/// OAuth Web Handler
pub struct OAuthHandler {
    config: Config,
    allowed_origins: AllowedOrigins,
    github: GithubOAuthClient,
}

impl OAuthHandler {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let allowed_origins = config.origin_allow_list();
        let github = GithubOAuthClient::new(&config)?;
        Ok(Self {
            config,
            allowed_origins,
            github,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate a random 128-bit state, lowercase hex
    pub fn generate_state() -> String {
        let mut bytes = [0u8; 16];
        rand::rng().fill(&mut bytes);
        hex::encode(bytes)
    }

    /// Callback URL registered with the provider, `{origin}/callback`
    pub fn callback_url(own_origin: &str) -> String {
        format!("{}/callback", own_origin.trim_end_matches('/'))
    }

    /// Validate the requesting origin and build the provider redirect
    pub fn authorize(
        &self,
        candidate_origin: Option<&str>,
        own_origin: &str,
    ) -> Result<AuthorizeRedirect, OAuthError> {
        let origin = candidate_origin.filter(|o| !o.is_empty());

        match origin {
            Some(origin) if !self.allowed_origins.contains(origin) => {
                tracing::warn!("Rejected authorization from origin not in allow-list: {}", origin);
                return Err(OAuthError::ForbiddenOrigin(origin.to_string()));
            }
            None if self.config.require_origin => {
                tracing::warn!("Rejected authorization without origin");
                return Err(OAuthError::MissingOrigin);
            }
            _ => {}
        }

        let state = Self::generate_state();
        let location = self.authorize_location(&state, &Self::callback_url(own_origin));

        tracing::info!(
            "Starting GitHub authorization (origin: {})",
            origin.unwrap_or("<none>")
        );

        Ok(AuthorizeRedirect {
            location,
            state,
            origin: origin.map(str::to_string),
        })
    }

    fn authorize_location(&self, state: &str, callback_url: &str) -> String {
        let separator = if self.config.authorize_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{}client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.authorize_url,
            separator,
            urlencoding::encode(self.github.client_id()),
            urlencoding::encode(callback_url),
            urlencoding::encode(&self.config.scope),
            urlencoding::encode(state),
        )
    }

    /// Check the callback against the state cookie and exchange the code
    ///
    /// Returns `Err` for input errors (no upstream call is made). Exchange
    /// failures are an `Ok(CallbackOutcome::ExchangeFailed)`.
    pub async fn complete(
        &self,
        params: &CallbackParams,
        cookie_state: Option<&str>,
        bound_origin: Option<&str>,
        own_origin: &str,
    ) -> Result<CallbackOutcome, OAuthError> {
        let (code, state) = match (
            params.code.as_deref().filter(|c| !c.is_empty()),
            params.state.as_deref().filter(|s| !s.is_empty()),
        ) {
            (Some(code), Some(state)) => (code, state),
            _ => return Err(OAuthError::MissingCodeOrState),
        };

        match cookie_state {
            Some(expected) if constant_time_eq(expected, state) => {}
            Some(_) => {
                tracing::warn!("Callback state does not match state cookie");
                return Err(OAuthError::InvalidState);
            }
            None => {
                tracing::warn!("Callback without state cookie");
                return Err(OAuthError::InvalidState);
            }
        }

        let redirect_uri = Self::callback_url(own_origin);
        match self.github.exchange_code(code, &redirect_uri).await {
            Ok(access_token) => {
                let target_origin = self.target_origin(bound_origin);
                tracing::info!("GitHub authorization complete, posting token to {}", target_origin);
                Ok(CallbackOutcome::Authorized {
                    access_token,
                    target_origin,
                })
            }
            Err(e) => {
                tracing::error!("{}", e);
                Ok(CallbackOutcome::ExchangeFailed(e))
            }
        }
    }

    /// postMessage target for the token
    ///
    /// The origin that started the flow if it is still allow-listed, otherwise
    /// the first configured origin.
    pub fn target_origin(&self, bound_origin: Option<&str>) -> String {
        bound_origin
            .filter(|o| self.allowed_origins.contains(o))
            .or_else(|| self.allowed_origins.first())
            .unwrap_or_default()
            .to_string()
    }
}
