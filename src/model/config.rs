use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::oauth::AllowedOrigins;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TlsBackend {
    Rustls,
    NativeTls,
}

impl Default for TlsBackend {
    fn default() -> Self {
        Self::Rustls
    }
}

/// OAuth provider configuration
///
/// Read from an optional JSON file and then overridden from the environment,
/// so the same variable names as a hosted worker deployment keep working.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// GitHub OAuth App client ID
    #[serde(default)]
    pub client_id: Option<String>,

    /// GitHub OAuth App client secret (never sent to the browser)
    #[serde(default)]
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,

    /// Comma-separated list of origins allowed to start a flow
    #[serde(default)]
    pub allowed_origins: Option<String>,

    /// Where the popup navigates after posting the token
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,

    #[serde(default = "default_scope")]
    pub scope: String,

    /// Externally visible base URL, e.g. https://oauth.example.com
    /// Derived from request headers when not set
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,

    /// Reject `/auth` requests that carry neither an Origin header nor an origin parameter
    #[serde(default)]
    pub require_origin: bool,

    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_tls_backend")]
    pub tls_backend: TlsBackend,

    /// HTTP proxy URL (optional)
    /// Supported formats: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// Proxy authentication username (optional)
    #[serde(default)]
    pub proxy_username: Option<String>,

    /// Proxy authentication password (optional)
    #[serde(default)]
    pub proxy_password: Option<String>,

    /// Upstream token exchange timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Config file path (runtime metadata, not written to JSON)
    #[serde(skip)]
    pub(crate) config_path: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_redirect_url() -> String {
    "/".to_string()
}

fn default_scope() -> String {
    "repo".to_string()
}

fn default_authorize_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_tls_backend() -> TlsBackend {
    TlsBackend::Rustls
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_id: None,
            client_secret: None,
            allowed_origins: None,
            redirect_url: default_redirect_url(),
            scope: default_scope(),
            public_url: None,
            require_origin: false,
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            tls_backend: default_tls_backend(),
            proxy_url: None,
            proxy_username: None,
            proxy_password: None,
            request_timeout_secs: default_request_timeout_secs(),
            config_path: None,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // Config file doesn't exist, return default config
            let mut config = Self::default();
            config.config_path = Some(path.to_path_buf());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get config file path (if available)
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Override fields from the process environment
    pub fn apply_env(self) -> anyhow::Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup`; empty values are ignored
    pub fn apply_env_with<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("HOST") {
            self.host = v;
        }
        if let Some(v) = get("PORT") {
            self.port = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", v))?;
        }
        if let Some(v) = get("GITHUB_CLIENT_ID") {
            self.client_id = Some(v);
        }
        if let Some(v) = get("GITHUB_CLIENT_SECRET") {
            self.client_secret = Some(v);
        }
        if let Some(v) = get("ALLOWED_ORIGINS") {
            self.allowed_origins = Some(v);
        }
        if let Some(v) = get("REDIRECT_URL") {
            self.redirect_url = v;
        }
        if let Some(v) = get("OAUTH_SCOPE") {
            self.scope = v;
        }
        if let Some(v) = get("PUBLIC_URL") {
            self.public_url = Some(v);
        }
        if let Some(v) = get("REQUIRE_ORIGIN") {
            self.require_origin = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => bail!("Invalid REQUIRE_ORIGIN value: {}", other),
            };
        }
        if let Some(v) = get("GITHUB_AUTHORIZE_URL") {
            self.authorize_url = v;
        }
        if let Some(v) = get("GITHUB_TOKEN_URL") {
            self.token_url = v;
        }
        Ok(self)
    }

    /// Check that everything needed to run a flow is present
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.client_id().is_none() {
            bail!("GitHub client ID not configured (clientId / GITHUB_CLIENT_ID)");
        }
        if self.client_secret().is_none() {
            bail!("GitHub client secret not configured (clientSecret / GITHUB_CLIENT_SECRET)");
        }
        if self.origin_allow_list().is_empty() {
            bail!("No allowed origins configured (allowedOrigins / ALLOWED_ORIGINS)");
        }
        Ok(())
    }

    pub fn client_id(&self) -> Option<&str> {
        non_blank(self.client_id.as_deref())
    }

    pub fn client_secret(&self) -> Option<&str> {
        non_blank(self.client_secret.as_deref())
    }

    /// Allowed origins in configured order
    pub fn origin_allow_list(&self) -> AllowedOrigins {
        AllowedOrigins::parse(self.allowed_origins.as_deref().unwrap_or_default())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
