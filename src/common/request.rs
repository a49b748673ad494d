//! Request metadata helpers

use axum::http::{HeaderMap, header};

use crate::model::config::Config;

/// The service's own externally visible origin, e.g. `https://oauth.example.com`
///
/// Prefers the configured public URL, then reverse proxy headers, then `Host`.
/// Falls back to the listen address when the request carries no host at all.
pub fn external_origin(headers: &HeaderMap, config: &Config) -> String {
    if let Some(url) = config.public_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    let scheme = first_value(headers, "x-forwarded-proto").unwrap_or("https");
    let host = first_value(headers, "x-forwarded-host")
        .or_else(|| first_value(headers, header::HOST.as_str()));

    match host {
        Some(host) => format!("{}://{}", scheme, host),
        None => format!("http://{}:{}", config.host, config.port),
    }
}

/// First comma-separated element of a header, trimmed
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
