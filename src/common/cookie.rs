//! Cookie helpers
//!
//! All cookies issued here are `Path=/; HttpOnly; Secure; SameSite=Lax`.

use axum::http::{HeaderMap, header};
use cookie::{Cookie, SameSite};

/// Read a cookie value from the request, percent-decoded
///
/// Looks at every `Cookie` header and returns the first pair named `name`.
/// Malformed pairs are skipped.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse_encoded(v))
        .filter_map(|c| match c {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::debug!("ignoring malformed cookie: {e}");
                None
            }
        })
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// `Set-Cookie` value for a session cookie
pub fn set_cookie(name: &str, value: &str) -> String {
    flow_cookie(name, value).build().encoded().to_string()
}

/// `Set-Cookie` value that expires `name` immediately
pub fn clear_cookie(name: &str) -> String {
    flow_cookie(name, "")
        .max_age(cookie::time::Duration::seconds(0))
        .build()
        .to_string()
}

fn flow_cookie(name: &str, value: &str) -> cookie::CookieBuilder<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Lax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    fn assert_flow_attributes(cookie: &Cookie<'_>) {
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_get_cookie_single() {
        let h = headers(&["decap_oauth_state=abc"]);
        assert_eq!(get_cookie(&h, "decap_oauth_state"), Some("abc".to_string()));
    }

    #[test]
    fn test_get_cookie_among_others() {
        let h = headers(&["theme=dark; decap_oauth_state=abc; other=1"]);
        assert_eq!(get_cookie(&h, "decap_oauth_state"), Some("abc".to_string()));
        assert_eq!(get_cookie(&h, "other"), Some("1".to_string()));
    }

    #[test]
    fn test_get_cookie_no_prefix_match() {
        let h = headers(&["xdecap_oauth_state=evil"]);
        assert_eq!(get_cookie(&h, "decap_oauth_state"), None);
    }

    #[test]
    fn test_get_cookie_multiple_headers() {
        let h = headers(&["a=1", "decap_oauth_origin=https%3A%2F%2Fa.example"]);
        assert_eq!(
            get_cookie(&h, "decap_oauth_origin"),
            Some("https://a.example".to_string())
        );
    }

    #[test]
    fn test_get_cookie_skips_malformed_pairs() {
        let h = headers(&["garbage; decap_oauth_state=abc"]);
        assert_eq!(get_cookie(&h, "decap_oauth_state"), Some("abc".to_string()));
    }

    #[test]
    fn test_get_cookie_missing() {
        assert_eq!(get_cookie(&HeaderMap::new(), "decap_oauth_state"), None);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let raw = set_cookie("decap_oauth_state", "0a1b");
        let cookie = Cookie::parse_encoded(raw).unwrap();
        assert_eq!(cookie.name(), "decap_oauth_state");
        assert_eq!(cookie.value(), "0a1b");
        assert_flow_attributes(&cookie);
        assert_eq!(cookie.max_age(), None);
        assert_eq!(cookie.expires(), None);
    }

    #[test]
    fn test_set_cookie_round_trips_encoded_value() {
        let raw = set_cookie("decap_oauth_origin", "https://a.example");
        let cookie = Cookie::parse_encoded(raw).unwrap();
        assert_eq!(cookie.value(), "https://a.example");
        assert_flow_attributes(&cookie);
    }

    #[test]
    fn test_clear_cookie() {
        let raw = clear_cookie("decap_oauth_state");
        assert!(raw.starts_with("decap_oauth_state=;"));
        let parsed = Cookie::parse(raw).unwrap();
        assert_eq!(parsed.value(), "");
        assert_eq!(parsed.max_age(), Some(cookie::time::Duration::ZERO));
        assert_flow_attributes(&parsed);
    }
}
