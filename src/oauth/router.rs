//! OAuth Web Router
//!
//! Defines routes for the Decap CMS GitHub OAuth flow

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, Method, StatusCode, header},
    response::{AppendHeaders, Html, IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::common::{cookie, request::external_origin};

use super::handler::OAuthHandler;
use super::templates;
use super::types::{
    AuthorizeParams, CallbackOutcome, CallbackParams, HealthResponse, ORIGIN_COOKIE, STATE_COOKIE,
};

/// OAuth state for handlers
#[derive(Clone)]
pub struct OAuthState {
    pub handler: Arc<OAuthHandler>,
}

/// Create OAuth router
///
/// # Endpoints
/// - `GET /` - Service health
/// - `GET /auth` - Redirect to the GitHub authorize page
/// - `GET /callback` - Exchange the code and hand the token to the opener
/// - `OPTIONS *` - CORS preflight
///
/// Other methods on the three routes get axum's 405.
pub fn create_oauth_router(handler: Arc<OAuthHandler>) -> Router {
    let state = OAuthState { handler };

    Router::new()
        .route("/", get(handle_health).options(handle_preflight))
        .route("/auth", get(handle_auth).options(handle_preflight))
        .route("/callback", get(handle_callback).options(handle_preflight))
        .fallback(handle_fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle health check (GET /)
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Handle start authentication (GET /auth)
async fn handle_auth(
    State(state): State<OAuthState>,
    Query(params): Query<AuthorizeParams>,
    headers: HeaderMap,
) -> Response {
    let candidate_origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .or(params.origin.as_deref());
    let own_origin = external_origin(&headers, state.handler.config());

    match state.handler.authorize(candidate_origin, &own_origin) {
        Ok(redirect) => {
            let origin_cookie = match &redirect.origin {
                Some(origin) => cookie::set_cookie(ORIGIN_COOKIE, origin),
                None => cookie::clear_cookie(ORIGIN_COOKIE),
            };
            (
                StatusCode::FOUND,
                [(header::LOCATION, redirect.location)],
                AppendHeaders([
                    (
                        header::SET_COOKIE,
                        cookie::set_cookie(STATE_COOKIE, &redirect.state),
                    ),
                    (header::SET_COOKIE, origin_cookie),
                ]),
                (),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Handle provider callback (GET /callback)
///
/// Every response clears the flow cookies so a state can only be used once.
/// An unparseable query counts as missing `code`/`state`.
async fn handle_callback(
    State(state): State<OAuthState>,
    query: Result<Query<CallbackParams>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(e) => {
            tracing::debug!("Rejected callback query: {}", e);
            CallbackParams::default()
        }
    };
    let cookie_state = cookie::get_cookie(&headers, STATE_COOKIE);
    let bound_origin = cookie::get_cookie(&headers, ORIGIN_COOKIE);
    let own_origin = external_origin(&headers, state.handler.config());

    let result = state
        .handler
        .complete(
            &params,
            cookie_state.as_deref(),
            bound_origin.as_deref(),
            &own_origin,
        )
        .await;

    match result {
        Ok(CallbackOutcome::Authorized {
            access_token,
            target_origin,
        }) => html_response(
            StatusCode::OK,
            templates::render_success_page(
                &access_token,
                &target_origin,
                &state.handler.config().redirect_url,
            ),
        ),
        Ok(CallbackOutcome::ExchangeFailed(e)) => html_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            templates::render_error_page(&e.to_string(), &e.opener_message()),
        ),
        Err(e) => (clear_flow_cookies(), e).into_response(),
    }
}

/// CORS preflight, answered the same way on every path
///
/// Hand-written because tower-http's `CorsLayer` answers preflights with 200, not 204.
async fn handle_preflight(headers: HeaderMap) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("*")
        .to_string();

    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, origin),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                "GET, OPTIONS".to_string(),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, Authorization".to_string(),
            ),
            (header::VARY, "Origin".to_string()),
        ],
    )
        .into_response()
}

/// Unknown paths: 404, except for preflight
async fn handle_fallback(method: Method, headers: HeaderMap) -> Response {
    if method == Method::OPTIONS {
        return handle_preflight(headers).await;
    }
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Not found",
    )
        .into_response()
}

fn clear_flow_cookies() -> AppendHeaders<[(header::HeaderName, String); 2]> {
    AppendHeaders([
        (header::SET_COOKIE, cookie::clear_cookie(STATE_COOKIE)),
        (header::SET_COOKIE, cookie::clear_cookie(ORIGIN_COOKIE)),
    ])
}

fn html_response(status: StatusCode, page: Result<String, askama::Error>) -> Response {
    match page {
        Ok(html) => (status, clear_flow_cookies(), Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render callback page: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                clear_flow_cookies(),
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "Internal error",
            )
                .into_response()
        }
    }
}
