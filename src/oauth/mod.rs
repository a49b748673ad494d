//! OAuth Web Authentication Module
//!
//! GitHub OAuth provider for Decap CMS, popup flow:
//! - `GET /auth` checks the origin, sets the state cookie, redirects to GitHub
//! - `GET /callback` checks the state, exchanges the code, posts the token to the opener

mod error;
mod github;
mod handler;
mod router;
mod templates;
mod types;

pub use handler::OAuthHandler;
pub use router::create_oauth_router;
pub use types::AllowedOrigins;
