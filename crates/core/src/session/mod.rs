//! Session bootstrap.
//!
//! A run starts by asking the remote cookie service for a logged-in Apple
//! session. The service drives a real browser, so the request can take
//! minutes. There is exactly one attempt per run: any failure here aborts
//! the run before a single analytics call is made.

mod cookie_service;
mod types;

pub use cookie_service::CookieServiceClient;
pub use types::{SessionCookie, SessionTokens, ITCTX, MYACINFO};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while bootstrapping a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The cookie service answered with a non-success status.
    #[error("Failed to get cookies: {status} - {body}")]
    CookieService { status: u16, body: String },

    /// A required cookie is absent from the returned set.
    #[error("Missing required credential: {0}")]
    MissingCredential(String),

    /// The cookie service could not be reached.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not a cookie list.
    #[error("Failed to parse cookie response: {0}")]
    Parse(String),
}

/// Source of session tokens for one run.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Obtain the tokens needed to talk to the analytics API.
    async fn get_session(&self) -> Result<SessionTokens, SessionError>;
}
