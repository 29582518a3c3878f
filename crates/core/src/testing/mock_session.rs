//! Mock session provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::session::{SessionCookie, SessionError, SessionProvider, SessionTokens};

#[derive(Debug, Clone)]
enum Reply {
    Cookies(Vec<SessionCookie>),
    Status { status: u16, body: String },
}

/// Mock implementation of the SessionProvider trait.
///
/// Either hands out a fixed cookie set (run through the same extraction as
/// the real client) or answers like a failing cookie service.
#[derive(Debug)]
pub struct MockSessionProvider {
    reply: Reply,
    calls: AtomicUsize,
}

impl MockSessionProvider {
    /// Provider returning `cookies`.
    pub fn with_cookies(cookies: Vec<SessionCookie>) -> Self {
        Self {
            reply: Reply::Cookies(cookies),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider whose cookie service answers with `status`.
    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            reply: Reply::Status {
                status,
                body: body.to_string(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    async fn get_session(&self) -> Result<SessionTokens, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            Reply::Cookies(cookies) => SessionTokens::from_cookies(cookies),
            Reply::Status { status, body } => Err(SessionError::CookieService {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
