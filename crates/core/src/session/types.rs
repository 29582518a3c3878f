use serde::{Deserialize, Serialize};

use super::SessionError;

/// Name of the Apple ID session cookie.
pub const MYACINFO: &str = "myacinfo";
/// Name of the Podcasts Connect team context cookie.
pub const ITCTX: &str = "itctx";

/// A single cookie as returned by the cookie service.
///
/// The service also reports domain, path, expiry and so on; only the
/// name and value are needed here.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Credentials required by the analytics API.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub myacinfo: String,
    pub itctx: String,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("myacinfo", &"<redacted>")
            .field("itctx", &"<redacted>")
            .finish()
    }
}

impl SessionTokens {
    /// Extract the required tokens from a cookie set.
    ///
    /// The first cookie with a matching name wins.
    pub fn from_cookies(cookies: &[SessionCookie]) -> Result<Self, SessionError> {
        Ok(Self {
            myacinfo: find_cookie(cookies, MYACINFO)?,
            itctx: find_cookie(cookies, ITCTX)?,
        })
    }
}

fn find_cookie(cookies: &[SessionCookie], name: &str) -> Result<String, SessionError> {
    cookies
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.value.clone())
        .ok_or_else(|| SessionError::MissingCredential(name.to_string()))
}
