//! Deferred fetches.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::apple::ApiError;

/// Boxed future returned by a producer.
///
/// Matches the signature of the `async_trait` methods on
/// [`PodcastAnalytics`](crate::apple::PodcastAnalytics), so
/// `|| analytics.overview()` is a producer as-is.
pub type ProduceFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, ApiError>> + Send + 'a>>;

/// A fetch that has been described but not yet performed.
pub trait Producer<'a>: Send {
    /// Perform the fetch.
    fn produce(self) -> ProduceFuture<'a>;
}

impl<'a, F> Producer<'a> for F
where
    F: FnOnce() -> ProduceFuture<'a> + Send,
{
    fn produce(self) -> ProduceFuture<'a> {
        self()
    }
}
