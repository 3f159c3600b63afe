pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Retrieves the raw bytes of a feed document.
///
/// Implementations must treat transport errors, non-success statuses and
/// empty bodies as errors; the cache layer decides how to fall back.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
