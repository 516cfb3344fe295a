use std::sync::Arc;

use feed_logging::feed_info;

use crate::{FeedError, FetchOutput, Fetcher};

/// Runs a [`Fetcher`] to completion from synchronous code.
pub struct PageLoader {
    runtime: tokio::runtime::Runtime,
    fetcher: Arc<dyn Fetcher>,
}

impl PageLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Result<Self, FeedError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("morsefeed-fetch")
            .enable_all()
            .build()?;
        Ok(Self { runtime, fetcher })
    }

    /// Blocks until `url` is fetched. Must not be called from async code.
    pub fn load(&self, url: &str) -> Result<FetchOutput, FeedError> {
        let output = self
            .runtime
            .block_on(self.fetcher.fetch(url))
            .map_err(|source| FeedError::Fetch {
                url: url.to_string(),
                source,
            })?;
        feed_info!("loaded {url}: {} bytes", output.metadata.byte_len);
        Ok(output)
    }
}
