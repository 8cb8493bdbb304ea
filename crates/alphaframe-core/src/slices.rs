//! Concurrent download of multi-slice endpoints.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::endpoint::RequestDescriptor;
use crate::fetcher::ResilientFetcher;
use crate::http_client::RawResponse;
use crate::AlphaError;

/// Default worker count: one less than the available cores, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|cores| cores.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

/// Fans descriptors out to at most `max_workers` concurrent tasks and
/// returns the responses in the order the descriptors were given.
///
/// Every slice runs to completion, including its own retries, before the
/// first failure in declared order is reported.
#[derive(Debug, Clone)]
pub struct ParallelSliceFetcher {
    fetcher: ResilientFetcher,
    max_workers: usize,
}

impl ParallelSliceFetcher {
    pub fn new(fetcher: ResilientFetcher) -> Self {
        Self {
            fetcher,
            max_workers: default_workers(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub async fn fetch_slices(
        &self,
        descriptors: &[RequestDescriptor],
        use_proxy: bool,
    ) -> Result<Vec<RawResponse>, AlphaError> {
        let permits = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let permits = Arc::clone(&permits);
            let url = descriptor.url.clone();
            let label = descriptor
                .slice
                .map_or_else(|| format!("#{index}"), |slice| slice.to_string());

            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        debug!(slice = %label, "slice started");
                        fetcher.fetch(&url, use_proxy).await
                    }
                    Err(_) => Err(AlphaError::transport("slice worker pool closed")),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<RawResponse, AlphaError>>> =
            std::iter::repeat_with(|| None).take(descriptors.len()).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(join_error) => error!(error = %join_error, "slice task aborted"),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(result) => result,
                None => Err(AlphaError::transport(format!("slice #{index} did not complete"))),
            })
            .collect()
    }
}
