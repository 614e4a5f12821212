//! Bounded-concurrency fan-out.

use crate::error::ApiError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Runs futures with at most `limit` of them in progress at once
///
/// Waiters are admitted in submission order (the semaphore is fair), and a task's future is not
/// polled until it holds a permit.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl ConcurrencyLimiter {
    /// A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run one future once a permit is free.
    pub async fn run<Fut>(&self, fut: Fut) -> Result<Fut::Output, ApiError>
    where
        Fut: Future,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ApiError::GenerationFailed("Concurrency limiter closed".to_string()))?;
        Ok(fut.await)
    }

    /// Submit every item before awaiting any, then wait for all of them.
    ///
    /// Results come back in submission order.
    pub async fn run_all<T, F, Fut>(
        &self,
        items: impl IntoIterator<Item = T>,
        task: F,
    ) -> Vec<Result<Fut::Output, ApiError>>
    where
        F: Fn(T) -> Fut,
        Fut: Future,
    {
        let mut pending = FuturesUnordered::new();
        for (index, item) in items.into_iter().enumerate() {
            let fut = task(item);
            pending.push(async move { (index, self.run(fut).await) });
        }

        let mut results = Vec::with_capacity(pending.len());
        while let Some(done) = pending.next().await {
            results.push(done);
        }
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}
