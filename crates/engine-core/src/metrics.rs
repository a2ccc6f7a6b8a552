use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    fetches: AtomicU64,
    prefetches: AtomicU64,
    prefetch_hits: AtomicU64,
    prefetch_discards: AtomicU64,
    rows_fetched: AtomicU64,
    failures: AtomicU64,
    retries: AtomicU64,
}

/// Counters of remote traffic issued on behalf of one cursor.
///
/// Clones share the same counters, so a handle can be kept by the caller
/// while the cursor keeps updating it.
#[derive(Debug, Clone, Default)]
pub struct FetchMetrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchMetricsSnapshot {
    /// Remote calls issued because a navigation call needed the rows.
    pub fetches: u64,
    /// Speculative forward fetches launched.
    pub prefetches: u64,
    /// Demand fetches answered by an outstanding prefetch.
    pub prefetch_hits: u64,
    /// Prefetches dropped unread.
    pub prefetch_discards: u64,
    pub rows_fetched: u64,
    pub failures: u64,
    pub retries: u64,
}

impl FetchMetrics {
    pub fn new() -> Self {
        FetchMetrics::default()
    }

    pub fn increment_fetches(&self) {
        self.inner.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_prefetches(&self) {
        self.inner.prefetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_prefetch_hits(&self) {
        self.inner.prefetch_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_prefetch_discards(&self) {
        self.inner.prefetch_discards.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rows(&self, count: u64) {
        self.inner.rows_fetched.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_failures(&self) {
        self.inner.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retries(&self, count: u64) {
        self.inner.retries.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FetchMetricsSnapshot {
        FetchMetricsSnapshot {
            fetches: self.inner.fetches.load(Ordering::Relaxed),
            prefetches: self.inner.prefetches.load(Ordering::Relaxed),
            prefetch_hits: self.inner.prefetch_hits.load(Ordering::Relaxed),
            prefetch_discards: self.inner.prefetch_discards.load(Ordering::Relaxed),
            rows_fetched: self.inner.rows_fetched.load(Ordering::Relaxed),
            failures: self.inner.failures.load(Ordering::Relaxed),
            retries: self.inner.retries.load(Ordering::Relaxed),
        }
    }
}
