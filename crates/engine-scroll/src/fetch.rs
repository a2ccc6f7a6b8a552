use crate::error::CursorError;
use connectors::{error::SourceError, source::RemoteSource};
use engine_config::settings::validated::ScrollSettings;
use engine_core::{
    metrics::FetchMetrics,
    retry::{RetryPolicy, classify_source_error},
};
use model::{
    pagination::request::{FetchRequest, RequestId},
    records::batch::Batch,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

/// Everything needed to issue one remote call, detached from the coordinator
/// so a prefetch task can own a copy.
#[derive(Clone)]
struct RemoteCall {
    source: Arc<dyn RemoteSource>,
    request_id: RequestId,
    retry: RetryPolicy,
    timeout: Option<Duration>,
    metrics: FetchMetrics,
}

impl RemoteCall {
    async fn execute(&self, request: FetchRequest) -> Result<Batch, SourceError> {
        let start = Instant::now();

        let outcome = self
            .retry
            .run(
                || {
                    let source = self.source.clone();
                    let request_id = self.request_id;
                    let timeout = self.timeout;
                    async move {
                        let call = source.fetch(request_id, request.begin_row, request.end_row);
                        match timeout {
                            Some(limit) => match tokio::time::timeout(limit, call).await {
                                Ok(result) => result,
                                Err(_) => Err(SourceError::Timeout(limit)),
                            },
                            None => call.await,
                        }
                    }
                },
                classify_source_error,
            )
            .await;

        if outcome.retries() > 0 {
            self.metrics.increment_retries(outcome.retries() as u64);
        }

        match outcome.result {
            Ok(batch) => {
                self.metrics.increment_rows(batch.len() as u64);
                debug!(
                    request_id = %self.request_id,
                    direction = %request.direction,
                    begin = request.begin_row,
                    end = request.end_row,
                    rows = batch.len(),
                    is_final = batch.is_final(),
                    took_ms = start.elapsed().as_millis() as u64,
                    "Fetched batch."
                );
                Ok(batch)
            }
            Err(err) => {
                self.metrics.increment_failures();
                Err(err.into_inner())
            }
        }
    }
}

struct PendingFetch {
    request: FetchRequest,
    handle: JoinHandle<Result<Batch, SourceError>>,
}

/// Issues remote fetches for one cursor and hides latency with a single
/// speculative forward prefetch.
///
/// At most one demand fetch is in flight at a time because every demand fetch
/// is awaited by the navigation call that needs it. The prefetch slot is the
/// only request that may run alongside it.
pub struct FetchCoordinator {
    call: RemoteCall,
    pending: Option<PendingFetch>,
}

impl FetchCoordinator {
    pub fn new(
        source: Arc<dyn RemoteSource>,
        request_id: RequestId,
        settings: &ScrollSettings,
        metrics: FetchMetrics,
    ) -> Self {
        FetchCoordinator {
            call: RemoteCall {
                source,
                request_id,
                retry: settings.retry_policy(),
                timeout: settings.fetch_timeout(),
                metrics,
            },
            pending: None,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.call.request_id
    }

    pub fn metrics(&self) -> &FetchMetrics {
        &self.call.metrics
    }

    /// Fetches `request`, reusing an outstanding prefetch when its range
    /// covers the request. A prefetch that does not cover it is dropped unread.
    pub async fn fetch(&mut self, request: FetchRequest) -> Result<Batch, CursorError> {
        if let Some(pending) = self.pending.take() {
            if pending.request.covers(&request) {
                match pending.handle.await {
                    Ok(Ok(batch)) => {
                        self.call.metrics.increment_prefetch_hits();
                        debug!(
                            prefetched = %pending.request,
                            requested = %request,
                            "Prefetch consumed."
                        );
                        return Ok(batch);
                    }
                    Ok(Err(err)) => {
                        warn!(
                            prefetched = %pending.request,
                            error = %err,
                            "Prefetch failed; fetching on demand."
                        );
                    }
                    Err(err) => {
                        warn!(
                            prefetched = %pending.request,
                            error = %err,
                            "Prefetch task aborted; fetching on demand."
                        );
                    }
                }
            } else {
                self.drop_pending(pending);
            }
        }

        self.call.metrics.increment_fetches();
        self.call
            .execute(request)
            .await
            .map_err(|source| CursorError::FetchFailed {
                begin: request.begin_row,
                end: request.end_row,
                source,
            })
    }

    /// Launches `request` in the background. Returns `false` when a prefetch
    /// is already outstanding or no tokio runtime is available.
    pub fn prefetch(&mut self, request: FetchRequest) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            return false;
        };

        let call = self.call.clone();
        let handle = runtime.spawn(async move { call.execute(request).await });
        self.call.metrics.increment_prefetches();
        debug!(request = %request, "Prefetch launched.");
        self.pending = Some(PendingFetch { request, handle });
        true
    }

    pub fn pending_request(&self) -> Option<FetchRequest> {
        self.pending.as_ref().map(|pending| pending.request)
    }

    /// Forgets the outstanding prefetch. The task is not cancelled; it runs to
    /// completion and its batch is dropped.
    pub fn discard_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.drop_pending(pending);
        }
    }

    fn drop_pending(&self, pending: PendingFetch) {
        self.call.metrics.increment_prefetch_discards();
        debug!(request = %pending.request, "Prefetch discarded.");
        drop(pending.handle);
    }
}
