#![allow(dead_code)]

use async_trait::async_trait;
use connectors::{error::SourceError, memory::source::MemorySource, source::RemoteSource};
use engine_config::settings::validated::{ScrollSettings, ScrollSettingsBuilder};
use engine_scroll::ScrollCursor;
use model::{
    core::value::Value,
    pagination::request::RequestId,
    records::batch::Batch,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

pub const REQUEST: RequestId = RequestId(1);

/// Wraps a source and remembers every range it was asked for.
pub struct RecordingSource {
    inner: Arc<dyn RemoteSource>,
    calls: AtomicUsize,
    ranges: Mutex<Vec<(u64, u64)>>,
}

impl RecordingSource {
    pub fn new(inner: Arc<dyn RemoteSource>) -> Arc<Self> {
        Arc::new(RecordingSource {
            inner,
            calls: AtomicUsize::new(0),
            ranges: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn ranges(&self) -> Vec<(u64, u64)> {
        self.ranges.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteSource for RecordingSource {
    async fn fetch(
        &self,
        request_id: RequestId,
        begin_row: u64,
        end_row: u64,
    ) -> Result<Batch, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push((begin_row, end_row));
        self.inner.fetch(request_id, begin_row, end_row).await
    }
}

pub fn settings(fetch_size: u32, prefetch: bool) -> ScrollSettings {
    ScrollSettingsBuilder::new()
        .fetch_size(fetch_size)
        .prefetch(prefetch)
        .build()
        .unwrap()
}

/// A cursor over `source` whose remote calls are recorded.
pub fn recorded_cursor(
    source: MemorySource,
    fetch_size: u32,
    prefetch: bool,
) -> (Arc<RecordingSource>, ScrollCursor) {
    let recorder = RecordingSource::new(Arc::new(source));
    let cursor = ScrollCursor::new(recorder.clone(), REQUEST, settings(fetch_size, prefetch));
    (recorder, cursor)
}

/// Like [`recorded_cursor`], with the first window fetched up front.
pub async fn opened_cursor(
    source: MemorySource,
    fetch_size: u32,
    prefetch: bool,
) -> (Arc<RecordingSource>, ScrollCursor) {
    let recorder = RecordingSource::new(Arc::new(source));
    let cursor = ScrollCursor::open(recorder.clone(), REQUEST, settings(fetch_size, prefetch))
        .await
        .unwrap();
    (recorder, cursor)
}

/// Value of the single column of a sequence row.
pub fn current_n(cursor: &ScrollCursor) -> u64 {
    match cursor.current_row().unwrap().as_slice() {
        [Value::Uint(n)] => *n,
        other => panic!("Unexpected row: {other:?}"),
    }
}
