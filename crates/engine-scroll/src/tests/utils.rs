use crate::ScrollCursor;
use connectors::memory::source::MemorySource;
use engine_config::settings::validated::{ScrollSettings, ScrollSettingsBuilder};
use model::pagination::request::RequestId;
use std::sync::Arc;

pub const REQ: RequestId = RequestId(42);

pub fn settings(fetch_size: u32, prefetch: bool) -> ScrollSettings {
    ScrollSettingsBuilder::new()
        .fetch_size(fetch_size)
        .prefetch(prefetch)
        .build()
        .unwrap()
}

/// Cursor without prefetch, so every remote call is a demand fetch.
pub fn cursor(source: &Arc<MemorySource>, fetch_size: u32) -> ScrollCursor {
    ScrollCursor::new(source.clone(), REQ, settings(fetch_size, false))
}

pub fn ranges(source: &MemorySource) -> Vec<(u64, u64)> {
    source
        .served()
        .iter()
        .map(|range| (range.begin_row, range.end_row))
        .collect()
}
