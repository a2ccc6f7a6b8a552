use crate::{error::SourceError, source::RemoteSource};
use async_trait::async_trait;
use model::{
    core::value::{FieldValue, Value},
    pagination::request::RequestId,
    records::{batch::Batch, row::RowData},
};
use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tracing::debug;

/// A range the source was asked for, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServedRange {
    pub request_id: RequestId,
    pub begin_row: u64,
    pub end_row: u64,
}

/// In-process stand-in for a remote query engine holding one materialized result.
///
/// The knobs reproduce what a real server is allowed to do: answer with
/// fewer rows than asked (`chunk`), take a while (`latency`), fail, or only
/// report finality on a trailing empty batch (`deferred_finality`).
pub struct MemorySource {
    rows: Vec<RowData>,
    chunk: Option<usize>,
    latency: Option<Duration>,
    deferred_finality: bool,
    failures_left: AtomicUsize,
    served: Mutex<Vec<ServedRange>>,
}

impl MemorySource {
    pub fn new(rows: Vec<RowData>) -> Self {
        MemorySource {
            rows,
            chunk: None,
            latency: None,
            deferred_finality: false,
            failures_left: AtomicUsize::new(0),
            served: Mutex::new(Vec::new()),
        }
    }

    /// A single-column result whose rows hold the values `1..=count`.
    pub fn sequence(count: u64) -> Self {
        let rows = (1..=count)
            .map(|n| RowData::new("seq", vec![FieldValue::new("n", Some(Value::Uint(n)))]))
            .collect();
        MemorySource::new(rows)
    }

    /// Caps every answer at `chunk` rows, like a server with its own batch size.
    pub fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = Some(chunk.max(1));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Never flags a non-empty batch as final; the end of the result is only
    /// reported by an empty batch right after the last row.
    pub fn with_deferred_finality(mut self) -> Self {
        self.deferred_finality = true;
        self
    }

    /// Makes the next `count` calls fail with a transport error.
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }

    /// Every range answered (or failed) so far.
    pub fn served(&self) -> Vec<ServedRange> {
        self.served
            .lock()
            .map(|served| served.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.served.lock().map(|served| served.len()).unwrap_or(0)
    }

    fn record(&self, range: ServedRange) {
        if let Ok(mut served) = self.served.lock() {
            served.push(range);
        }
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }

    fn slice(&self, begin_row: u64, end_row: u64) -> Batch {
        let total = self.row_count();
        if begin_row > total {
            return Batch::end_of_result(begin_row);
        }

        let mut last = end_row.min(total);
        if let Some(chunk) = self.chunk {
            last = last.min(begin_row + chunk as u64 - 1);
        }

        let rows = self.rows[(begin_row - 1) as usize..last as usize].to_vec();
        let is_final = last == total && !self.deferred_finality;
        Batch::new(begin_row, rows, is_final)
    }
}

#[async_trait]
impl RemoteSource for MemorySource {
    async fn fetch(
        &self,
        request_id: RequestId,
        begin_row: u64,
        end_row: u64,
    ) -> Result<Batch, SourceError> {
        self.record(ServedRange {
            request_id,
            begin_row,
            end_row,
        });

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.take_failure() {
            return Err(SourceError::Transport(format!(
                "injected failure for rows {begin_row}..={end_row}"
            )));
        }

        if begin_row == 0 || end_row < begin_row {
            return Err(SourceError::Other(format!(
                "Invalid row range {begin_row}..={end_row}"
            )));
        }

        let batch = self.slice(begin_row, end_row);
        debug!(
            request_id = %request_id,
            begin = begin_row,
            end = end_row,
            rows = batch.len(),
            is_final = batch.is_final(),
            "Served range."
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQ: RequestId = RequestId(7);

    #[tokio::test]
    async fn answers_ranges_and_flags_the_last_batch() {
        let source = MemorySource::sequence(10);

        let head = source.fetch(REQ, 1, 4).await.unwrap();
        assert_eq!((head.begin_row(), head.end_row()), (1, 4));
        assert!(!head.is_final());

        let tail = source.fetch(REQ, 9, 12).await.unwrap();
        assert_eq!((tail.begin_row(), tail.end_row()), (9, 10));
        assert!(tail.is_final());

        let past = source.fetch(REQ, 11, 14).await.unwrap();
        assert!(past.is_empty() && past.is_final());
        assert_eq!(past.end_row(), 10);
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn chunk_limit_produces_short_batches() {
        let source = MemorySource::sequence(10).with_chunk(3);
        let batch = source.fetch(REQ, 2, 9).await.unwrap();
        assert_eq!((batch.begin_row(), batch.end_row()), (2, 4));
        assert!(!batch.is_final());
    }

    #[tokio::test]
    async fn deferred_finality_reports_end_with_empty_batch() {
        let source = MemorySource::sequence(4).with_deferred_finality();
        let batch = source.fetch(REQ, 1, 4).await.unwrap();
        assert!(!batch.is_final());
        let end = source.fetch(REQ, 5, 8).await.unwrap();
        assert!(end.is_empty() && end.is_final());
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let source = MemorySource::sequence(4);
        source.fail_next(1);
        assert!(matches!(
            source.fetch(REQ, 1, 2).await,
            Err(SourceError::Transport(_))
        ));
        assert!(source.fetch(REQ, 1, 2).await.is_ok());
        assert_eq!(source.served().len(), 2);
    }

    #[tokio::test]
    async fn empty_result_answers_with_end_marker() {
        let source = MemorySource::sequence(0);
        let batch = source.fetch(REQ, 1, 4).await.unwrap();
        assert!(batch.is_empty() && batch.is_final());
        assert_eq!(batch.end_row(), 0);
    }
}
