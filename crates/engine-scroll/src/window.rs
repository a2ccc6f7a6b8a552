use crate::{error::CursorError, fetch::FetchCoordinator};
use model::{
    pagination::{bounds::ResultBounds, request::FetchRequest},
    records::{batch::Batch, row::RowData},
};
use tracing::{debug, warn};

/// A row to materialize, either by number or counted back from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Row(u64),
    /// `FromEnd(1)` is the last row.
    FromEnd(u64),
}

/// Outcome of [`WindowCache::locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    /// The row exists and is held by the window.
    Row(u64),
    /// The target falls before row 1.
    BeforeFirst,
    /// The target falls after the last row.
    PastEnd,
}

/// Holds the single materialized batch of a cursor and the best known bounds
/// of the whole result.
///
/// A window is replaced wholesale whenever a row outside it is needed; the
/// previous batch is dropped, never kept. Every call that fetches stages its
/// batches and bounds locally and commits them only if it succeeds, so a
/// failed call leaves the cache exactly as it was.
pub struct WindowCache {
    window: Option<Batch>,
    bounds: ResultBounds,
    fetch_size: u32,
    fetcher: FetchCoordinator,
}

impl WindowCache {
    pub fn new(fetcher: FetchCoordinator, fetch_size: u32) -> Self {
        WindowCache {
            window: None,
            bounds: ResultBounds::default(),
            fetch_size: fetch_size.max(1),
            fetcher,
        }
    }

    pub fn contains(&self, row: u64) -> bool {
        self.window.as_ref().is_some_and(|window| window.contains(row))
    }

    pub fn window(&self) -> Option<&Batch> {
        self.window.as_ref()
    }

    pub fn bounds(&self) -> &ResultBounds {
        &self.bounds
    }

    pub fn row(&self, row: u64) -> Option<&RowData> {
        self.window.as_ref().and_then(|window| window.row(row))
    }

    pub fn fetch_size(&self) -> u32 {
        self.fetch_size
    }

    /// Applies to fetches issued from now on; the current window is kept.
    pub fn set_fetch_size(&mut self, fetch_size: u32) {
        self.fetch_size = fetch_size.max(1);
    }

    pub fn fetcher(&self) -> &FetchCoordinator {
        &self.fetcher
    }

    /// Makes `row` available. `Ok(false)` means the row lies past the end of
    /// the result (or is row 0); that is not an error.
    pub async fn ensure(&mut self, row: u64) -> Result<bool, CursorError> {
        Ok(matches!(self.locate(Target::Row(row)).await?, Located::Row(_)))
    }

    /// Discovers the last row number by scanning forward until a batch
    /// reports finality. Returns 0 for an empty result.
    pub async fn resolve_total(&mut self) -> Result<u64, CursorError> {
        if let Some(last) = self.bounds.final_row {
            return Ok(last);
        }
        self.locate(Target::FromEnd(1)).await?;
        Ok(self.bounds.final_row.unwrap_or_default())
    }

    /// Materializes `target`, fetching as many times as needed.
    ///
    /// Forward gaps are filled from the window's end in fetch-size steps,
    /// backward gaps with one range ending right before the window. A short
    /// batch simply moves the window and the loop continues from the new
    /// boundary.
    pub async fn locate(&mut self, target: Target) -> Result<Located, CursorError> {
        let mut bounds = self.bounds.clone();
        let mut staged: Option<Batch> = None;
        let size = u64::from(self.fetch_size);

        let located = loop {
            let window = staged.as_ref().or(self.window.as_ref());

            let row = match target {
                Target::Row(row) => row,
                Target::FromEnd(offset) => match bounds.final_row {
                    Some(last) => (last + 1).saturating_sub(offset),
                    None => {
                        let request = forward_from(window, size);
                        let batch = self.fetch_checked(request, &bounds).await?;
                        bounds.observe(&batch);
                        if !batch.is_empty() {
                            staged = Some(batch);
                        }
                        continue;
                    }
                },
            };

            if row == 0 {
                break Located::BeforeFirst;
            }
            if bounds.has_row(row) == Some(false) {
                break Located::PastEnd;
            }
            if window.is_some_and(|window| window.contains(row)) {
                break Located::Row(row);
            }

            let request = plan(window, row, size);
            let batch = self.fetch_checked(request, &bounds).await?;
            bounds.observe(&batch);
            if !batch.is_empty() {
                staged = Some(batch);
            }
        };

        if let Some(batch) = staged {
            debug!(
                begin = batch.begin_row(),
                end = batch.end_row(),
                is_final = batch.is_final(),
                "Window replaced."
            );
            self.window = Some(batch);
        }
        self.bounds = bounds;

        Ok(located)
    }

    /// Launches a speculative fetch of the next forward range when `row` is
    /// the trigger row of a window that is not the last one. Returns whether
    /// a prefetch was launched.
    pub fn maybe_prefetch(&mut self, row: u64) -> bool {
        let Some(window) = self.window.as_ref() else {
            return false;
        };
        if window.is_final() || self.bounds.final_row.is_some() {
            return false;
        }
        if row != trigger_row(window) {
            return false;
        }

        let next = forward_from(Some(window), u64::from(self.fetch_size));
        if let Some(pending) = self.fetcher.pending_request() {
            if pending.covers(&next) {
                return false;
            }
            self.fetcher.discard_pending();
        }
        self.fetcher.prefetch(next)
    }

    /// Drops the window and any outstanding prefetch. Bounds are kept.
    pub fn clear(&mut self) {
        self.window = None;
        self.fetcher.discard_pending();
    }

    async fn fetch_checked(
        &mut self,
        request: FetchRequest,
        bounds: &ResultBounds,
    ) -> Result<Batch, CursorError> {
        let batch = self.fetcher.fetch(request).await?;
        if let Err(reason) = check_batch(&request, &batch, bounds) {
            warn!(
                request = %request,
                reason = %reason,
                "Remote engine broke the fetch contract."
            );
            return Err(CursorError::ProtocolViolation(reason));
        }
        Ok(batch)
    }
}

/// Row whose arrival launches the prefetch: the second-to-last of the window,
/// which leaves one row of movement for the round trip to complete.
pub fn trigger_row(window: &Batch) -> u64 {
    window.end_row().saturating_sub(1).max(window.begin_row())
}

fn forward_from(window: Option<&Batch>, size: u64) -> FetchRequest {
    match window {
        Some(window) => FetchRequest::forward(window.end_row() + 1, window.end_row() + size),
        None => FetchRequest::forward(1, size),
    }
}

/// Range to request so that `row`, currently outside `window`, gets covered.
///
/// A backward gap is asked for as one range ending right before the window.
/// A server that answers it short returns the head of that range, so `row`
/// can stay uncovered; the next round then sees `row` past the new window
/// and continues forward from there. One step back can therefore cost two
/// fetches when the server chunk is smaller than the fetch size: from a
/// window `[9, 10]` with size 4 and chunk 3, row 8 is fetched as `[5, 8]`
/// (answered `[5, 7]`) and then `[8, 11]`.
fn plan(window: Option<&Batch>, row: u64, size: u64) -> FetchRequest {
    match window {
        Some(window) if row < window.begin_row() => {
            let begin = (row + 1).saturating_sub(size).max(1);
            FetchRequest::backward(begin, window.begin_row() - 1)
        }
        _ => forward_from(window, size),
    }
}

fn check_batch(
    request: &FetchRequest,
    batch: &Batch,
    bounds: &ResultBounds,
) -> Result<(), String> {
    if batch.begin_row() == 0 {
        return Err(format!("batch for {request} starts at row 0"));
    }

    if batch.is_empty() {
        if !batch.is_final() {
            return Err(format!("empty batch for {request} without finality"));
        }
        if batch.begin_row() != request.begin_row {
            return Err(format!(
                "end-of-result marker at row {} does not match {request}",
                batch.begin_row()
            ));
        }
    } else if !request.overlaps(batch.begin_row(), batch.end_row()) {
        return Err(format!(
            "batch [{}, {}] does not overlap {request}",
            batch.begin_row(),
            batch.end_row()
        ));
    }

    if batch.is_final()
        && let Some(known) = bounds.last_known_row
        && batch.end_row() < known
    {
        return Err(format!(
            "final row {} contradicts already observed row {known}",
            batch.end_row()
        ));
    }
    if let Some(last) = bounds.final_row
        && batch.end_row() > last
    {
        return Err(format!(
            "batch ends at row {} past the final row {last}",
            batch.end_row()
        ));
    }

    Ok(())
}
