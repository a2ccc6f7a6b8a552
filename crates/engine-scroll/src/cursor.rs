use crate::{
    error::CursorError,
    fetch::FetchCoordinator,
    window::{Located, Target, WindowCache},
};
use connectors::{
    codec::{FieldCodec, RowCodec},
    error::CodecError,
    source::RemoteSource,
};
use engine_config::settings::{mode::CursorMode, validated::ScrollSettings};
use engine_core::metrics::{FetchMetrics, FetchMetricsSnapshot};
use model::{
    core::value::Value,
    pagination::{bounds::ResultBounds, position::Position, request::RequestId},
    records::{batch::Batch, row::RowData},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Scrollable cursor over a result that a remote engine produces batch by
/// batch.
///
/// Navigation calls return `Ok(true)` when they land on a row and `Ok(false)`
/// when they park on a sentinel. Only one batch of rows is held at a time;
/// reading a column never fetches.
///
/// A cursor is driven by a single task. Calls take `&mut self`, so sharing one
/// between tasks needs an external lock.
pub struct ScrollCursor {
    cache: WindowCache,
    codec: Box<dyn RowCodec>,
    position: Position,
    mode: CursorMode,
    prefetch: bool,
    was_null: bool,
    closed: bool,
    broken: Option<String>,
}

impl ScrollCursor {
    /// Builds a cursor without touching the remote engine. Nothing is known
    /// about the result until the first navigation call, so an empty result
    /// still reports `is_before_first()` until then. Use
    /// [`ScrollCursor::open`] to learn it up front.
    pub fn new(
        source: Arc<dyn RemoteSource>,
        request_id: RequestId,
        settings: ScrollSettings,
    ) -> Self {
        let metrics = FetchMetrics::new();
        let fetcher = FetchCoordinator::new(source, request_id, &settings, metrics);

        ScrollCursor {
            cache: WindowCache::new(fetcher, settings.fetch_size()),
            codec: Box::new(FieldCodec),
            position: Position::BeforeFirst,
            mode: settings.cursor_mode(),
            prefetch: settings.prefetch_enabled(),
            was_null: false,
            closed: false,
            broken: None,
        }
    }

    /// Builds a cursor and materializes the first window, leaving the cursor
    /// before the first row. Afterwards an empty result is already known as
    /// such.
    pub async fn open(
        source: Arc<dyn RemoteSource>,
        request_id: RequestId,
        settings: ScrollSettings,
    ) -> Result<Self, CursorError> {
        let mut cursor = ScrollCursor::new(source, request_id, settings);
        let primed = cursor.cache.ensure(1).await;
        let has_rows = cursor.track(primed)?;
        debug!(request_id = %request_id, has_rows, "Cursor opened.");
        Ok(cursor)
    }

    /// Replaces the codec used to decode column values.
    pub fn with_codec(mut self, codec: Box<dyn RowCodec>) -> Self {
        self.codec = codec;
        self
    }

    // Navigation

    pub async fn next(&mut self) -> Result<bool, CursorError> {
        self.guard()?;
        match self.position {
            Position::BeforeFirst => self.land(Target::Row(1)).await,
            Position::OnRow(row) => self.land(Target::Row(row.saturating_add(1))).await,
            Position::AfterLast => Ok(false),
        }
    }

    pub async fn previous(&mut self) -> Result<bool, CursorError> {
        self.guard()?;
        match self.position {
            Position::BeforeFirst => Ok(false),
            Position::OnRow(row) => self.land(Target::Row(row - 1)).await,
            Position::AfterLast => self.land(Target::FromEnd(1)).await,
        }
    }

    /// Moves to row `n`; negative values count from the end (`-1` is the last
    /// row) and `0` parks the cursor before the first row.
    pub async fn absolute(&mut self, n: i64) -> Result<bool, CursorError> {
        self.guard()?;
        match n {
            0 => {
                self.park(Position::BeforeFirst);
                Ok(false)
            }
            n if n > 0 => self.land(Target::Row(n.unsigned_abs())).await,
            n => self.land(Target::FromEnd(n.unsigned_abs())).await,
        }
    }

    /// Moves `n` rows from the current one. Fails with a usage error when the
    /// cursor is not on a row.
    pub async fn relative(&mut self, n: i64) -> Result<bool, CursorError> {
        self.guard()?;
        let Position::OnRow(current) = self.position else {
            return Err(CursorError::Usage(format!(
                "relative({n}) needs a current row, cursor is {}",
                self.position
            )));
        };

        let target = if n < 0 {
            current.checked_sub(n.unsigned_abs()).unwrap_or(0)
        } else {
            current.saturating_add(n.unsigned_abs())
        };
        if target == 0 {
            self.park(Position::BeforeFirst);
            return Ok(false);
        }
        self.land(Target::Row(target)).await
    }

    pub async fn first(&mut self) -> Result<bool, CursorError> {
        self.absolute(1).await
    }

    pub async fn last(&mut self) -> Result<bool, CursorError> {
        self.absolute(-1).await
    }

    pub fn before_first(&mut self) -> Result<(), CursorError> {
        self.guard()?;
        self.park(Position::BeforeFirst);
        Ok(())
    }

    pub fn after_last(&mut self) -> Result<(), CursorError> {
        self.guard()?;
        self.park(Position::AfterLast);
        Ok(())
    }

    // Position

    pub fn position(&self) -> Position {
        self.position
    }

    /// Current row number, 0 when the cursor is not on a row.
    pub fn row(&self) -> u64 {
        if self.closed {
            return 0;
        }
        self.position.row().unwrap_or(0)
    }

    pub fn is_first(&self) -> bool {
        !self.closed && self.position == Position::OnRow(1)
    }

    /// True on the last row, as soon as the last row number is known.
    pub fn is_last(&self) -> bool {
        match self.position {
            Position::OnRow(row) => !self.closed && self.bounds().final_row == Some(row),
            _ => false,
        }
    }

    /// False for a result known to be empty: there is no first row to be before.
    pub fn is_before_first(&self) -> bool {
        !self.closed
            && self.position == Position::BeforeFirst
            && !self.bounds().is_empty_result()
    }

    pub fn is_after_last(&self) -> bool {
        !self.closed
            && self.position == Position::AfterLast
            && !self.bounds().is_empty_result()
    }

    pub fn bounds(&self) -> &ResultBounds {
        self.cache.bounds()
    }

    /// The batch currently held in memory, if any.
    pub fn window(&self) -> Option<&Batch> {
        self.cache.window()
    }

    // Row access

    pub fn current_record(&self) -> Result<&RowData, CursorError> {
        let (batch, row) = self.current()?;
        batch
            .row(row)
            .ok_or(CursorError::Codec(CodecError::RowNotInBatch(row)))
    }

    /// All values of the current row in column order; NULLs as [`Value::Null`].
    pub fn current_row(&self) -> Result<Vec<Value>, CursorError> {
        Ok(self.current_record()?.values())
    }

    /// Value of the 0-based `column` of the current row. A NULL comes back as
    /// [`Value::Null`] and sets [`ScrollCursor::was_null`].
    pub fn get(&mut self, column: usize) -> Result<Value, CursorError> {
        let (batch, row) = self.current()?;
        let value = self.codec.value_at(batch, row, column)?;
        let value = value.unwrap_or(Value::Null);
        self.was_null = value.is_null();
        Ok(value)
    }

    pub fn get_by_name(&mut self, name: &str) -> Result<Value, CursorError> {
        let column = self.find_column(name)?;
        self.get(column)
    }

    /// 0-based index of the column labelled `name`, ignoring ASCII case.
    pub fn find_column(&self, name: &str) -> Result<usize, CursorError> {
        let (batch, row) = self.current()?;
        self.codec
            .column_names(batch, row)?
            .iter()
            .position(|label| label.eq_ignore_ascii_case(name))
            .ok_or_else(|| CursorError::Codec(CodecError::UnknownColumn(name.to_string())))
    }

    /// Whether the last value read through [`ScrollCursor::get`] was NULL.
    pub fn was_null(&self) -> bool {
        self.was_null
    }

    // Settings and lifecycle

    pub fn fetch_size(&self) -> u32 {
        self.cache.fetch_size()
    }

    /// Changes the number of rows asked for by later fetches. The current
    /// window is kept.
    pub fn set_fetch_size(&mut self, fetch_size: u32) -> Result<(), CursorError> {
        self.guard()?;
        if fetch_size == 0 {
            return Err(CursorError::Usage("fetch size must be at least 1".to_string()));
        }
        self.cache.set_fetch_size(fetch_size);
        Ok(())
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub fn request_id(&self) -> RequestId {
        self.cache.fetcher().request_id()
    }

    pub fn metrics(&self) -> FetchMetricsSnapshot {
        self.cache.fetcher().metrics().snapshot()
    }

    /// Shared counters, still readable after the cursor is dropped.
    pub fn metrics_handle(&self) -> FetchMetrics {
        self.cache.fetcher().metrics().clone()
    }

    /// Releases the window and forgets any pending prefetch. Safe to call
    /// more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.cache.clear();
        self.closed = true;
        debug!(request_id = %self.request_id(), "Cursor closed.");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn guard(&self) -> Result<(), CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        match &self.broken {
            Some(reason) => Err(CursorError::Broken(reason.clone())),
            None => Ok(()),
        }
    }

    fn current(&self) -> Result<(&Batch, u64), CursorError> {
        self.guard()?;
        let Position::OnRow(row) = self.position else {
            return Err(CursorError::Usage(format!(
                "no current row, cursor is {}",
                self.position
            )));
        };
        match self.cache.window() {
            Some(batch) if batch.contains(row) => Ok((batch, row)),
            _ => Err(CursorError::Codec(CodecError::RowNotInBatch(row))),
        }
    }

    fn park(&mut self, position: Position) {
        self.position = position;
        self.was_null = false;
    }

    async fn land(&mut self, target: Target) -> Result<bool, CursorError> {
        let from = self.position;
        let located = self.cache.locate(target).await;
        let located = self.track(located)?;

        match located {
            Located::Row(row) => {
                self.park(Position::OnRow(row));
                let forward = match from {
                    Position::BeforeFirst => true,
                    Position::OnRow(previous) => row > previous,
                    Position::AfterLast => false,
                };
                if forward {
                    if self.prefetch {
                        self.cache.maybe_prefetch(row);
                    }
                } else if self.mode == CursorMode::ForwardOnly {
                    warn!(from = %from, to = row, "Backward move on a forward-only cursor.");
                }
                Ok(true)
            }
            Located::BeforeFirst => {
                self.park(Position::BeforeFirst);
                Ok(false)
            }
            Located::PastEnd => {
                self.park(Position::AfterLast);
                Ok(false)
            }
        }
    }

    /// Marks the cursor broken when a protocol violation comes through.
    fn track<T>(&mut self, result: Result<T, CursorError>) -> Result<T, CursorError> {
        if let Err(CursorError::ProtocolViolation(reason)) = &result {
            self.broken = Some(reason.clone());
            self.cache.clear();
        }
        result
    }
}
