use crate::records::batch::Batch;

/// Best known extent of the whole result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBounds {
    pub first_row: u64,
    /// Highest row number ever observed in a batch.
    pub last_known_row: Option<u64>,
    /// True last row, set once a batch reports finality. `Some(0)` means the
    /// result is empty.
    pub final_row: Option<u64>,
}

impl Default for ResultBounds {
    fn default() -> Self {
        ResultBounds {
            first_row: 1,
            last_known_row: None,
            final_row: None,
        }
    }
}

impl ResultBounds {
    pub fn observe(&mut self, batch: &Batch) {
        if !batch.is_empty() {
            let end = batch.end_row();
            self.last_known_row = Some(self.last_known_row.map_or(end, |known| known.max(end)));
        }
        if batch.is_final() {
            self.final_row = Some(batch.end_row());
        }
    }

    pub fn is_empty_result(&self) -> bool {
        self.final_row == Some(0)
    }

    /// `Some(true)` if `row` exists, `Some(false)` if it is known not to,
    /// `None` while finality has not been observed.
    pub fn has_row(&self, row: u64) -> Option<bool> {
        if row < self.first_row {
            return Some(false);
        }
        match (self.final_row, self.last_known_row) {
            (Some(last), _) => Some(row <= last),
            (None, Some(known)) if row <= known => Some(true),
            _ => None,
        }
    }
}
