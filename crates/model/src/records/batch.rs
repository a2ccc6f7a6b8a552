use crate::records::row::RowData;

/// A contiguous, 1-indexed slice of result rows returned by one remote fetch.
///
/// `rows[0]` is row `begin_row`. A batch is immutable once built; the window
/// cache owns it until a different window replaces it.
///
/// An empty batch is only meaningful when `is_final` is set: it states that
/// `begin_row - 1` is the last row of the whole result (0 for an empty result).
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    begin_row: u64,
    rows: Vec<RowData>,
    is_final: bool,
}

impl Batch {
    pub fn new(begin_row: u64, rows: Vec<RowData>, is_final: bool) -> Self {
        Batch {
            begin_row,
            rows,
            is_final,
        }
    }

    /// Final, row-less batch marking that the result ends right before `begin_row`.
    pub fn end_of_result(begin_row: u64) -> Self {
        Batch::new(begin_row, Vec::new(), true)
    }

    pub fn begin_row(&self) -> u64 {
        self.begin_row
    }

    /// Last row held by this batch; `begin_row - 1` when the batch is empty.
    pub fn end_row(&self) -> u64 {
        (self.begin_row + self.rows.len() as u64).saturating_sub(1)
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row: u64) -> bool {
        !self.rows.is_empty() && self.begin_row <= row && row <= self.end_row()
    }

    pub fn row(&self, row: u64) -> Option<&RowData> {
        if !self.contains(row) {
            return None;
        }
        self.rows.get((row - self.begin_row) as usize)
    }

    pub fn rows(&self) -> &[RowData] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{FieldValue, Value};

    fn rows(range: std::ops::RangeInclusive<u64>) -> Vec<RowData> {
        range
            .map(|n| RowData::new("t", vec![FieldValue::new("id", Some(Value::Uint(n)))]))
            .collect()
    }

    #[test]
    fn bounds_follow_row_count() {
        let batch = Batch::new(5, rows(5..=8), false);
        assert_eq!(batch.end_row(), 8);
        assert!(batch.contains(5) && batch.contains(8));
        assert!(!batch.contains(4) && !batch.contains(9));
        assert_eq!(batch.row(7).map(|r| r.get_value("id")), Some(Value::Uint(7)));
    }

    #[test]
    fn empty_final_batch_points_before_its_begin() {
        let batch = Batch::end_of_result(11);
        assert_eq!(batch.end_row(), 10);
        assert!(batch.is_final());
        assert!(!batch.contains(10) && !batch.contains(11));

        let empty_result = Batch::end_of_result(1);
        assert_eq!(empty_result.end_row(), 0);
    }
}
