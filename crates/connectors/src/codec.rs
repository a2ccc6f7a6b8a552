use crate::error::CodecError;
use model::{core::value::Value, records::batch::Batch};

/// Turns the raw rows of a batch into column values.
pub trait RowCodec: Send + Sync {
    /// Value of `column` (0-based) on `row`. `Ok(None)` is a NULL.
    fn value_at(&self, batch: &Batch, row: u64, column: usize)
    -> Result<Option<Value>, CodecError>;

    /// Column labels of `row`, in column order.
    fn column_names(&self, batch: &Batch, row: u64) -> Result<Vec<String>, CodecError>;
}

/// Reads field values positionally, exactly as the engine shipped them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCodec;

impl RowCodec for FieldCodec {
    fn value_at(
        &self,
        batch: &Batch,
        row: u64,
        column: usize,
    ) -> Result<Option<Value>, CodecError> {
        let data = batch.row(row).ok_or(CodecError::RowNotInBatch(row))?;
        data.field_values
            .get(column)
            .map(|field| field.value.clone())
            .ok_or(CodecError::ColumnOutOfRange {
                index: column,
                count: data.column_count(),
            })
    }

    fn column_names(&self, batch: &Batch, row: u64) -> Result<Vec<String>, CodecError> {
        let data = batch.row(row).ok_or(CodecError::RowNotInBatch(row))?;
        Ok(data.field_values.iter().map(|f| f.name.clone()).collect())
    }
}
