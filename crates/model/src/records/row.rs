use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// One raw row of a result set, as shipped by the remote engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Values in column order, with NULLs rendered as [`Value::Null`].
    pub fn values(&self) -> Vec<Value> {
        self.field_values
            .iter()
            .map(|f| f.value.clone().unwrap_or(Value::Null))
            .collect()
    }

    pub fn column_count(&self) -> usize {
        self.field_values.len()
    }
}
