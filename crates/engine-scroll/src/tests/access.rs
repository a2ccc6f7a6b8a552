use super::utils::cursor;
use crate::error::CursorError;
use connectors::{error::CodecError, memory::source::MemorySource};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use std::sync::Arc;

fn people() -> Arc<MemorySource> {
    let rows = (1..=6u64)
        .map(|id| {
            let nickname = (id % 2 == 1).then(|| Value::String(format!("p{id}")));
            RowData::new(
                "people",
                vec![
                    FieldValue::new("id", Some(Value::Uint(id))),
                    FieldValue::new("nickname", nickname),
                ],
            )
        })
        .collect();
    Arc::new(MemorySource::new(rows))
}

#[tokio::test]
async fn reading_without_a_current_row_is_a_usage_error() {
    let source = people();
    let mut cursor = cursor(&source, 4);

    assert!(matches!(cursor.get(0), Err(CursorError::Usage(_))));
    assert!(matches!(cursor.current_row(), Err(CursorError::Usage(_))));

    cursor.after_last().unwrap();
    assert!(matches!(cursor.get(0), Err(CursorError::Usage(_))));
}

#[tokio::test]
async fn get_tracks_nulls_per_read() {
    let source = people();
    let mut cursor = cursor(&source, 4);

    cursor.absolute(2).await.unwrap();
    assert_eq!(cursor.get(0).unwrap(), Value::Uint(2));
    assert!(!cursor.was_null());
    assert_eq!(cursor.get(1).unwrap(), Value::Null);
    assert!(cursor.was_null());

    cursor.next().await.unwrap();
    assert!(!cursor.was_null());
    assert_eq!(cursor.get(1).unwrap(), Value::String("p3".to_string()));
    assert!(!cursor.was_null());
}

#[tokio::test]
async fn columns_resolve_by_label_ignoring_case() {
    let source = people();
    let mut cursor = cursor(&source, 4);

    cursor.last().await.unwrap();
    assert_eq!(cursor.find_column("NickName").unwrap(), 1);
    assert_eq!(cursor.get_by_name("ID").unwrap(), Value::Uint(6));

    assert!(matches!(
        cursor.find_column("email"),
        Err(CursorError::Codec(CodecError::UnknownColumn(_)))
    ));
    assert!(matches!(
        cursor.get(5),
        Err(CursorError::Codec(CodecError::ColumnOutOfRange { index: 5, count: 2 }))
    ));
}

#[tokio::test]
async fn current_row_renders_nulls_as_null_values() {
    let source = people();
    let mut cursor = cursor(&source, 4);

    cursor.absolute(4).await.unwrap();
    assert_eq!(
        cursor.current_row().unwrap(),
        vec![Value::Uint(4), Value::Null]
    );
    assert_eq!(cursor.current_record().unwrap().entity, "people");
}
