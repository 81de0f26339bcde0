pub mod filter;
pub mod memory_store;
pub mod sqlite_store;
pub mod traits;

pub use filter::Filter;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use traits::RemoteStore;

use serde_json::{Map, Value};
use types::Collection;
use uuid::Uuid;

use crate::DatabaseError;

/// Ensures `row` is an object with a string `id`, generating one if missing.
/// Numeric ids are stored as strings so lookups by id are uniform.
pub(crate) fn identify(collection: Collection, mut row: Value) -> Result<(String, Value), DatabaseError> {
    let object = row
        .as_object_mut()
        .ok_or_else(|| DatabaseError::InvalidRow(collection, "row is not an object".to_string()))?;
    let id = match object.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        Some(other) => {
            return Err(DatabaseError::InvalidRow(
                collection,
                format!("unsupported id: {other}"),
            ))
        }
        None => Uuid::new_v4().to_string(),
    };
    object.insert("id".to_string(), Value::String(id.clone()));
    Ok((id, row))
}

/// Shallow merge of `patch`'s fields into `target`. The `id` field is never
/// overwritten.
pub(crate) fn merge_patch(
    collection: Collection,
    target: &mut Value,
    patch: &Value,
) -> Result<(), DatabaseError> {
    let patch = patch
        .as_object()
        .ok_or_else(|| DatabaseError::InvalidRow(collection, "patch is not an object".to_string()))?;
    let target = target
        .as_object_mut()
        .ok_or_else(|| DatabaseError::InvalidRow(collection, "stored row is not an object".to_string()))?;
    for (field, value) in patch.iter().filter(|(field, _)| field.as_str() != "id") {
        target.insert(field.clone(), value.clone());
    }
    Ok(())
}

pub(crate) fn empty_row(id: &str) -> Value {
    let mut row = Map::new();
    row.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identify_generates_missing_id() {
        let (id, row) = identify(Collection::Announcements, json!({"message": "hi"})).unwrap();
        assert_eq!(row["id"], Value::String(id));
    }

    #[test]
    fn test_identify_keeps_numeric_id() {
        let (id, row) = identify(Collection::Players, json!({"id": 42, "name": "Ann"})).unwrap();
        assert_eq!(id, "42");
        assert_eq!(row["id"], "42");
    }

    #[test]
    fn test_merge_patch_preserves_id_and_other_fields() {
        let mut row = json!({"id": "a", "score1": 1, "score2": 2});
        merge_patch(
            Collection::Results,
            &mut row,
            &json!({"id": "b", "score2": 9}),
        )
        .unwrap();
        assert_eq!(row, json!({"id": "a", "score1": 1, "score2": 9}));
    }
}
