//! Partial record updates
//!
//! A patch is a JSON object merged into the record's top-level fields.
//! Later values win per field; nested objects are replaced, not merged.

use crate::document::Record;
use crate::{Error, Result};
use serde_json::{Map, Value};

pub type Patch = Map<String, Value>;

/// Parse a patch from JSON text. Only objects are accepted.
pub fn parse(text: &str) -> Result<Patch> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidPatch(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Merge `patch` into `record`, returning the updated copy
///
/// The result must still be a valid record and keep the original key.
/// Keys the record type does not model are carried in its `extra` map.
pub fn apply<T: Record>(record: &T, patch: &Patch) -> Result<T> {
    let mut fields = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        _ => return Err(Error::InvalidPatch(format!("{} is not an object", T::KIND))),
    };

    for (key, value) in patch {
        fields.insert(key.clone(), value.clone());
    }

    let updated: T = serde_json::from_value(Value::Object(fields))
        .map_err(|e| Error::InvalidPatch(e.to_string()))?;

    if updated.id() != record.id() {
        return Err(Error::InvalidId(format!(
            "cannot change {} key {} to {}",
            T::KIND,
            record.id(),
            updated.id()
        )));
    }

    Ok(updated)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Bom, Material, MaterialStatus};
    use serde_json::json;

    fn material() -> Material {
        Material {
            id: "NVL-007".to_string(),
            name: "Đệm ngòi".to_string(),
            current_stock: 15,
            min_stock: 100,
            status: MaterialStatus::LowStock,
            ..Default::default()
        }
    }

    fn patch(value: Value) -> Patch {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_apply_overwrites_only_named_fields() {
        let updated = apply(&material(), &patch(json!({"currentStock": 515, "status": "active"}))).unwrap();
        assert_eq!(updated.current_stock, 515);
        assert_eq!(updated.status, MaterialStatus::Active);
        assert_eq!(updated.name, "Đệm ngòi");
        assert_eq!(updated.min_stock, 100);
    }

    #[test]
    fn test_apply_keeps_unknown_keys() {
        let updated = apply(&material(), &patch(json!({"department": "Kho A"}))).unwrap();
        assert_eq!(updated.extra["department"], "Kho A");
        assert_eq!(updated.current_stock, 15);

        let again = apply(&updated, &patch(json!({"minStock": 50}))).unwrap();
        assert_eq!(again.extra["department"], "Kho A");
    }

    #[test]
    fn test_nested_values_replaced_whole() {
        let mut original = material();
        original.properties.insert("material".into(), json!("Cao su NBR"));
        original.properties.insert("diameter".into(), json!("2mm"));

        let updated = apply(&original, &patch(json!({"properties": {"diameter": "3mm"}}))).unwrap();
        assert_eq!(updated.properties.len(), 1);
        assert_eq!(updated.properties["diameter"], json!("3mm"));
    }

    #[test]
    fn test_apply_rejects_key_change() {
        let err = apply(&material(), &patch(json!({"id": "NVL-999"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidId(_)));

        let bom = Bom {
            product_id: "SP-001".into(),
            ..Default::default()
        };
        let err = apply(&bom, &patch(json!({"productId": "SP-002"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidId(_)));
    }

    #[test]
    fn test_apply_rejects_ill_typed_field() {
        let err = apply(&material(), &patch(json!({"currentStock": "lots"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidPatch(_)));
    }

    #[test]
    fn test_parse_requires_object() {
        assert!(parse(r#"{"name": "x"}"#).is_ok());
        assert!(matches!(parse("[1]"), Err(Error::InvalidPatch(_))));
        assert!(matches!(parse("{"), Err(Error::Json(_))));
    }
}
