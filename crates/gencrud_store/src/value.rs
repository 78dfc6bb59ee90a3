//! Name→value maps, the wire shape between generated code and the store.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Persisted field values of a single record, keyed by field name.
///
/// Keys keep insertion order, which generated code makes equal to the
/// declaration order of the persisted fields.
pub type Values = serde_json::Map<String, Value>;

/// Converts a field value into its stored representation.
///
/// Non-finite floats (`NaN` and the infinities) have no stored form and are
/// written as `null`. Reading one back into an `f64` fails with
/// [`StoreError::Serialization`]; into an `Option<f64>` it reads as `None`.
pub fn to_value<V: Serialize + ?Sized>(value: &V) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(value)?)
}

/// Reads a persisted field out of a value map.
///
/// An absent key is read as `null`, so optional fields materialize as
/// `None`; any other type reports [`StoreError::MissingField`].
pub fn field<V: DeserializeOwned>(
    values: &Values,
    type_name: &'static str,
    field: &'static str,
) -> Result<V, StoreError> {
    match values.get(field) {
        Some(value) => Ok(V::deserialize(value)?),
        None => {
            V::deserialize(Value::Null).map_err(|_| StoreError::MissingField { type_name, field })
        }
    }
}

/// Store-generated unique identifier, usable as a primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(uuid::Uuid);

impl ObjectId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_optional_field_reads_as_none() {
        let values = Values::new();
        let owner: Option<String> = field(&values, "Todo", "owner").unwrap();
        assert_eq!(owner, None);
    }

    #[test]
    fn absent_required_field_is_reported() {
        let values = Values::new();
        let err = field::<String>(&values, "Todo", "name").unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingField {
                type_name: "Todo",
                field: "name"
            }
        ));
    }

    #[test]
    fn mistyped_field_is_a_serialization_error() {
        let mut values = Values::new();
        values.insert("count".to_owned(), json!("three"));
        let err = field::<u32>(&values, "Counter", "count").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn non_finite_floats_are_stored_as_null() {
        let mut values = Values::new();
        values.insert("reading".to_owned(), to_value(&f64::NAN).unwrap());
        values.insert("peak".to_owned(), to_value(&f64::INFINITY).unwrap());
        assert!(values.values().all(Value::is_null));

        let err = field::<f64>(&values, "Sensor", "reading").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        let peak: Option<f64> = field(&values, "Sensor", "peak").unwrap();
        assert_eq!(peak, None);
    }

    #[test]
    fn object_ids_are_unique_and_serialize_as_strings() {
        let a = ObjectId::generate();
        let b = ObjectId::generate();
        assert_ne!(a, b);

        let value = to_value(&a).unwrap();
        assert!(value.is_string());
        let back: ObjectId = serde_json::from_value(value).unwrap();
        assert_eq!(a, back);
    }
}
