//! Result rows and row mapping.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{QbError, QbResult};
use crate::value::{FromValue, Value};

/// One result row: column names (shared across a result set) and values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Decode column `name` into `T`.
    pub fn try_get<T: FromValue>(&self, name: &str) -> QbResult<T> {
        let value = self
            .get(name)
            .ok_or_else(|| QbError::ColumnNotFound(name.to_string()))?;
        T::from_value(value).ok_or_else(|| {
            QbError::decode(
                name,
                format!("expected {}, found {}", T::EXPECTED, value.kind()),
            )
        })
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Render the row as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::to_value(v).unwrap_or_default()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Trait for mapping a result [`Row`] into a Rust type.
///
/// # Example
/// ```
/// use litequery::{FromRow, QbResult, Row};
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &Row) -> QbResult<Self> {
///         Ok(User {
///             id: row.try_get("id")?,
///             name: row.try_get("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> QbResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QbResult<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string(), "note".to_string()].into();
        Row::new(
            columns,
            vec![Value::Integer(7), Value::Text("ana".into()), Value::Null],
        )
    }

    #[test]
    fn test_get_by_name_and_index() {
        let row = sample();
        assert_eq!(row.get("name"), Some(&Value::Text("ana".into())));
        assert_eq!(row.get_index(0), Some(&Value::Integer(7)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_try_get() {
        let row = sample();
        assert_eq!(row.try_get::<i64>("id").unwrap(), 7);
        assert_eq!(row.try_get::<Option<String>>("note").unwrap(), None);
        assert!(matches!(
            row.try_get::<i64>("name"),
            Err(QbError::Decode { .. })
        ));
        assert!(matches!(
            row.try_get::<i64>("missing"),
            Err(QbError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_serialize_as_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"id":7,"name":"ana","note":null}"#);
        assert_eq!(sample().to_json()["name"], "ana");
    }
}
