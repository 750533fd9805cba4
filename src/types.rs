use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Values that can be bound as parameters or read back from a row.
///
/// The engine only ever hands back `Null`, `Int`, `Float`, `Text` and `Blob`; the other
/// variants exist so callers can bind them without converting first:
/// ```rust
/// use websql_sync::prelude::*;
///
/// let params = Parameters::positional(vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ]);
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value, bound as 0/1
    Bool(bool),
    /// Timestamp value, bound as `YYYY-MM-DD HH:MM:SS[.fff]` text
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value, bound as its serialized text
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<rusqlite::types::ValueRef<'_>> for RowValues {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        match value {
            rusqlite::types::ValueRef::Null => RowValues::Null,
            rusqlite::types::ValueRef::Integer(i) => RowValues::Int(i),
            rusqlite::types::ValueRef::Real(f) => RowValues::Float(f),
            rusqlite::types::ValueRef::Text(bytes) => {
                RowValues::Text(String::from_utf8_lossy(bytes).into_owned())
            }
            rusqlite::types::ValueRef::Blob(b) => RowValues::Blob(b.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_values_map_without_coercion() {
        use rusqlite::types::ValueRef;

        assert_eq!(RowValues::from(ValueRef::Integer(7)), RowValues::Int(7));
        assert_eq!(RowValues::from(ValueRef::Real(1.5)), RowValues::Float(1.5));
        assert_eq!(
            RowValues::from(ValueRef::Text(b"E")),
            RowValues::Text("E".to_string())
        );
        assert!(RowValues::from(ValueRef::Null).is_null());
        assert_eq!(
            RowValues::from(ValueRef::Blob(&[1, 2])).as_blob(),
            Some(&[1u8, 2][..])
        );
    }

    #[test]
    fn serializes_as_plain_json() {
        let values = vec![
            RowValues::Int(5),
            RowValues::Text("E".into()),
            RowValues::Null,
            RowValues::Bool(true),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[5,"E",null,true]"#);
    }
}
