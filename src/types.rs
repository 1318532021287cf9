use chrono::NaiveDateTime;
use serde_json::{Value as JsonValue, json};

/// Values bound as positional query parameters.
///
/// One enum for the whole adapter so callers do not branch on wire types:
/// ```rust
/// use d1_middleware::types::BindValue;
///
/// let params = vec![
///     BindValue::Integer(1),
///     BindValue::Text("alice".into()),
///     BindValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    /// A parameter slot the query builder left unbound. The remote API
    /// rejects unbound markers, so this is always submitted as `null`.
    Unset,
    /// NULL value
    Null,
    /// Integer value (64-bit)
    Integer(i64),
    /// Floating point value (64-bit)
    Real(f64),
    /// Text/string value
    Text(String),
    /// Boolean value, stored as `1`/`0`
    Bool(bool),
    /// Timestamp value, stored as TEXT
    Timestamp(NaiveDateTime),
    /// Binary data
    Blob(Vec<u8>),
    /// Pre-built JSON value, passed through verbatim
    Json(JsonValue),
}

impl BindValue {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let BindValue::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let BindValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BindValue::Bool(value) => Some(*value),
            BindValue::Integer(1) => Some(true),
            BindValue::Integer(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let BindValue::Real(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let BindValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// The JSON value submitted to the remote handle.
    ///
    /// Timestamps serialize as `%F %T%.f` TEXT for parity with the other
    /// SQLite-compatible backends; booleans as `1`/`0`; blobs as arrays of
    /// byte values. `Unset` normalizes to `null`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            BindValue::Unset | BindValue::Null => JsonValue::Null,
            BindValue::Integer(i) => json!(i),
            BindValue::Real(f) => json!(f),
            BindValue::Text(s) => json!(s),
            BindValue::Bool(b) => json!(i64::from(*b)),
            BindValue::Timestamp(dt) => json!(dt.format("%F %T%.f").to_string()),
            BindValue::Blob(bytes) => JsonValue::Array(bytes.iter().map(|b| json!(b)).collect()),
            BindValue::Json(value) => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_null_both_become_json_null() {
        assert_eq!(BindValue::Unset.to_json(), JsonValue::Null);
        assert_eq!(BindValue::Null.to_json(), JsonValue::Null);
    }

    #[test]
    fn booleans_bind_as_integers() {
        assert_eq!(BindValue::Bool(true).to_json(), json!(1));
        assert_eq!(BindValue::Bool(false).to_json(), json!(0));
    }

    #[test]
    fn timestamps_bind_as_text() {
        let dt = NaiveDateTime::parse_from_str("2024-05-01 12:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let bound = BindValue::Timestamp(dt).to_json();
        assert!(bound.as_str().unwrap().starts_with("2024-05-01 12:30:00"));
    }
}
