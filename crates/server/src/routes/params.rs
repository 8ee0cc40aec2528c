//! Field coercion for create/update bodies.
//!
//! Bodies are read as raw JSON and coerced field by field: identifiers accept
//! numbers and numeric strings, required strings must be non-empty after
//! trimming, and anything else is ignored for optional fields or rejected
//! with 400 for required ones.

use serde_json::Value;

use crate::error::ApiError;

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn id_field(body: &Value, key: &str) -> Option<i64> {
    coerce_i64(body.get(key)?)
}

pub fn require_id_field(body: &Value, key: &str) -> Result<i64, ApiError> {
    id_field(body, key).ok_or_else(|| ApiError::BadRequest(format!("{key} is required")))
}

/// `order` must be a non-negative integer; anything else counts as absent.
pub fn order_field(body: &Value, key: &str) -> Option<i64> {
    coerce_i64(body.get(key)?).filter(|order| *order >= 0)
}

/// A string field whose trimmed form is non-empty; the trimmed form is what
/// gets stored.
pub fn string_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

pub fn require_string_field(body: &Value, key: &str) -> Result<String, ApiError> {
    string_field(body, key).ok_or_else(|| ApiError::BadRequest(format!("{key} is required")))
}

/// Free-form string field, passed through verbatim (used for descriptions).
pub fn raw_string_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn id_fields_accept_numbers_and_numeric_strings() {
        let body = json!({"boardId": 7, "columnId": " 12 ", "bogus": "x7", "float": 1.5});
        assert_eq!(id_field(&body, "boardId"), Some(7));
        assert_eq!(id_field(&body, "columnId"), Some(12));
        assert_eq!(id_field(&body, "bogus"), None);
        assert_eq!(id_field(&body, "float"), None);
        assert_eq!(id_field(&body, "missing"), None);
    }

    #[test]
    fn required_id_reports_the_field_name() {
        let err = require_id_field(&json!({}), "boardId").unwrap_err();
        let response = axum::response::IntoResponse::into_response(err);
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn order_rejects_negatives() {
        assert_eq!(order_field(&json!({"order": 3}), "order"), Some(3));
        assert_eq!(order_field(&json!({"order": -1}), "order"), None);
        assert_eq!(order_field(&json!({"order": "2"}), "order"), Some(2));
        assert_eq!(order_field(&json!({"order": null}), "order"), None);
    }

    #[test]
    fn string_fields_trim_and_reject_whitespace() {
        let body = json!({"name": "  Sprint  ", "blank": "   ", "num": 4});
        assert_eq!(string_field(&body, "name").as_deref(), Some("Sprint"));
        assert_eq!(string_field(&body, "blank"), None);
        assert_eq!(string_field(&body, "num"), None);
    }

    #[test]
    fn raw_strings_keep_whitespace() {
        let body = json!({"description": "  as is  "});
        assert_eq!(
            raw_string_field(&body, "description").as_deref(),
            Some("  as is  ")
        );
        assert_eq!(raw_string_field(&json!({"description": 9}), "description"), None);
    }
}
