//! Lenient readers for payloads coming from the pharmacy REST API.
//!
//! The API is loosely typed: amounts arrive as numbers or strings, dates in
//! several formats, lists sometimes wrapped in an envelope. A malformed value
//! never fails the whole payload. Numbers degrade to `0`, text to `""`, dates
//! to `None` and lists to `[]`. Records are read from a JSON object field by
//! field, so one record carrying the same field under several names is still read.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Envelope keys under which list endpoints may wrap their array.
const LIST_ENVELOPE_KEYS: [&str; 3] = ["data", "items", "results"];

/// Number or numeric string, anything else is `0`.
///
/// ```
/// use contracts::shared::lenient::number_from_value;
/// use serde_json::json;
/// assert_eq!(number_from_value(&json!(12.5)), 12.5);
/// assert_eq!(number_from_value(&json!("40")), 40.0);
/// assert_eq!(number_from_value(&json!("n/a")), 0.0);
/// assert_eq!(number_from_value(&json!(null)), 0.0);
/// ```
pub fn number_from_value(value: &Value) -> f64 {
    read_number(value).unwrap_or(0.0)
}

fn read_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// String, scalar rendered as text, or `{ "name": .. }` object.
pub fn text_from_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => match map.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Parse a timestamp string.
///
/// Accepted: RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC),
/// `YYYY-MM-DD HH:MM:SS[.fff]` (read as UTC), plain `YYYY-MM-DD` (UTC midnight).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Timestamp string or epoch milliseconds (integer or float).
pub fn datetime_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|ms| ms.is_finite() && ms.abs() < i64::MAX as f64)
                    .map(|ms| ms.trunc() as i64)
            })
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// Read a list payload.
///
/// Accepts a bare array or an object wrapping the array under one of
/// [`LIST_ENVELOPE_KEYS`]. Elements that cannot be read are skipped.
pub fn list_from_value<T: DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let wrapped = LIST_ENVELOPE_KEYS
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                });
            match wrapped {
                Some(items) => items,
                None => {
                    tracing::warn!("{}: expected a list, got an object without one", what);
                    return Vec::new();
                }
            }
        }
        Value::Null => Vec::new(),
        other => {
            tracing::warn!("{}: expected a list, got {}", what, value_kind(&other));
            return Vec::new();
        }
    };

    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: skipping unreadable element: {}", what, e);
                None
            }
        })
        .collect();

    if parsed.len() < total {
        tracing::debug!("{}: read {} of {} elements", what, parsed.len(), total);
    }
    parsed
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// JSON object a record is read from.
pub type JsonObject = Map<String, Value>;

/// First of `keys` present with a non-null value.
///
/// APIs often send a field under several names at once (`_id` and `id`,
/// `createdAt` and `saleDate`); the earlier key wins and the others are ignored.
pub fn field<'a>(map: &'a JsonObject, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// First readable number among `keys`, else `0`.
pub fn number_field(map: &JsonObject, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(read_number)
        .unwrap_or(0.0)
}

/// First non-empty text among `keys`, else `""`.
pub fn text_field(map: &JsonObject, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .map(text_from_value)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// First readable timestamp among `keys`.
pub fn datetime_field(map: &JsonObject, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(datetime_from_value)
}

/// List under the first non-null key among `keys`, read with [`list_from_value`].
pub fn list_field<T: DeserializeOwned>(map: &JsonObject, keys: &[&str], what: &str) -> Vec<T> {
    field(map, keys)
        .map(|value| list_from_value(value.clone(), what))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_number_coercion() {
        assert_eq!(number_from_value(&json!(7)), 7.0);
        assert_eq!(number_from_value(&json!(" 3.25 ")), 3.25);
        assert_eq!(number_from_value(&json!("")), 0.0);
        assert_eq!(number_from_value(&json!("NaN")), 0.0);
        assert_eq!(number_from_value(&json!(true)), 0.0);
        assert_eq!(number_from_value(&json!({"value": 3})), 0.0);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(text_from_value(&json!("Acme")), "Acme");
        assert_eq!(text_from_value(&json!(15)), "15");
        assert_eq!(text_from_value(&json!({"name": "Acme Pharma", "id": 4})), "Acme Pharma");
        assert_eq!(text_from_value(&json!(null)), "");
        assert_eq!(text_from_value(&json!(["a"])), "");
    }

    #[test]
    fn test_parse_datetime_formats() {
        let rfc = parse_datetime("2024-03-06T10:00:00+03:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-03-06T07:00:00+00:00");

        let naive = parse_datetime("2024-03-06T10:00:00.250").unwrap();
        assert_eq!(naive.format("%Y-%m-%d %H:%M:%S%.3f").to_string(), "2024-03-06 10:00:00.250");

        let spaced = parse_datetime("2024-03-06 10:00:00").unwrap();
        assert_eq!(spaced, naive - chrono::Duration::milliseconds(250));

        let date_only = parse_datetime("2024-03-06").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2024-03-06T00:00:00+00:00");

        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2024-13-40").is_none());
    }

    #[test]
    fn test_datetime_from_epoch_millis() {
        let dt = datetime_from_value(&json!(1_709_719_200_000_i64)).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-06T10:00:00+00:00");
        assert!(datetime_from_value(&json!(null)).is_none());
    }

    #[test]
    fn test_datetime_from_float_epoch_millis() {
        let dt = datetime_from_value(&json!(1_709_719_200_000.0_f64)).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-06T10:00:00+00:00");

        let with_fraction = datetime_from_value(&json!(1_709_719_200_250.7_f64)).unwrap();
        assert_eq!(with_fraction.timestamp_millis(), 1_709_719_200_250);
    }

    #[test]
    fn test_field_precedence() {
        let map = json!({
            "_id": "mongo",
            "id": "virtual",
            "amount": null,
            "total": "12.5",
            "createdAt": "garbage",
            "saleDate": "2024-03-06"
        });
        let map = map.as_object().unwrap();

        assert_eq!(text_field(map, &["id", "_id"]), "virtual");
        assert_eq!(text_field(map, &["_id", "id"]), "mongo");
        assert_eq!(number_field(map, &["amount", "total"]), 12.5);
        assert_eq!(number_field(map, &["missing"]), 0.0);
        assert_eq!(
            datetime_field(map, &["createdAt", "saleDate"]).map(|d| d.to_rfc3339()),
            Some("2024-03-06T00:00:00+00:00".to_string())
        );
        assert!(field(map, &["amount"]).is_none());

        let items: Vec<Item> = list_field(map, &["items"], "items");
        assert!(items.is_empty());
    }

    #[derive(Debug, Deserialize)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_list_accepts_bare_and_enveloped_arrays() {
        let bare: Vec<Item> = list_from_value(json!([{"name": "a"}, {"name": "b"}]), "items");
        assert_eq!(bare.len(), 2);

        let wrapped: Vec<Item> = list_from_value(json!({"data": [{"name": "c"}]}), "items");
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].name, "c");
    }

    #[test]
    fn test_list_degrades_to_empty_on_wrong_shape() {
        let from_string: Vec<Item> = list_from_value(json!("oops"), "items");
        assert!(from_string.is_empty());

        let from_object: Vec<Item> = list_from_value(json!({"message": "ok"}), "items");
        assert!(from_object.is_empty());

        let from_null: Vec<Item> = list_from_value(Value::Null, "items");
        assert!(from_null.is_empty());
    }

    #[test]
    fn test_list_skips_unreadable_elements() {
        let items: Vec<Item> = list_from_value(json!([{"name": "a"}, 42, {"other": 1}]), "items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "a");
    }
}
