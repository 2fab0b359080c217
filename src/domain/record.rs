//! Staging record helpers
//!
//! Staged resources are kept as raw JSON documents exactly as the source API
//! returned them. These helpers read the few fields the pipeline relies on.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A staged resource snapshot
pub type Document = Value;

/// Resolve a dotted path (`associations.UPSELL.products`) inside a document
///
/// # Examples
///
/// ```
/// use pimbridge::domain::record::field;
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": [1, 2]}});
/// assert_eq!(field(&doc, "a.b"), Some(&json!([1, 2])));
/// assert_eq!(field(&doc, "a.c"), None);
/// ```
pub fn field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, key| current.get(key))
}

/// String field at a dotted path
pub fn str_field<'a>(doc: &'a Value, path: &str) -> Option<&'a str> {
    field(doc, path).and_then(Value::as_str)
}

/// Set a top-level field on an object document, ignoring non-objects
pub fn set_field(doc: &mut Value, key: &str, value: Value) {
    if let Some(map) = doc.as_object_mut() {
        map.insert(key.to_string(), value);
    }
}

/// Parse a source timestamp (RFC 3339, with offset) into UTC
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Read an attribute value from a product's `values` map
///
/// Akeneo stores every attribute as a list of `{scope, locale, data}` entries.
/// The entry must match `scope` exactly; `locale = None` accepts any locale.
///
/// # Examples
///
/// ```
/// use pimbridge::domain::record::attribute_value;
/// use serde_json::json;
///
/// let product = json!({"values": {"name": [
///     {"scope": null, "locale": "de_CH", "data": "Schuh"},
///     {"scope": null, "locale": "fr_CH", "data": "Chaussure"}
/// ]}});
/// assert_eq!(attribute_value(&product, "name", None, Some("fr_CH")), Some(&json!("Chaussure")));
/// assert_eq!(attribute_value(&product, "name", None, None), Some(&json!("Schuh")));
/// ```
pub fn attribute_value<'a>(
    doc: &'a Value,
    key: &str,
    scope: Option<&str>,
    locale: Option<&str>,
) -> Option<&'a Value> {
    let entries = doc.get("values")?.get(key)?.as_array()?;
    entries
        .iter()
        .find(|entry| {
            let entry_scope = entry.get("scope").and_then(Value::as_str);
            let entry_locale = entry.get("locale").and_then(Value::as_str);
            entry_scope == scope && locale.map_or(true, |l| entry_locale == Some(l))
        })
        .and_then(|entry| entry.get("data"))
}
