//! Tolerant serde field helpers
//!
//! The backend is loose about types: codes arrive as numbers or strings,
//! amounts as numbers or formatted strings, and empty strings mean "absent".

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::format::parse_lenient_number;

/// Text form of a scalar; `None` for null, empty strings and containers
pub(crate) fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn value_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_lenient_number(s),
        _ => None,
    }
}

pub(crate) fn opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_text))
}

pub(crate) fn opt_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_number))
}

pub(crate) fn string_list<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Array(items)) => items.iter().filter_map(value_text).collect(),
        _ => Vec::new(),
    })
}

/// Chart series; unparseable points read as 0 so labels and values stay aligned
pub(crate) fn number_list<'de, D>(d: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Array(items)) => items.iter().map(|x| value_number(x).unwrap_or(0.0)).collect(),
        _ => Vec::new(),
    })
}

/// Accepts `[...]`, `{"data": [...]}`, `{"items": [...]}` and friends
pub(crate) fn unwrap_list(v: Value, keys: &[&str]) -> Vec<Value> {
    match v {
        Value::Array(items) => items,
        Value::Object(mut map) => keys
            .iter()
            .find_map(|k| match map.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "opt_string")]
        code: Option<String>,
        #[serde(default, deserialize_with = "opt_number")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "string_list")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "number_list")]
        points: Vec<f64>,
    }

    #[test]
    fn test_number_list_keeps_alignment() {
        let p: Probe = serde_json::from_value(json!({"points": [1, "2", null, "x"]})).unwrap();
        assert_eq!(p.points, vec![1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_numbers_and_strings_interchange() {
        let p: Probe = serde_json::from_value(json!({"code": 6204000, "amount": "750000", "tags": ["a", 2]})).unwrap();
        assert_eq!(p.code.as_deref(), Some("6204000"));
        assert_eq!(p.amount, Some(750000.0));
        assert_eq!(p.tags, vec!["a".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_empty_and_missing() {
        let p: Probe = serde_json::from_value(json!({"code": "", "amount": null})).unwrap();
        assert_eq!(p.code, None);
        assert_eq!(p.amount, None);
        assert!(p.tags.is_empty());
    }

    #[test]
    fn test_unwrap_list_shapes() {
        assert_eq!(unwrap_list(json!([1, 2]), &["data"]).len(), 2);
        assert_eq!(unwrap_list(json!({"dados": [1]}), &["items", "dados"]).len(), 1);
        assert!(unwrap_list(json!({"total": 3}), &["data"]).is_empty());
    }
}
