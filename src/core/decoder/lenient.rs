//! Field deserializers that accept both wire formats.
//!
//! JSON endpoints send ids and coordinates as numbers and flags as booleans,
//! XML endpoints send everything as element text. Every helper goes through
//! [`serde_json::Value`] so both formats end up on the same code path.
//! Absent, `null` or empty values count as missing; a present value that
//! cannot be read is an error.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

fn text(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(format!("expected a scalar value, found {}", other)),
    }
}

pub fn optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    text(Value::deserialize(d)?).map_err(D::Error::custom)
}

pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(optional_string(d)?.unwrap_or_default())
}

pub fn required_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    optional_string(d)?.ok_or_else(|| D::Error::custom("required value is empty"))
}

pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match Value::deserialize(d)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "false" => Ok(false),
            "true" => Ok(true),
            other => Err(D::Error::custom(format!("invalid boolean '{}'", other))),
        },
        other => Err(D::Error::custom(format!("invalid boolean {}", other))),
    }
}

fn optional_integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid integer {}", n))),
        other => match text(other).map_err(D::Error::custom)? {
            None => Ok(None),
            Some(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid integer '{}': {}", s, e))),
        },
    }
}

pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(optional_integer(d)?.unwrap_or_default())
}

pub fn required_integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    optional_integer(d)?.ok_or_else(|| D::Error::custom("required integer is empty"))
}

pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid number {}", n))),
        other => match text(other).map_err(D::Error::custom)? {
            None => Ok(None),
            Some(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid number '{}': {}", s, e))),
        },
    }
}

/// W3C datetime; a timestamp without offset is taken as UTC.
pub fn datetime<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
    let Some(raw) = text(Value::deserialize(d)?).map_err(D::Error::custom)? else {
        return Ok(None);
    };
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc().fixed_offset()))
        .map_err(|e| D::Error::custom(format!("invalid datetime '{}': {}", raw, e)))
}

/// Comma separated keywords, or an array of them.
pub fn keywords<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(d)? {
        Value::Array(values) => values
            .into_iter()
            .map(text)
            .collect::<Result<Vec<_>, _>>()
            .map_err(D::Error::custom)?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>(),
        other => text(other)
            .map_err(D::Error::custom)?
            .map(|joined| joined.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
    };

    Ok(items
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(d)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect(),
        other => Err(D::Error::custom(format!("expected a list, found {}", other))),
    }
}

/// Rewrites every scalar inside `value` the way [`text`] reads it, so nested
/// JSON numbers and XML element text serialize the same.
fn scalars_as_text(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(scalars_as_text).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, scalars_as_text(value)))
                .collect(),
        ),
        scalar => match text(scalar) {
            Ok(Some(s)) => Value::String(s),
            _ => Value::Null,
        },
    }
}

pub fn string_map<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(BTreeMap::new()),
        Value::Object(fields) => Ok(fields
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    nested @ (Value::Array(_) | Value::Object(_)) => scalars_as_text(nested).to_string(),
                    scalar => text(scalar).ok().flatten().unwrap_or_default(),
                };
                (key, value)
            })
            .collect()),
        other => Err(D::Error::custom(format!("expected an object, found {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "boolean")]
        flag: bool,
        #[serde(default, deserialize_with = "float")]
        lat: Option<f64>,
        #[serde(default, deserialize_with = "optional_string")]
        id: Option<String>,
        #[serde(default, deserialize_with = "keywords")]
        keywords: Vec<String>,
        #[serde(default, deserialize_with = "datetime")]
        at: Option<DateTime<FixedOffset>>,
        #[serde(default, deserialize_with = "string_map")]
        extras: BTreeMap<String, String>,
    }

    #[test]
    fn test_numbers_and_text_read_the_same() {
        let from_json: Fields =
            serde_json::from_value(json!({"flag": true, "lat": 37.5, "id": 42})).unwrap();
        let from_text: Fields =
            serde_json::from_value(json!({"flag": "true", "lat": "37.5", "id": "42"})).unwrap();

        assert_eq!(from_json.flag, from_text.flag);
        assert_eq!(from_json.lat, from_text.lat);
        assert_eq!(from_json.id, from_text.id);
    }

    #[test]
    fn test_missing_and_null_are_not_errors() {
        let probe: Fields = serde_json::from_value(json!({"lat": null, "id": "", "at": null})).unwrap();
        assert!(!probe.flag);
        assert_eq!(probe.lat, None);
        assert_eq!(probe.id, None);
        assert_eq!(probe.at, None);
    }

    #[test]
    fn test_malformed_present_values_are_errors() {
        assert!(serde_json::from_value::<Fields>(json!({"lat": "north"})).is_err());
        assert!(serde_json::from_value::<Fields>(json!({"flag": "maybe"})).is_err());
        assert!(serde_json::from_value::<Fields>(json!({"at": "yesterday"})).is_err());
    }

    #[test]
    fn test_keywords_from_string_and_array() {
        let joined: Fields = serde_json::from_value(json!({"keywords": "lorem, ipsum,dolor"})).unwrap();
        let array: Fields =
            serde_json::from_value(json!({"keywords": ["lorem", "ipsum", "dolor"]})).unwrap();
        assert_eq!(joined.keywords, vec!["lorem", "ipsum", "dolor"]);
        assert_eq!(joined.keywords, array.keywords);
    }

    #[test]
    fn test_datetime_with_and_without_offset() {
        let with_offset: Fields =
            serde_json::from_value(json!({"at": "2010-04-14T06:37:38-08:00"})).unwrap();
        assert_eq!(
            with_offset.at.unwrap().to_rfc3339(),
            "2010-04-14T06:37:38-08:00"
        );

        let naive: Fields = serde_json::from_value(json!({"at": "2010-04-14T06:37:38"})).unwrap();
        assert_eq!(naive.at.unwrap().to_rfc3339(), "2010-04-14T06:37:38+00:00");
    }

    #[test]
    fn test_nested_extras_read_the_same_from_numbers_and_text() {
        let from_json: Fields = serde_json::from_value(
            json!({"extras": {"priority": 2, "detail": {"a": 1, "b": true, "c": ""}}}),
        )
        .unwrap();
        let from_text: Fields = serde_json::from_value(
            json!({"extras": {"priority": "2", "detail": {"a": "1", "b": "true", "c": null}}}),
        )
        .unwrap();

        assert_eq!(from_json.extras["priority"], "2");
        assert_eq!(from_json.extras["detail"], r#"{"a":"1","b":"true","c":null}"#);
        assert_eq!(from_json.extras, from_text.extras);
    }
}
