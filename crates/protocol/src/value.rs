//! Settings values and the flat settings document

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{ProtocolError, Result};

/// A single setting: the document only carries primitives
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Flat key → value settings document, in document order
pub type SettingsMap = IndexMap<String, SettingValue>;

impl SettingValue {
    /// Convert a JSON value, rejecting null, arrays and objects
    pub fn from_json(key: &str, value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| ProtocolError::UnsupportedValue { key: key.to_string() }),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            _ => Err(ProtocolError::UnsupportedValue { key: key.to_string() }),
        }
    }

    /// Truthiness as the page sees it: string form equals "true", any case
    pub fn is_true(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(_) => false,
            Self::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }

    /// Text written into an element. Fractional numbers are rounded to 2 decimals.
    pub fn display(&self) -> String {
        match self {
            Self::Number(n) if n.fract() != 0.0 => format!("{}", round_half_up(*n, 2)),
            other => other.to_string(),
        }
    }

    /// Parse `raw` as a value of the same type as `self`
    ///
    /// Used when an edit arrives as plain text in a URL segment.
    pub fn coerce_like(&self, raw: &str) -> Option<Self> {
        match self {
            Self::Bool(_) => {
                if raw.eq_ignore_ascii_case("true") {
                    Some(Self::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Some(Self::Bool(false))
                } else {
                    None
                }
            }
            Self::Number(_) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Self::Number),
            Self::Text(_) => Some(Self::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for SettingValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Parse a settings document. The top level must be an object of primitives.
pub fn parse_settings(json: &str) -> Result<SettingsMap> {
    let serde_json::Value::Object(object) = serde_json::from_str(json)? else {
        return Err(ProtocolError::NotAnObject);
    };

    object
        .into_iter()
        .map(|(key, value)| {
            let value = SettingValue::from_json(&key, value)?;
            Ok((key, value))
        })
        .collect()
}

/// Parse a pushed or fetched document, skipping keys that are not primitives
///
/// Returns the usable settings and the keys that were dropped. Only a
/// document that is not a JSON object fails as a whole.
pub fn parse_settings_lossy(json: &str) -> Result<(SettingsMap, Vec<String>)> {
    let serde_json::Value::Object(object) = serde_json::from_str(json)? else {
        return Err(ProtocolError::NotAnObject);
    };

    let mut settings = SettingsMap::with_capacity(object.len());
    let mut skipped = Vec::new();
    for (key, value) in object {
        match SettingValue::from_json(&key, value) {
            Ok(value) => {
                settings.insert(key, value);
            }
            Err(_) => skipped.push(key),
        }
    }
    Ok((settings, skipped))
}

/// Round `n` to `places` decimals, halves going up (towards +inf)
///
/// Works on one extra digit so that `2.005` lands on `2.01` instead of
/// following the binary representation down to `2.00`.
pub fn round_half_up(n: f64, places: i32) -> f64 {
    let widened = n * 10f64.powi(places + 1);
    let truncated = (widened / 10.0).floor();
    let scale = 10f64.powi(places);

    if widened >= truncated * 10.0 + 5.0 {
        (truncated + 1.0) / scale
    } else {
        truncated / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.005, 2), 2.01);
        assert_eq!(round_half_up(1.234, 2), 1.23);
        assert_eq!(round_half_up(1.235, 2), 1.24);
        assert_eq!(round_half_up(0.5, 0), 1.0);
        assert_eq!(round_half_up(-1.5, 0), -1.0);
    }

    #[test]
    fn test_parse_settings() {
        let map = parse_settings(r#"{"ssid":"home","port":1883,"traceJava":true,"voltage":3.14159}"#)
            .expect("valid document");
        assert_eq!(map.len(), 4);
        assert_eq!(map["ssid"], SettingValue::Text("home".into()));
        assert_eq!(map["port"], SettingValue::Number(1883.0));
        assert_eq!(map["traceJava"], SettingValue::Bool(true));
    }

    #[test]
    fn test_parse_rejects_non_primitives() {
        assert!(matches!(parse_settings("[1, 2]"), Err(ProtocolError::NotAnObject)));
        assert!(matches!(
            parse_settings(r#"{"nested":{"a":1}}"#),
            Err(ProtocolError::UnsupportedValue { key }) if key == "nested"
        ));
        assert!(matches!(
            parse_settings(r#"{"nothing":null}"#),
            Err(ProtocolError::UnsupportedValue { .. })
        ));
        assert!(matches!(parse_settings("{"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let map = parse_settings(r#"{"zeta":1,"alpha":true,"mid":"x"}"#).expect("valid document");
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&map).expect("serializable"),
            r#"{"zeta":1.0,"alpha":true,"mid":"x"}"#
        );
    }

    #[test]
    fn test_parse_lossy_skips_bad_keys() {
        let (map, skipped) =
            parse_settings_lossy(r#"{"gone":null,"traceJava":true,"list":[1],"ssid":"home"}"#)
                .expect("object document");
        assert_eq!(map.len(), 2);
        assert_eq!(map["traceJava"], SettingValue::Bool(true));
        assert_eq!(map["ssid"], SettingValue::from("home"));
        assert_eq!(skipped, ["gone", "list"]);

        assert!(matches!(parse_settings_lossy("3"), Err(ProtocolError::NotAnObject)));
        assert!(matches!(parse_settings_lossy("{"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(SettingValue::Number(5.0).display(), "5");
        assert_eq!(SettingValue::Number(3.14159).display(), "3.14");
        assert_eq!(SettingValue::Number(2.999).display(), "3");
        assert_eq!(SettingValue::Bool(false).display(), "false");
        assert_eq!(SettingValue::Text("abc".into()).display(), "abc");
    }

    #[test]
    fn test_is_true() {
        assert!(SettingValue::Bool(true).is_true());
        assert!(SettingValue::Text("TRUE".into()).is_true());
        assert!(!SettingValue::Text("yes".into()).is_true());
        assert!(!SettingValue::Number(1.0).is_true());
    }

    #[test]
    fn test_coerce_like() {
        let flag = SettingValue::Bool(false);
        assert_eq!(flag.coerce_like("True"), Some(SettingValue::Bool(true)));
        assert_eq!(flag.coerce_like("on"), None);

        let number = SettingValue::Number(0.0);
        assert_eq!(number.coerce_like(" 12.5"), Some(SettingValue::Number(12.5)));
        assert_eq!(number.coerce_like("abc"), None);
        assert_eq!(number.coerce_like("inf"), None);

        let text = SettingValue::Text(String::new());
        assert_eq!(text.coerce_like("a b"), Some(SettingValue::Text("a b".into())));
    }
}
