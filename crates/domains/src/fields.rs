//! # Submitted fields
//!
//! The form layer hands the record services a plain name → value map.
//! Accessors here normalize raw input: blank text becomes `None`, and numeric
//! input is parsed tolerantly (anything unparseable is simply absent).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Formats accepted for `date_time`. The first is what `datetime-local`
/// inputs submit.
pub const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Name → value map of submitted form fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`FieldMap::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a field only when `value` is present.
    pub fn insert_opt(&mut self, key: &str, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.insert(key, value.to_string());
        }
    }

    /// Raw submitted value, untrimmed. Missing keys read as "".
    pub fn raw(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    /// Trimmed text, or `None` when blank or missing.
    pub fn text(&self, key: &str) -> Option<String> {
        let value = self.raw(key).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Tolerant numeric parsing: blank, malformed and non-finite input are
    /// all absent, never an error.
    pub fn number(&self, key: &str) -> Option<f64> {
        parse_number(self.raw(key))
    }

    /// Event timestamp, or `None` when blank or not in a known format.
    pub fn timestamp(&self, key: &str) -> Option<NaiveDateTime> {
        parse_timestamp(self.raw(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Renders a timestamp back into the `datetime-local` input format.
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMATS[0]).to_string()
}
