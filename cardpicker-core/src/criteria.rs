//! Filter criteria and their query-string encoding.
//!
//! [`Criteria`] maps catalog query-parameter names to a [`CriteriaValue`].
//! A list value becomes a single comma-joined parameter, which the catalog
//! reads as an OR filter (`class=warlock,druid`).
//!
//! # Example
//!
//! ```
//! use cardpicker_core::criteria::Criteria;
//! use cardpicker_core::model::{CardClass, Rarity};
//!
//! let criteria = Criteria::new()
//!     .with("manaCost", 7)
//!     .with("rarity", Rarity::Legendary.id())
//!     .with_list("class", [CardClass::Warlock.id(), CardClass::Druid.id()]);
//!
//! assert_eq!(criteria.encode(), "&class=9,2&manaCost=7&rarity=5");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use url::form_urlencoded;

/// A single filter value.
///
/// Deserializes from a string, number, or boolean (scalar) or an array of
/// those (list), so config files can write `manaCost = 7`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CriteriaValue {
    /// One value, emitted as `key=value`.
    Scalar(String),

    /// Several values, emitted as `key=v1,v2,...`.
    ///
    /// An empty list is omitted from the query entirely.
    List(Vec<String>),
}

impl CriteriaValue {
    /// Build a scalar from anything with a natural string form.
    pub fn scalar(value: impl Display) -> Self {
        Self::Scalar(value.to_string())
    }

    /// Build a list from anything iterable with a natural string form.
    pub fn list<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        Self::List(values.into_iter().map(|v| v.to_string()).collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl RawScalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    One(RawScalar),
    Many(Vec<RawScalar>),
}

impl<'de> Deserialize<'de> for CriteriaValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawValue::deserialize(deserializer)? {
            RawValue::One(v) => Self::Scalar(v.into_string()),
            RawValue::Many(vs) => Self::List(vs.into_iter().map(RawScalar::into_string).collect()),
        })
    }
}

/// Filter and sort parameters for a catalog query.
///
/// Keys iterate in sorted order, so encoding is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<String, CriteriaValue>);

impl Criteria {
    /// Create an empty criteria set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar filter, replacing any previous value for `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, CriteriaValue::scalar(value));
        self
    }

    /// Add a multi-value filter, replacing any previous value for `key`.
    pub fn with_list<I>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.insert(key, CriteriaValue::list(values));
        self
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: CriteriaValue) -> Option<CriteriaValue> {
        self.0.insert(key.into(), value)
    }

    /// Look up the value for a key.
    pub fn get(&self, key: &str) -> Option<&CriteriaValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CriteriaValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Encode as a query-string suffix of `&key=value` segments.
    ///
    /// Returns an empty string for empty criteria.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.0 {
            let encoded = match value {
                CriteriaValue::Scalar(v) => encode_component(v),
                CriteriaValue::List(values) if values.is_empty() => continue,
                CriteriaValue::List(values) => values
                    .iter()
                    .map(String::as_str)
                    .map(encode_component)
                    .collect::<Vec<_>>()
                    .join(","),
            };
            out.push('&');
            out.push_str(&encode_component(key));
            out.push('=');
            out.push_str(&encoded);
        }
        out
    }
}

impl<K: Into<String>> FromIterator<(K, CriteriaValue)> for Criteria {
    fn from_iter<T: IntoIterator<Item = (K, CriteriaValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

pub(crate) fn encode_component(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
