//! Typed secret payload.
//!
//! KV v2 stores an arbitrary JSON object per version. It is modelled as an ordered
//! map from field name to [`SecretValue`] so the shape is checked at the type level
//! and round-trips through JSON unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{Result, VaultError};

/// One field value of a secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<SecretValue>),
    Map(BTreeMap<String, SecretValue>),
}

impl SecretValue {
    /// Strings as-is, everything else as compact JSON.
    pub fn display(&self) -> String {
        match self {
            SecretValue::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        SecretValue::String(value.to_string())
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        SecretValue::String(value)
    }
}

impl From<bool> for SecretValue {
    fn from(value: bool) -> Self {
        SecretValue::Bool(value)
    }
}

impl From<i64> for SecretValue {
    fn from(value: i64) -> Self {
        SecretValue::Number(value.into())
    }
}

/// Full content of one secret version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretPayload(BTreeMap<String, SecretValue>);

impl SecretPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document, which must be an object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(VaultError::config("Secret data must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<SecretValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SecretValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SecretValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SecretValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, SecretValue>> for SecretPayload {
    fn from(fields: BTreeMap<String, SecretValue>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<SecretValue>> FromIterator<(K, V)> for SecretPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
