use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::traits::HandlerError;
use crate::aws::EncryptionContext;

/// Read-only view over resource properties that remembers which keys a
/// handler has consumed.
#[derive(Debug)]
pub struct Properties<'a> {
    map: &'a Map<String, Value>,
    consumed: BTreeSet<&'a str>,
}

impl<'a> Properties<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            consumed: BTreeSet::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Return the value for `key` and mark it consumed.
    pub fn take(&mut self, key: &str) -> Option<&'a Value> {
        let (key, value) = self.map.get_key_value(key)?;
        self.consumed.insert(key.as_str());
        Some(value)
    }

    pub fn take_str(&mut self, key: &str) -> Result<Option<&'a str>, HandlerError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(HandlerError::type_error(format!("{key} must be a string"))),
        }
    }

    /// A string-to-string mapping; absent or null yields an empty context.
    pub fn take_context(&mut self, key: &str) -> Result<EncryptionContext, HandlerError> {
        let invalid = || HandlerError::type_error(format!("{key} must be a mapping"));

        match self.take(key) {
            None | Some(Value::Null) => Ok(EncryptionContext::new()),
            Some(Value::Object(entries)) => entries
                .iter()
                .map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())).ok_or_else(invalid))
                .collect(),
            Some(_) => Err(invalid()),
        }
    }

    /// Keys never consumed, sorted, excluding `tolerated`.
    pub fn unknown_keys(&self, tolerated: &[&str]) -> Vec<&'a str> {
        self.map
            .keys()
            .map(String::as_str)
            .filter(|key| !self.consumed.contains(key) && !tolerated.contains(key))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
