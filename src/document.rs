//! An ordered JSON object with typed accessors. Additions never overwrite an
//! existing entry, and serialization always emits keys in sorted order so
//! equal content yields byte-identical output.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    map: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.map.get(key) {
            Some(Value::String(value)) => Ok(value),
            _ => Err(Error::not_found(format!("no string value for '{key}'"))),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        match self.map.get(key) {
            None => Err(Error::not_found(format!("no value for '{key}'"))),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| Error::wrong_type(format!("value for '{key}' is not an integer"))),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.map.get(key) {
            None => Err(Error::not_found(format!("no value for '{key}'"))),
            Some(Value::Bool(value)) => Ok(*value),
            Some(_) => Err(Error::wrong_type(format!(
                "value for '{key}' is not a boolean"
            ))),
        }
    }

    /// Compact serialization of one value, or of the whole document when
    /// `key` is `None`.
    pub fn get_json(&self, key: Option<&str>) -> Result<String> {
        match key {
            None => self.serialize(false),
            Some(key) => {
                let value = self
                    .map
                    .get(key)
                    .ok_or_else(|| Error::not_found(format!("no value for '{key}'")))?;
                Ok(serde_json::to_string(&sorted(value))?)
            }
        }
    }

    pub fn add_str(&mut self, key: &str, value: &str) -> Result<()> {
        self.add_value(key, Value::String(value.to_string()))
    }

    pub fn add_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.add_value(key, Value::from(value))
    }

    pub fn add_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.add_value(key, Value::Bool(value))
    }

    fn add_value(&mut self, key: &str, value: Value) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid("key is required"));
        }
        if self.map.contains_key(key) {
            return Err(Error::already_exists(format!("'{key}' already set")));
        }
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    /// Merges a JSON object into the document. Keys already present keep
    /// their current value.
    pub fn add_json(&mut self, text: &str) -> Result<()> {
        let parsed: Value = serde_json::from_str(text)?;
        let Value::Object(incoming) = parsed else {
            return Err(Error::invalid("merged JSON must be an object"));
        };
        for (key, value) in incoming {
            if !self.map.contains_key(&key) {
                self.map.insert(key, value);
            }
        }
        Ok(())
    }

    /// Deletes one key, or every key when `key` is `None`. Deleting a
    /// missing key is not an error.
    pub fn del(&mut self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.map.remove(key);
            }
            None => self.map.clear(),
        }
    }

    /// Serializes with sorted keys. Pretty output is wrapped in newlines and
    /// indented by four spaces per level.
    pub fn serialize(&self, pretty: bool) -> Result<String> {
        let value = sorted(&Value::Object(self.map.clone()));
        if !pretty {
            return Ok(serde_json::to_string(&value)?);
        }
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut ser)?;
        Ok(format!("\n{}\n", String::from_utf8_lossy(&buf)))
    }

    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self { map }
    }
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = Map::new();
            for (key, value) in entries {
                out.insert(key.clone(), sorted(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
