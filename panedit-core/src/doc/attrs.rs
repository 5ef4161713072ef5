//! Attribute bags for nodes and marks, and the shared Pandoc attribute record

use crate::error::ReadError;
use crate::pandoc::TokenValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const ATTR_ID: &str = "id";
pub const ATTR_CLASSES: &str = "classes";
pub const ATTR_KEYVALUE: &str = "keyvalue";

/// Ordered attribute map. Values are plain JSON so nodes serialize as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs(BTreeMap<String, Value>);

impl Attrs {
    pub fn new() -> Self {
        Attrs(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Fill in any key missing from `self` with the value from `defaults`.
    pub fn with_defaults(mut self, defaults: &[(String, Value)]) -> Self {
        for (key, value) in defaults {
            self.0.entry(key.clone()).or_insert_with(|| value.clone());
        }
        self
    }

    /// Overlay every key of `other` onto `self`.
    pub fn merged(mut self, other: &Attrs) -> Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }
}

impl FromIterator<(String, Value)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Attrs(iter.into_iter().collect())
    }
}

/// The `(id, classes, key-value pairs)` triple Pandoc attaches to headings,
/// code, links, images, and spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PandocAttr {
    pub id: String,
    pub classes: Vec<String>,
    pub keyvalue: Vec<(String, String)>,
}

impl PandocAttr {
    /// Whether any part is present; only then is the record offered for editing.
    pub fn is_available(&self) -> bool {
        !self.id.is_empty() || !self.classes.is_empty() || !self.keyvalue.is_empty()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Decode the `[id, [classes], [[k, v]]]` triple.
    pub fn from_token_value(value: &TokenValue, token: &str) -> Result<Self, ReadError> {
        let parts = value
            .as_array()
            .filter(|parts| parts.len() == 3)
            .ok_or_else(|| ReadError::malformed(token, "attribute must be a triple"))?;

        let id = parts[0]
            .as_str()
            .ok_or_else(|| ReadError::malformed(token, "attribute id must be a string"))?
            .to_string();

        let classes = parts[1]
            .as_array()
            .ok_or_else(|| ReadError::malformed(token, "attribute classes must be an array"))?
            .iter()
            .map(|c| {
                c.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ReadError::malformed(token, "class must be a string"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let keyvalue = parts[2]
            .as_array()
            .ok_or_else(|| ReadError::malformed(token, "attribute pairs must be an array"))?
            .iter()
            .map(|pair| match pair.as_array() {
                Some([TokenValue::Str(k), TokenValue::Str(v)]) => Ok((k.clone(), v.clone())),
                _ => Err(ReadError::malformed(token, "attribute pair must be [key, value]")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PandocAttr {
            id,
            classes,
            keyvalue,
        })
    }

    pub fn to_token_value(&self) -> TokenValue {
        TokenValue::Array(vec![
            TokenValue::Str(self.id.clone()),
            TokenValue::Array(self.classes.iter().map(|c| TokenValue::Str(c.clone())).collect()),
            TokenValue::Array(
                self.keyvalue
                    .iter()
                    .map(|(k, v)| TokenValue::Array(vec![k.as_str().into(), v.as_str().into()]))
                    .collect(),
            ),
        ])
    }

    /// Read the record back from the `id`/`classes`/`keyvalue` node attributes.
    pub fn from_attrs(attrs: &Attrs) -> Self {
        let id = attrs.get_str(ATTR_ID).unwrap_or_default().to_string();
        let classes = attrs
            .get(ATTR_CLASSES)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let keyvalue = attrs
            .get(ATTR_KEYVALUE)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|pair| {
                        let pair = pair.as_array()?;
                        Some((
                            pair.first()?.as_str()?.to_string(),
                            pair.get(1)?.as_str()?.to_string(),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();
        PandocAttr {
            id,
            classes,
            keyvalue,
        }
    }

    /// Store the record into node attributes.
    pub fn write_to(&self, attrs: &mut Attrs) {
        attrs.set(ATTR_ID, self.id.clone());
        attrs.set(ATTR_CLASSES, self.classes.clone());
        attrs.set(
            ATTR_KEYVALUE,
            Value::Array(
                self.keyvalue
                    .iter()
                    .map(|(k, v)| Value::Array(vec![k.clone().into(), v.clone().into()]))
                    .collect(),
            ),
        );
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        self.write_to(&mut attrs);
        attrs
    }

    /// Default attribute entries for specs that carry a Pandoc attribute.
    pub fn spec_defaults() -> Vec<(String, Value)> {
        vec![
            (ATTR_ID.to_string(), Value::from("")),
            (ATTR_CLASSES.to_string(), Value::Array(vec![])),
            (ATTR_KEYVALUE.to_string(), Value::Array(vec![])),
        ]
    }
}
