//! Records and field maps
//!
//! A [`Record`] is what the store hands back to callers: the system-assigned
//! id, the caller's field map, and creation/update timestamps. Timestamps live
//! outside the field map so a record's fields are exactly what was written.
//!
//! Records are plain values. Every record a caller holds is a copy; editing
//! it never reaches the store without an explicit update.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::name::{validate_field_name, ID_FIELD};
use crate::timestamp::Timestamp;
use crate::value::Value;

/// Integer identifier assigned by the store, unique within a collection
pub type RecordId = u64;

/// Ordered map of field name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    /// Create an empty field map
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    ///
    /// ```
    /// use collstore_core::Fields;
    ///
    /// let fields = Fields::new().with("name", "Alice").with("age", 30);
    /// assert_eq!(fields.len(), 2);
    /// ```
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Insert a field, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Check whether a field is present
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Overwrite fields named in `patch`, keep the rest
    pub fn merge(&mut self, patch: Fields) {
        self.0.extend(patch.0);
    }

    /// Check every field name is writable by a caller
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name or the reserved `id` field.
    pub fn validate(&self) -> Result<()> {
        for name in self.0.keys() {
            validate_field_name(name)?;
        }
        Ok(())
    }

    /// Convert a JSON object into a field map
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `json` is not an object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect()),
            other => Err(Error::invalid_argument(format!(
                "fields must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Convert into a JSON object
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
            .collect()
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A stored record as seen by callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    fields: Fields,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Record {
    /// Create a record stamped with `at` as both creation and update time
    pub fn new(id: RecordId, fields: Fields, at: Timestamp) -> Self {
        Self {
            id,
            fields,
            created_at: at,
            updated_at: at,
        }
    }

    /// System-assigned id
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Field map (never contains `id`)
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Mutable field map of this copy
    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    /// Consume the record, keeping its fields
    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Look up a field; `"id"` resolves to the record id
    pub fn get(&self, field: &str) -> Option<Value> {
        if field == ID_FIELD {
            return Some(Value::Int(self.id as i64));
        }
        self.fields.get(field).cloned()
    }

    /// Creation time
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last update time
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Merge `patch` into the fields and bump `updated_at`
    pub fn apply_patch(&mut self, patch: Fields, at: Timestamp) {
        self.fields.merge(patch);
        self.updated_at = at;
    }

    /// Replace all fields and bump `updated_at`; id and `created_at` stay
    pub fn replace_fields(&mut self, fields: Fields, at: Timestamp) {
        self.fields = fields;
        self.updated_at = at;
    }

    /// JSON object of the fields plus the integer `id`
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = self.fields.to_json();
        map.insert(ID_FIELD.to_string(), serde_json::Value::from(self.id));
        serde_json::Value::Object(map)
    }
}
