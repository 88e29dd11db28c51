//! Partial updates: compile a sparse set of field values into a `SET` list.
//!
//! ```ignore
//! use jobstore::{FieldMapping, PartialData, compile_set};
//!
//! const USERS: FieldMapping =
//!     FieldMapping::new(&[("firstName", "first_name"), ("lastName", "last_name")]);
//!
//! let data = PartialData::new().set("firstName", "user").set("lastName", "test");
//! let set = compile_set(&data, &USERS)?;
//! assert_eq!(set.to_sql(), r#""first_name"=$1, "last_name"=$2"#);
//! ```

use crate::error::{OrmError, OrmResult};
use crate::fields::FieldMapping;
use crate::ident::Ident;
use crate::sql::Sql;
use crate::value::SqlValue;
use serde::{Deserialize, Deserializer};

/// New values for a subset of an entity's fields, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialData {
    entries: Vec<(String, SqlValue)>,
}

impl PartialData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder style).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field. A field that is already present keeps its position and
    /// takes the new value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<SqlValue> {
        let pos = self.entries.iter().position(|(f, _)| f == field)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }

    /// Build from a JSON object, keeping the object's key order.
    pub fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> OrmResult<Self> {
        let mut data = Self::new();
        for (field, value) in map {
            let value = SqlValue::from_json(value).map_err(|e| match e {
                OrmError::Validation(msg) => OrmError::validation(format!("field '{field}': {msg}")),
                other => other,
            })?;
            data.insert(field, value);
        }
        Ok(data)
    }

    /// Build from a JSON value, which must be an object.
    pub fn from_json(value: serde_json::Value) -> OrmResult<Self> {
        match value {
            serde_json::Value::Object(map) => Self::from_json_map(map),
            other => Err(OrmError::validation(format!(
                "partial update must be a JSON object, got {other}"
            ))),
        }
    }

    /// Reject any of `fields` being present.
    pub(crate) fn deny(&self, fields: &[&str]) -> OrmResult<()> {
        match fields.iter().find(|f| self.contains(f)) {
            Some(field) => Err(OrmError::validation(format!(
                "field '{field}' cannot be updated"
            ))),
            None => Ok(()),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for PartialData
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (field, value) in iter {
            data.insert(field, value);
        }
        data
    }
}

impl<'de> Deserialize<'de> for PartialData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Self::from_json_map(map).map_err(serde::de::Error::custom)
    }
}

/// Compile `data` into a `SET` list: `"col1"=$1, "col2"=$2, ...`.
///
/// Columns are resolved through `fields` (falling back to the field name) and
/// emitted as quoted identifiers; values are only bound, never rendered. The
/// returned fragment numbers its placeholders from 1; appending it to a
/// statement with [`Sql::push_sql`] and then binding the row key gives the key
/// placeholder `data.len() + 1`.
///
/// Fails with [`OrmError::NoUpdateData`] if `data` is empty.
pub fn compile_set(data: &PartialData, fields: &FieldMapping) -> OrmResult<Sql> {
    if data.is_empty() {
        return Err(OrmError::NoUpdateData);
    }

    let mut set = Sql::empty();
    for (i, (field, value)) in data.iter().enumerate() {
        if i > 0 {
            set.push(", ");
        }
        let column = Ident::quoted(fields.column_for(field))?;
        set.push_ident(&column).push("=").push_bind(value.clone());
    }
    Ok(set)
}
