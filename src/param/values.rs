//! Parameter value maps.

use std::collections::BTreeMap;

use super::{ParamSpec, ParamValue, find_spec};
use crate::error::ParamError;

/// Parameter values keyed by id (or by `child.id` path for composites).
///
/// Ordered so that iteration and debug output are deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamValues(BTreeMap<String, ParamValue>);

impl ParamValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, id: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(id, value);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(id.into(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<&ParamValue> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn number(&self, id: &str) -> Option<f32> {
        self.get(id).and_then(ParamValue::as_number)
    }

    pub fn enum_value(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(ParamValue::as_enum)
    }

    pub fn color(&self, id: &str) -> Option<u32> {
        self.get(id).and_then(ParamValue::as_color)
    }

    pub fn boolean(&self, id: &str) -> Option<bool> {
        self.get(id).and_then(ParamValue::as_bool)
    }

    /// Values under `prefix.`, with the prefix removed.
    pub fn scoped(&self, prefix: &str) -> ParamValues {
        ParamValues(
            self.0
                .iter()
                .filter_map(|(k, v)| {
                    k.strip_prefix(prefix)
                        .and_then(|rest| rest.strip_prefix('.'))
                        .map(|rest| (rest.to_string(), v.clone()))
                })
                .collect(),
        )
    }

    /// Values without a `.` in their key.
    pub fn unscoped(&self) -> ParamValues {
        ParamValues(
            self.0
                .iter()
                .filter(|(k, _)| !k.contains('.'))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Insert every value of `other` under `prefix.`.
    pub fn extend_scoped(&mut self, prefix: &str, other: &ParamValues) {
        for (k, v) in other.iter() {
            self.0.insert(format!("{prefix}.{k}"), v.clone());
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ParamValues(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Complete, normalized value set for `schema`.
///
/// Missing ids get their default; present ones are normalized.
///
/// # Errors
/// Ids not in the schema and values of the wrong type are rejected.
pub fn resolve_values(schema: &[ParamSpec], values: &ParamValues) -> Result<ParamValues, ParamError> {
    if let Some((unknown, _)) = values.iter().find(|(id, _)| find_spec(schema, id).is_none()) {
        return Err(ParamError::UnknownParam(unknown.to_string()));
    }

    let mut resolved = ParamValues::new();
    for spec in schema {
        let value = match values.get(spec.id) {
            Some(value) => spec.normalize(value.clone())?,
            None => spec.default.clone(),
        };
        resolved.insert(spec.id, value);
    }
    Ok(resolved)
}
