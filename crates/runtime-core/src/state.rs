//! Insertion-ordered state dict container

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Error, ParamValue, Result};

/// Mapping from layer name to value that keeps insertion order.
///
/// Inserting an existing key replaces its value and keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDict<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> StateDict<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a value, returning the previous one if the key existed
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        match self.index.get(key) {
            Some(&pos) => Some(&mut self.entries[pos].1),
            None => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Remove a key, shifting later entries down
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> Default for StateDict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, V)> for StateDict<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut dict = StateDict::new();
        dict.extend(iter);
        dict
    }
}

impl<V> Extend<(String, V)> for StateDict<V> {
    fn extend<I: IntoIterator<Item = (String, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<V> IntoIterator for StateDict<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for StateDict<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for StateDict<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<(String, V)>::deserialize(deserializer).map(StateDict::from_iter)
    }
}

/// Node of a raw checkpoint: either a nested dict or a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
    Dict(StateDict<StateValue>),
    Param(ParamValue),
}

impl From<ParamValue> for StateValue {
    fn from(value: ParamValue) -> Self {
        StateValue::Param(value)
    }
}

impl From<StateDict<StateValue>> for StateValue {
    fn from(dict: StateDict<StateValue>) -> Self {
        StateValue::Dict(dict)
    }
}

/// A deserialized checkpoint file
pub type CheckpointTree = StateDict<StateValue>;

impl StateDict<StateValue> {
    /// Move the nested dict stored under `key` out of this tree
    pub fn take_dict(&mut self, key: &str) -> Result<StateDict<StateValue>> {
        match self.remove(key) {
            Some(StateValue::Dict(dict)) => Ok(dict),
            Some(StateValue::Param(_)) => Err(Error::UnexpectedStateValue {
                key: key.to_string(),
                expected: "a nested state dict".to_string(),
            }),
            None => Err(Error::MissingStateDictKey {
                key: key.to_string(),
            }),
        }
    }

    /// Flatten one level into a parameter dict. Nested dicts are rejected.
    pub fn into_params(self) -> Result<StateDict<ParamValue>> {
        self.into_iter()
            .map(|(key, value)| match value {
                StateValue::Param(param) => Ok((key, param)),
                StateValue::Dict(_) => Err(Error::UnexpectedStateValue {
                    key,
                    expected: "a parameter".to_string(),
                }),
            })
            .collect()
    }
}
