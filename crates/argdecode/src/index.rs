//! The argument index: key -> one or many scalars, plus positionals.

use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::error::{DecodeError, DecodeErrors, NOTHING};
use crate::token::{Normalized, is_name};
use crate::value::Scalar;

/// Reserved key for positional arguments. Never a valid name because `_` is
/// not a letter.
pub const POSITIONAL_KEY: &str = "_";

/// Occurrences of one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    One(Scalar),
    /// Two or more occurrences, first occurrence first.
    Many(Vec<Scalar>),
}

impl Entry {
    fn push(&mut self, scalar: Scalar) {
        match self {
            Self::One(first) => {
                let first = first.clone();
                *self = Self::Many(vec![first, scalar]);
            }
            Self::Many(values) => values.push(scalar),
        }
    }

    /// All occurrences in argument order.
    pub fn values(&self) -> &[Scalar] {
        match self {
            Self::One(scalar) => std::slice::from_ref(scalar),
            Self::Many(values) => values.as_slice(),
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

/// Strip one or two leading dashes.
pub fn key_of(name: &str) -> &str {
    name.strip_prefix("--")
        .or_else(|| name.strip_prefix('-'))
        .unwrap_or(name)
}

/// Decoded view of a single argv, built once per `decode` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgIndex {
    entries: IndexMap<String, Entry>,
    positionals: Vec<String>,
}

impl ArgIndex {
    pub fn build(normalized: &Normalized) -> Self {
        let mut index = Self::default();
        for (name, value) in &normalized.pairs {
            index.insert(name, value);
        }
        index.positionals = normalized.positionals.clone();
        index
    }

    /// Build from an already-normalized flat `name value name value ...`
    /// stream. Every even position must hold a name and every name must be
    /// followed by a value.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, DecodeErrors> {
        let mut index = Self::default();
        let mut errors = Vec::new();
        for (pos, pair) in tokens.chunks(2).enumerate() {
            let name = pair[0].as_ref();
            let at = pos * 2;
            if !is_name(name) {
                errors.push(DecodeError::structural("Name", name, at));
                continue;
            }
            match pair.get(1) {
                Some(value) => index.insert(name, value.as_ref()),
                None => errors.push(DecodeError::structural("Value", NOTHING, at + 1)),
            }
        }
        match DecodeErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(index),
        }
    }

    fn insert(&mut self, name: &str, value: &str) {
        let key = key_of(name);
        let scalar = Scalar::new(value);
        tracing::trace!(key, value, "index insert");
        match self.entries.get_mut(key) {
            Some(entry) => entry.push(scalar),
            None => {
                self.entries.insert(key.to_string(), Entry::One(scalar));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.positionals.is_empty()
    }
}

impl Serialize for ArgIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.serialize_entry(POSITIONAL_KEY, &self.positionals)?;
        map.end()
    }
}
