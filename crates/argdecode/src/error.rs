//! Structured, path-aware decode errors.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// `found` value reported for an absent key.
pub const NOTHING: &str = "nothing";

/// Path segment standing for "some element of a list".
pub const ANY_ELEMENT: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The key is absent from the index.
    Missing,
    /// A value exists but has the wrong type.
    Mismatch,
    /// A single value was wanted but the key occurred more than once.
    Cardinality,
    /// The token stream itself is malformed.
    Structural,
}

/// One decode failure: what was wanted, what was there, and where.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}: expected {expected}, found {found}", display_path(.path))]
pub struct DecodeError {
    pub kind: ErrorKind,
    pub expected: String,
    pub found: String,
    pub path: Vec<String>,
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

impl DecodeError {
    pub fn missing(expected: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Missing,
            expected: expected.into(),
            found: NOTHING.to_string(),
            path: vec![key.into()],
        }
    }

    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Mismatch,
            expected: expected.into(),
            found: found.into(),
            path: Vec::new(),
        }
    }

    pub fn cardinality(expected: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Cardinality,
            expected: expected.into(),
            found: "List".to_string(),
            path: vec![key.into()],
        }
    }

    /// A malformed token stream; the path is the token position.
    pub fn structural(
        expected: impl Into<String>,
        found: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            kind: ErrorKind::Structural,
            expected: expected.into(),
            found: found.into(),
            path: vec![position.to_string()],
        }
    }

    /// Prefix the path with `segment`.
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    pub fn is_missing(&self) -> bool {
        self.kind == ErrorKind::Missing
    }
}

/// A non-empty list of decode errors, in the order fields were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecodeErrors(Vec<DecodeError>);

impl DecodeErrors {
    /// `None` when `errors` is empty.
    pub fn from_vec(errors: Vec<DecodeError>) -> Option<Self> {
        (!errors.is_empty()).then_some(Self(errors))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecodeError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> &DecodeError {
        &self.0[0]
    }

    /// Whether every error is a missing key (no malformed input).
    pub fn all_missing(&self) -> bool {
        self.0.iter().all(DecodeError::is_missing)
    }

    /// Append `other`'s errors after ours.
    pub fn merge(mut self, other: DecodeErrors) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn into_vec(self) -> Vec<DecodeError> {
        self.0
    }
}

impl From<DecodeError> for DecodeErrors {
    fn from(err: DecodeError) -> Self {
        Self(vec![err])
    }
}

impl fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeErrors {}

impl IntoIterator for DecodeErrors {
    type Item = DecodeError;
    type IntoIter = std::vec::IntoIter<DecodeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DecodeErrors {
    type Item = &'a DecodeError;
    type IntoIter = std::slice::Iter<'a, DecodeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
