//! Decoder combinators over an [`ArgIndex`].
//!
//! Two layers:
//! - [`ValueDecoder`] turns one [`Scalar`] into a `T` (`string`, `int`, `float`, `boolean`).
//! - [`Decoder`] reads keys out of the index (`field`, `list`, `flag`, ...) and
//!   composes into records with [`Decoder::and`] (accumulates every field's
//!   errors) or [`Decoder::and_then`] (continuation, stops at the first error).
//!
//! Decoders are immutable and cheap to clone; one decoder can be shared across
//! threads and reused for any number of `decode` calls.
//!
//! Long/short aliases: when both `--tag` and `-t` occur, the long-name values
//! come first, then the short-name values, each group in argument order.

use std::sync::Arc;

use crate::error::{ANY_ELEMENT, DecodeError, DecodeErrors};
use crate::index::{ArgIndex, Entry, key_of};
use crate::value::Scalar;

type ValueFn<T> = dyn Fn(&Scalar) -> Result<T, DecodeError> + Send + Sync;
type RunFn<T> = dyn Fn(&ArgIndex) -> Result<T, DecodeErrors> + Send + Sync;

/// Decodes a single scalar.
pub struct ValueDecoder<T> {
    expected: &'static str,
    run: Arc<ValueFn<T>>,
}

impl<T> Clone for ValueDecoder<T> {
    fn clone(&self) -> Self {
        Self {
            expected: self.expected,
            run: Arc::clone(&self.run),
        }
    }
}

impl<T: 'static> ValueDecoder<T> {
    /// `expected` is the type name reported in errors.
    pub fn new<F>(expected: &'static str, f: F) -> Self
    where
        F: Fn(&Scalar) -> Result<T, DecodeError> + Send + Sync + 'static,
    {
        Self {
            expected,
            run: Arc::new(f),
        }
    }

    pub fn expected(&self) -> &'static str {
        self.expected
    }

    pub fn decode(&self, scalar: &Scalar) -> Result<T, DecodeError> {
        (self.run)(scalar)
    }

    pub fn map<U, F>(self, f: F) -> ValueDecoder<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let run = self.run;
        ValueDecoder::new(self.expected, move |scalar| run(scalar).map(&f))
    }
}

/// Any value, as the text it was given as.
pub fn string() -> ValueDecoder<String> {
    ValueDecoder::new("String", |scalar| Ok(scalar.raw().to_string()))
}

pub fn int() -> ValueDecoder<i64> {
    ValueDecoder::new("Int", |scalar| {
        let value = scalar.value();
        value
            .as_int()
            .ok_or_else(|| DecodeError::mismatch("Int", value.type_name()))
    })
}

/// Floats, and integers widened to floats.
pub fn float() -> ValueDecoder<f64> {
    ValueDecoder::new("Float", |scalar| {
        let value = scalar.value();
        value
            .as_float()
            .ok_or_else(|| DecodeError::mismatch("Float", value.type_name()))
    })
}

/// Exactly `true`/`True`/`false`/`False`.
pub fn boolean() -> ValueDecoder<bool> {
    ValueDecoder::new("Bool", |scalar| {
        let value = scalar.value();
        value
            .as_bool()
            .ok_or_else(|| DecodeError::mismatch("Bool", value.type_name()))
    })
}

/// A field name with an optional short alias.
///
/// Names may be given with or without dashes. Errors report the long name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    long: String,
    short: Option<String>,
}

impl Key {
    pub fn new(long: impl AsRef<str>) -> Self {
        Self {
            long: key_of(long.as_ref()).to_string(),
            short: None,
        }
    }

    pub fn short(mut self, short: impl AsRef<str>) -> Self {
        let short = key_of(short.as_ref());
        self.short = (short != self.long).then(|| short.to_string());
        self
    }

    /// The name used in error paths.
    pub fn name(&self) -> &str {
        &self.long
    }
}

impl From<&str> for Key {
    fn from(long: &str) -> Self {
        Self::new(long)
    }
}

impl From<String> for Key {
    fn from(long: String) -> Self {
        Self::new(long)
    }
}

impl From<(&str, &str)> for Key {
    fn from((long, short): (&str, &str)) -> Self {
        Self::new(long).short(short)
    }
}

impl From<(&str, char)> for Key {
    fn from((long, short): (&str, char)) -> Self {
        Self::new(long).short(short.to_string())
    }
}

enum Lookup<'a> {
    Absent,
    One(&'a Scalar),
    Many(Vec<&'a Scalar>),
}

fn lookup<'a>(index: &'a ArgIndex, key: &Key) -> Lookup<'a> {
    let long = index.get(&key.long);
    let short = key.short.as_deref().and_then(|s| index.get(s));
    match (long, short) {
        (None, None) => Lookup::Absent,
        (Some(Entry::One(scalar)), None) | (None, Some(Entry::One(scalar))) => Lookup::One(scalar),
        (long, short) => Lookup::Many(
            long.into_iter()
                .chain(short)
                .flat_map(Entry::values)
                .collect(),
        ),
    }
}

/// Reads an [`ArgIndex`] into a `T`.
pub struct Decoder<T> {
    run: Arc<RunFn<T>>,
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T: 'static> Decoder<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ArgIndex) -> Result<T, DecodeErrors> + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    pub fn run(&self, index: &ArgIndex) -> Result<T, DecodeErrors> {
        (self.run)(index)
    }

    pub fn map<U, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Decoder::new(move |index| self.run(index).map(&f))
    }

    /// Run both decoders; on failure report the errors of both, ours first.
    pub fn and<U: 'static>(self, other: Decoder<U>) -> Decoder<(T, U)> {
        Decoder::new(move |index| match (self.run(index), other.run(index)) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(a), Err(b)) => Err(a.merge(b)),
        })
    }

    /// Continue with a decoder built from our value. Stops at our error.
    pub fn and_then<U, F>(self, next: F) -> Decoder<U>
    where
        U: 'static,
        F: Fn(T) -> Decoder<U> + Send + Sync + 'static,
    {
        Decoder::new(move |index| {
            let value = self.run(index)?;
            next(value).run(index)
        })
    }

    /// `None` when every error is a missing key; malformed values still fail.
    pub fn optional(self) -> Decoder<Option<T>> {
        Decoder::new(move |index| match self.run(index) {
            Ok(value) => Ok(Some(value)),
            Err(errors) if errors.all_missing() => Ok(None),
            Err(errors) => Err(errors),
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Decoder<T> {
    /// Substitute `default` for missing input only.
    pub fn with_default(self, default: T) -> Decoder<T> {
        Decoder::new(move |index| match self.run(index) {
            Err(errors) if errors.all_missing() => Ok(default.clone()),
            other => other,
        })
    }
}

/// A required single-occurrence field.
pub fn field<T: 'static>(key: impl Into<Key>, decoder: ValueDecoder<T>) -> Decoder<T> {
    let key = key.into();
    Decoder::new(move |index| match lookup(index, &key) {
        Lookup::Absent => Err(DecodeError::missing(decoder.expected(), key.name()).into()),
        Lookup::One(scalar) => decoder
            .decode(scalar)
            .map_err(|e| DecodeErrors::from(e.at(key.name()))),
        Lookup::Many(_) => Err(DecodeError::cardinality(decoder.expected(), key.name()).into()),
    })
}

/// A field that may occur any number of times (at least once).
///
/// A single occurrence decodes as a one-element list. Every bad element is
/// reported, with path `[key, "*"]`.
pub fn list<T: 'static>(key: impl Into<Key>, decoder: ValueDecoder<T>) -> Decoder<Vec<T>> {
    let key = key.into();
    Decoder::new(move |index| {
        let scalars = match lookup(index, &key) {
            Lookup::Absent => return Err(DecodeError::missing("List", key.name()).into()),
            Lookup::One(scalar) => vec![scalar],
            Lookup::Many(scalars) => scalars,
        };
        let mut values = Vec::with_capacity(scalars.len());
        let mut errors = Vec::new();
        for scalar in scalars {
            match decoder.decode(scalar) {
                Ok(value) => values.push(value),
                Err(e) => errors.push(e.at(ANY_ELEMENT).at(key.name())),
            }
        }
        match DecodeErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(values),
        }
    })
}

/// A boolean switch: absent is `false`, a bare name is `true`.
pub fn flag(key: impl Into<Key>) -> Decoder<bool> {
    field(key, boolean()).with_default(false)
}

/// Number of times a switch was given as `true`, e.g. verbosity from
/// `-v -v -v` or `-vvv`. Absent is zero.
pub fn count(key: impl Into<Key>) -> Decoder<usize> {
    let key = key.into();
    let decoder = boolean();
    Decoder::new(move |index| {
        let scalars = match lookup(index, &key) {
            Lookup::Absent => return Ok(0),
            Lookup::One(scalar) => vec![scalar],
            Lookup::Many(scalars) => scalars,
        };
        let mut total = 0;
        for scalar in scalars {
            if decoder.decode(scalar).map_err(|e| e.at(key.name()))? {
                total += 1;
            }
        }
        Ok(total)
    })
}

/// A single-occurrence field that may be absent.
pub fn optional<T: 'static>(key: impl Into<Key>, decoder: ValueDecoder<T>) -> Decoder<Option<T>> {
    field(key, decoder).optional()
}

/// Substitute `default` when `decoder` reports only missing keys.
pub fn with_default<T: Clone + Send + Sync + 'static>(decoder: Decoder<T>, default: T) -> Decoder<T> {
    decoder.with_default(default)
}

/// Positional arguments, verbatim and in order. Never fails.
pub fn positional() -> Decoder<Vec<String>> {
    Decoder::new(|index| Ok(index.positionals().to_vec()))
}

/// Ignore the index and produce `value`.
pub fn succeed<T: Clone + Send + Sync + 'static>(value: T) -> Decoder<T> {
    Decoder::new(move |_| Ok(value.clone()))
}

/// Always fail with a type mismatch at the root.
pub fn fail<T: 'static>(expected: &'static str, found: impl Into<String>) -> Decoder<T> {
    let found = found.into();
    Decoder::new(move |_| Err(DecodeError::mismatch(expected, found.clone()).into()))
}

/// Continuation-style field extraction: decode `key`, then hand the value to
/// `next` to build the rest of the decoder.
pub fn field_then<T, U, F>(key: impl Into<Key>, decoder: ValueDecoder<T>, next: F) -> Decoder<U>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> Decoder<U> + Send + Sync + 'static,
{
    field(key, decoder).and_then(next)
}
