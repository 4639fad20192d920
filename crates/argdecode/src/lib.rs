//! Decode command-line arguments into typed records.
//!
//! Decoding runs in three steps:
//! - [`token::normalize`] pairs every name with one value (`--k=v` splitting,
//!   implicit `true` for bare flags, `-abc` clusters, `--` positionals)
//! - [`ArgIndex::build`] groups values by key, keeping argument order
//! - a [`Decoder`] assembled from small primitives reads the index and either
//!   produces a value or reports every failing field at once
//!
//! ```
//! use argdecode::{decode, field, flag, list, positional, string, int};
//!
//! let decoder = field(("name", 'n'), string())
//!     .and(flag(("verbose", 'v')))
//!     .and(list(("level", 'l'), int()))
//!     .and(positional());
//!
//! let args = ["--name=Lucy", "-vl8", "-l", "9", "math", "art"];
//! let (((name, verbose), levels), rest) = decode(&args, &decoder).unwrap();
//! assert_eq!(name, "Lucy");
//! assert!(verbose);
//! assert_eq!(levels, vec![8, 9]);
//! assert_eq!(rest, vec!["math", "art"]);
//!
//! let errors = decode(&["--level", "x"], &decoder).unwrap_err();
//! assert_eq!(errors.to_string(), "name: expected String, found nothing\nlevel.*: expected Int, found String");
//! ```

pub mod decoder;
pub mod error;
pub mod index;
pub mod token;
pub mod value;

pub use decoder::{
    Decoder, Key, ValueDecoder, boolean, count, fail, field, field_then, flag, float, int, list,
    optional, positional, string, succeed, with_default,
};
pub use error::{DecodeError, DecodeErrors, ErrorKind};
pub use index::{ArgIndex, Entry, POSITIONAL_KEY};
pub use token::{Normalized, normalize};
pub use value::{Scalar, Value};

/// Normalize `args`, index them, and run `decoder`.
///
/// `args` excludes the program name.
pub fn decode<S, T>(args: &[S], decoder: &Decoder<T>) -> Result<T, DecodeErrors>
where
    S: AsRef<str>,
    T: 'static,
{
    let normalized = normalize(args);
    let index = ArgIndex::build(&normalized);
    let result = decoder.run(&index);
    match &result {
        Ok(_) => tracing::debug!(
            keys = index.len(),
            positionals = index.positionals().len(),
            "decoded arguments"
        ),
        Err(errors) => tracing::debug!(errors = errors.len(), "argument decoding failed"),
    }
    result
}
