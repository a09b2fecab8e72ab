//! Typed decoders for path segments and query values.
//!
//! A [`Decoder<T>`] turns a raw string into a `T` or a [`DecodeError`].
//! Decoders are plain values: every path variable and query parameter
//! carries its own decoder, and one decoder can be shared by any number of
//! patterns.
//!
//! ```
//! use typed_router::decoder::{self, Decoder};
//!
//! #[derive(Debug, PartialEq)]
//! struct Year(i32);
//!
//! let year: Decoder<Year> = decoder::int().try_map(|n| {
//!     if (1..=9999).contains(&n) {
//!         Ok(Year(n))
//!     } else {
//!         Err("year out of range")
//!     }
//! });
//!
//! assert_eq!(year.decode("2016").unwrap(), Year(2016));
//! assert!(year.decode("20x6").is_err());
//! ```

use crate::router::Value;

use std::any::{type_name, Any};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A value-level decode failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("can not decode {input:?} as {expected}: {reason}")]
pub struct DecodeError {
    input: String,
    expected: String,
    reason: String,
}

impl DecodeError {
    pub fn new(
        input: impl Into<String>,
        expected: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
            reason: reason.into(),
        }
    }

    /// The raw string that failed to decode.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The label of the decoder that rejected the input.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

type DecodeFn<T> = dyn Fn(&str) -> Result<T, String> + Send + Sync;

/// Identity of a decoding function. Builtins are identified by name; every
/// other decoder gets a fresh id when it is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecoderId {
    Builtin(&'static str),
    Unique(usize),
}

impl DecoderId {
    fn unique() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        Self::Unique(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A pure function from a raw string to `T`.
///
/// The label names the decoded type. It shows up in error messages and in
/// the textual form of patterns.
///
/// Clones share the identity of the original, and so does a decoder
/// relabelled with [`named`](Decoder::named). Two rules on the same path
/// collide only if their decoders share an identity.
pub struct Decoder<T> {
    label: Arc<str>,
    id: DecoderId,
    f: Arc<DecodeFn<T>>,
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            id: self.id,
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Decoder").field(&&*self.label).finish()
    }
}

impl<T: 'static> Decoder<T> {
    pub fn new<F, E>(label: &str, f: F) -> Self
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            label: label.into(),
            id: DecoderId::unique(),
            f: Arc::new(move |input: &str| f(input).map_err(|e| e.to_string())),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn id(&self) -> DecoderId {
        self.id
    }

    pub fn decode(&self, input: &str) -> Result<T, DecodeError> {
        (self.f)(input).map_err(|reason| DecodeError::new(input, &*self.label, reason))
    }

    /// Replaces the label of this decoder.
    pub fn named(self, label: &str) -> Self {
        Self {
            label: label.into(),
            id: self.id,
            f: self.f,
        }
    }

    /// Builds a decoder for `U` by passing every decoded `T` through a total
    /// function.
    pub fn map<U, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = self.f;
        Decoder {
            label: short_type_name::<U>().into(),
            id: DecoderId::unique(),
            f: Arc::new(move |input: &str| inner(input).map(&f)),
        }
    }

    /// Builds a decoder for `U` from a partial function. An `Err` returned by
    /// `f` becomes a decode failure.
    pub fn try_map<U, E, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        E: fmt::Display,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let inner = self.f;
        Decoder {
            label: short_type_name::<U>().into(),
            id: DecoderId::unique(),
            f: Arc::new(move |input: &str| {
                let value = inner(input)?;
                f(value).map_err(|e| e.to_string())
            }),
        }
    }
}

/// Decodes any string, including the empty one.
pub fn string() -> Decoder<String> {
    Decoder {
        label: "String".into(),
        id: DecoderId::Builtin("String"),
        f: Arc::new(|input: &str| Ok(input.to_owned())),
    }
}

/// Optionally signed decimal `i32`.
pub fn int() -> Decoder<i32> {
    parse_as("Int", DecoderId::Builtin("Int"))
}

/// Optionally signed decimal `i64`.
pub fn long() -> Decoder<i64> {
    parse_as("Long", DecoderId::Builtin("Long"))
}

/// `true` or `false`.
pub fn boolean() -> Decoder<bool> {
    parse_as("Boolean", DecoderId::Builtin("Boolean"))
}

/// A decoder backed by the [`FromStr`] implementation of `T`, labelled with
/// the name of `T`.
pub fn parse<T>() -> Decoder<T>
where
    T: FromStr + 'static,
    T::Err: fmt::Display,
{
    parse_as(short_type_name::<T>(), DecoderId::Builtin(type_name::<T>()))
}

fn parse_as<T>(label: &str, id: DecoderId) -> Decoder<T>
where
    T: FromStr + 'static,
    T::Err: fmt::Display,
{
    Decoder {
        id,
        ..Decoder::new(label, |input: &str| input.parse::<T>())
    }
}

fn short_type_name<T>() -> &'static str {
    let name = type_name::<T>();
    match name.find('<') {
        Some(generic) => name[..generic].rsplit("::").next().unwrap_or(name),
        None => name.rsplit("::").next().unwrap_or(name),
    }
}

/// A decoder whose output type has been erased, so that elements decoding
/// to different types can live in one pattern.
#[derive(Clone)]
pub(crate) struct ErasedDecoder {
    label: Arc<str>,
    id: DecoderId,
    f: Arc<dyn Fn(&str) -> Result<Value, DecodeError> + Send + Sync>,
}

impl ErasedDecoder {
    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn id(&self) -> DecoderId {
        self.id
    }

    pub(crate) fn decode(&self, input: &str) -> Result<Value, DecodeError> {
        (self.f)(input)
    }
}

impl<T: Any + Send + Sync> From<Decoder<T>> for ErasedDecoder {
    fn from(decoder: Decoder<T>) -> Self {
        let label = Arc::clone(&decoder.label);
        Self {
            label,
            id: decoder.id,
            f: Arc::new(move |input: &str| {
                decoder.decode(input).map(|v| Box::new(v) as Value)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Year(i32);

    impl Year {
        fn of(n: i32) -> Result<Year, String> {
            if (-999_999_999..=999_999_999).contains(&n) {
                Ok(Year(n))
            } else {
                Err(format!("invalid year: {}", n))
            }
        }
    }

    #[test]
    fn integers() {
        assert_eq!(int().decode("42").unwrap(), 42);
        assert_eq!(int().decode("-42").unwrap(), -42);
        assert_eq!(int().decode("+7").unwrap(), 7);
        assert!(int().decode("").is_err());
        assert!(int().decode("abc").is_err());
        assert!(int().decode(" 1").is_err());
        assert!(int().decode("2147483648").is_err());
        assert_eq!(long().decode("2147483648").unwrap(), 2_147_483_648);
        assert!(long().decode("9223372036854775808").is_err());
    }

    #[test]
    fn composed_year() {
        let year = int().try_map(Year::of);
        assert_eq!(year.label(), "Year");
        assert_eq!(year.decode("2016").unwrap(), Year(2016));

        let err = year.decode("20x6").unwrap_err();
        assert_eq!(err.input(), "20x6");
        assert_eq!(err.expected(), "Year");

        let err = year.decode("2000000000").unwrap_err();
        assert_eq!(err.reason(), "invalid year: 2000000000");
    }

    #[test]
    fn map_and_named() {
        let doubled = int().map(|n| i64::from(n) * 2).named("Doubled");
        assert_eq!(doubled.label(), "Doubled");
        assert_eq!(doubled.decode("21").unwrap(), 42);
        assert_eq!(doubled.decode("x").unwrap_err().expected(), "Doubled");
    }

    #[test]
    fn from_str_decoders() {
        let ip = parse::<std::net::Ipv4Addr>();
        assert_eq!(ip.label(), "Ipv4Addr");
        assert!(ip.decode("127.0.0.1").is_ok());
        assert!(ip.decode("localhost").is_err());

        assert!(boolean().decode("true").unwrap());
        assert!(boolean().decode("yes").is_err());
        assert_eq!(string().decode("").unwrap(), "");
    }

    #[test]
    fn identity() {
        assert_eq!(int().id(), int().id());
        assert_eq!(parse::<u8>().id(), parse::<u8>().id());
        assert_ne!(int().id(), parse::<i32>().id());

        let year = int().try_map(|n| if n > 0 { Ok(n) } else { Err("not positive") });
        assert_eq!(year.id(), year.clone().named("Positive").id());
        assert_ne!(int().map(i64::from).id(), parse::<i64>().id());
        assert_ne!(int().map(i64::from).id(), int().map(i64::from).id());

        let erased = ErasedDecoder::from(year.clone());
        assert_eq!(erased.id(), year.id());
    }

    #[test]
    fn erased() {
        let erased = ErasedDecoder::from(int());
        assert_eq!(erased.label(), "Int");
        let value = erased.decode("5").unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&5));
        assert!(erased.decode("five").is_err());
    }
}
