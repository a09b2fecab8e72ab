use crate::decoder::DecodeError;

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use smallvec::SmallVec;

pub(crate) type Value = Box<dyn Any + Send + Sync>;

/// Values bound by a successful match, in declaration order: path elements
/// first, then query parameters.
///
/// Each value keeps the type its decoder produced. A path variable decoded
/// with `decoder::int()` is read back with `get::<i32>`, a remainder with
/// `get::<Vec<String>>`, an optional query parameter with `get::<Option<T>>`.
#[derive(Default)]
pub struct Captures {
    buf: SmallVec<[(Arc<str>, Value); 8]>,
    errors: Vec<(Arc<str>, DecodeError)>,
}

impl Captures {
    /// Returns the first value bound under `name` if it has type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.buf
            .iter()
            .find(|(k, _)| &**k == name)
            .and_then(|(_, v)| v.downcast_ref::<T>())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get::<String>(name).map(String::as_str)
    }

    /// Parses a string capture.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.get_str(name).map(T::from_str)
    }

    /// Removes the first value bound under `name` and returns it if it has
    /// type `T`. A value of another type is left in place.
    pub fn take<T: Any>(&mut self, name: &str) -> Option<T> {
        let pos = self.buf.iter().position(|(k, _)| &**k == name)?;
        if !self.buf[pos].1.is::<T>() {
            return None;
        }
        let (_, value) = self.buf.remove(pos);
        value.downcast::<T>().ok().map(|b| *b)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.buf.iter().any(|(k, _)| &**k == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.buf.iter().map(|(k, _)| &**k)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Decode failures collected by validated query parameters.
    pub fn decode_errors(&self) -> impl Iterator<Item = (&str, &DecodeError)> + '_ {
        self.errors.iter().map(|(k, e)| (&**k, e))
    }

    pub fn has_decode_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Captures {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: Arc<str>, value: Value) {
        self.buf.push((name, value))
    }

    pub(crate) fn push_error(&mut self, name: Arc<str>, error: DecodeError) {
        self.errors.push((name, error))
    }
}

impl fmt::Debug for Captures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Captures")
            .field("names", &self.names().collect::<SmallVec<[&str; 8]>>())
            .field("errors", &self.errors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Captures {
        let mut caps = Captures::new();
        caps.push("id".into(), Box::new(42_i32));
        caps.push("name".into(), Box::new(String::from("asd")));
        caps.push("id".into(), Box::new(String::from("shadowed")));
        caps
    }

    #[test]
    fn typed_access() {
        let caps = sample();
        assert_eq!(caps.len(), 3);
        assert_eq!(caps.get::<i32>("id"), Some(&42));
        assert_eq!(caps.get::<i64>("id"), None);
        assert_eq!(caps.get_str("name"), Some("asd"));
        assert_eq!(caps.get_str("missing"), None);
        assert_eq!(caps.names().collect::<Vec<_>>(), ["id", "name", "id"]);
    }

    #[test]
    fn take_keeps_mismatched_types() {
        let mut caps = sample();
        assert_eq!(caps.take::<String>("id"), None);
        assert_eq!(caps.take::<i32>("id"), Some(42));
        assert_eq!(caps.get_str("id"), Some("shadowed"));
        assert_eq!(caps.len(), 2);
    }

    #[test]
    fn parse_string_capture() {
        let mut caps = Captures::new();
        caps.push("n".into(), Box::new(String::from("12")));
        assert_eq!(caps.parse::<u8>("n"), Some(Ok(12)));
        assert!(caps.parse::<u8>("missing").is_none());
    }
}
