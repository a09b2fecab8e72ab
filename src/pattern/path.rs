use crate::decoder::{self, Decoder, ErasedDecoder};
use crate::router::Captures;

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::trace;

const STAR: char = '*';
const COLON: char = ':';
const SLASH: char = '/';
const DOT: char = '.';

#[derive(Clone)]
pub(crate) enum Element {
    Literal(Box<str>),
    Variable {
        name: Arc<str>,
        decoder: ErasedDecoder,
    },
    Remainder {
        name: Arc<str>,
    },
    Extension {
        name: Arc<str>,
        decoder: ErasedDecoder,
        ext: Box<str>,
    },
}

/// A sequence of path elements.
///
/// Patterns can be written with the builder methods or parsed from a string:
///
/// | syntax       | element                                           |
/// |--------------|---------------------------------------------------|
/// | `users`      | literal segment                                   |
/// | `:id`        | one segment, bound as `String`                    |
/// | `:name.json` | last segment split at its last `.`, stem bound    |
/// | `*rest`      | every remaining segment, bound as `Vec<String>`   |
///
/// ```
/// use typed_router::{decoder, PathPattern};
///
/// let typed = PathPattern::root().lit("users").var("id", decoder::int());
/// let parsed: PathPattern = "/users/:id".parse().unwrap();
/// let retyped = parsed.with_decoder("id", decoder::int());
/// assert_eq!(typed.to_string(), retyped.to_string());
/// ```
#[derive(Clone, Default)]
pub struct PathPattern {
    elements: Vec<Element>,
    invalid: Option<&'static str>,
}

impl PathPattern {
    /// The empty pattern. Matches only the root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses and validates a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, crate::RouterError> {
        let parsed = Self::parse_lenient(pattern);
        parsed
            .validate()
            .map_err(|msg| crate::RouterError::new(msg, pattern))?;
        Ok(parsed)
    }

    pub fn lit(mut self, literal: &str) -> Self {
        self.elements.push(Element::Literal(literal.into()));
        self
    }

    pub fn var<T: Any + Send + Sync>(mut self, name: &str, decoder: Decoder<T>) -> Self {
        self.elements.push(Element::Variable {
            name: name.into(),
            decoder: decoder.into(),
        });
        self
    }

    /// Matches a final segment `<stem>.<ext>` and binds the decoded stem.
    pub fn ext<T: Any + Send + Sync>(mut self, name: &str, decoder: Decoder<T>, ext: &str) -> Self {
        self.elements.push(Element::Extension {
            name: name.into(),
            decoder: decoder.into(),
            ext: ext.into(),
        });
        self
    }

    /// Binds all remaining segments, possibly none. Must be the last element.
    pub fn rest(mut self, name: &str) -> Self {
        self.elements.push(Element::Remainder { name: name.into() });
        self
    }

    /// Replaces the decoder of the variable or extension stem named `name`.
    pub fn with_decoder<T: Any + Send + Sync>(mut self, name: &str, decoder: Decoder<T>) -> Self {
        let target = self.elements.iter_mut().find_map(|e| match e {
            Element::Variable { name: n, decoder: slot }
            | Element::Extension {
                name: n,
                decoder: slot,
                ..
            } if &**n == name => Some(slot),
            _ => None,
        });
        match target {
            Some(slot) => *slot = decoder.into(),
            None => {
                self.invalid = self
                    .invalid
                    .or(Some("no capture with this name to attach a decoder to"))
            }
        }
        self
    }

    /// Appends the elements of `other`.
    pub fn join(mut self, other: PathPattern) -> Self {
        self.elements.extend(other.elements);
        self.invalid = self.invalid.or(other.invalid);
        self
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn has_remainder(&self) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, Element::Remainder { .. }))
    }
}

impl PathPattern {
    fn parse_lenient(pattern: &str) -> Self {
        let path = pattern.strip_prefix(SLASH).unwrap_or(pattern);
        if path.is_empty() {
            return Self::root();
        }

        let elements = path
            .split(SLASH)
            .map(|part| {
                if let Some(capture) = part.strip_prefix(COLON) {
                    match capture.split_once(DOT) {
                        Some((name, ext)) => Element::Extension {
                            name: name.into(),
                            decoder: decoder::string().into(),
                            ext: ext.into(),
                        },
                        None => Element::Variable {
                            name: capture.into(),
                            decoder: decoder::string().into(),
                        },
                    }
                } else if let Some(name) = part.strip_prefix(STAR) {
                    Element::Remainder { name: name.into() }
                } else {
                    Element::Literal(part.into())
                }
            })
            .collect();

        Self {
            elements,
            invalid: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if let Some(msg) = self.invalid {
            return Err(msg);
        }
        let last = self.elements.len().saturating_sub(1);
        for (i, element) in self.elements.iter().enumerate() {
            match element {
                Element::Literal(_) => {}
                Element::Variable { name, .. } => {
                    if name.is_empty() {
                        return Err("capture name can not be empty");
                    }
                }
                Element::Remainder { name } => {
                    if name.is_empty() {
                        return Err("capture name can not be empty");
                    }
                    if i != last {
                        return Err("wildcard pattern can only appear at end");
                    }
                }
                Element::Extension { name, ext, .. } => {
                    if name.is_empty() {
                        return Err("capture name can not be empty");
                    }
                    if ext.is_empty() {
                        return Err("extension can not be empty");
                    }
                    if ext.contains(DOT) {
                        return Err("extension can not contain '.'");
                    }
                    if i != last {
                        return Err("extension pattern can only appear at end");
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn matches(&self, segments: &[String], captures: &mut Captures) -> bool {
        let (fixed, rest) = match self.elements.split_last() {
            Some((Element::Remainder { name }, fixed)) => (fixed, Some(name)),
            _ => (self.elements.as_slice(), None),
        };

        let count_ok = match rest {
            Some(_) => segments.len() >= fixed.len(),
            None => segments.len() == fixed.len(),
        };
        if !count_ok {
            return false;
        }

        for (element, segment) in fixed.iter().zip(segments) {
            let ok = match element {
                Element::Literal(lit) => **lit == **segment,
                Element::Variable { name, decoder } => bind(name, decoder, segment, captures),
                Element::Extension { name, decoder, ext } => match segment.rsplit_once(DOT) {
                    Some((stem, e)) if e == &**ext => bind(name, decoder, stem, captures),
                    _ => false,
                },
                Element::Remainder { .. } => false,
            };
            if !ok {
                return false;
            }
        }

        if let Some(name) = rest {
            let tail: Vec<String> = segments[fixed.len()..].to_vec();
            captures.push(Arc::clone(name), Box::new(tail));
        }
        true
    }

    /// Capture names are ignored: `/u/:id` and `/u/:uid` have the same shape.
    /// Variables have the same shape only when they share a decoder.
    pub(crate) fn same_shape(&self, other: &PathPattern) -> bool {
        self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|pair| match pair {
                    (Element::Literal(a), Element::Literal(b)) => a == b,
                    (
                        Element::Variable { decoder: a, .. },
                        Element::Variable { decoder: b, .. },
                    ) => a.id() == b.id(),
                    (Element::Remainder { .. }, Element::Remainder { .. }) => true,
                    (
                        Element::Extension {
                            decoder: a,
                            ext: x,
                            ..
                        },
                        Element::Extension {
                            decoder: b,
                            ext: y,
                            ..
                        },
                    ) => a.id() == b.id() && x == y,
                    _ => false,
                })
    }
}

fn bind(name: &Arc<str>, decoder: &ErasedDecoder, input: &str, captures: &mut Captures) -> bool {
    match decoder.decode(input) {
        Ok(value) => {
            captures.push(Arc::clone(name), value);
            true
        }
        Err(e) => {
            trace!(capture = &**name, error = %e, "path capture rejected");
            false
        }
    }
}

impl FromStr for PathPattern {
    type Err = crate::RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses without validating. Errors surface when the router is built.
impl From<&str> for PathPattern {
    fn from(s: &str) -> Self {
        Self::parse_lenient(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str("/");
        }
        for element in &self.elements {
            match element {
                Element::Literal(lit) => write!(f, "/{}", lit)?,
                Element::Variable { name, decoder } => {
                    write!(f, "/:{}<{}>", name, decoder.label())?
                }
                Element::Remainder { name } => write!(f, "/*{}", name)?,
                Element::Extension { name, decoder, ext } => {
                    write!(f, "/:{}<{}>.{}", name, decoder.label(), ext)?
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern")
            .field(&format_args!("{}", self))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(path: &str) -> Vec<String> {
        crate::Request::new(http::Method::GET, path).segments().to_vec()
    }

    fn run(pattern: &PathPattern, path: &str) -> Option<Captures> {
        let mut caps = Captures::new();
        if pattern.matches(&segments(path), &mut caps) {
            Some(caps)
        } else {
            None
        }
    }

    #[test]
    fn literal() {
        let p = PathPattern::root().lit("users");
        assert!(run(&p, "/users").is_some());
        assert!(run(&p, "/users/x").is_none());
        assert!(run(&p, "/").is_none());
        assert!(run(&p, "/Users").is_none());
    }

    #[test]
    fn root() {
        let p = PathPattern::root();
        assert!(run(&p, "/").is_some());
        assert!(run(&p, "").is_some());
        assert!(run(&p, "/a").is_none());
    }

    #[test]
    fn typed_variable() {
        let p = PathPattern::root().lit("users").var("id", decoder::int());
        let caps = run(&p, "/users/42").unwrap();
        assert_eq!(caps.get::<i32>("id"), Some(&42));
        assert!(run(&p, "/users/abc").is_none());
        assert!(run(&p, "/users/42/x").is_none());
        assert!(run(&p, "/users").is_none());
    }

    #[test]
    fn remainder() {
        let p = PathPattern::root().lit("api").rest("rest");
        let caps = run(&p, "/api").unwrap();
        assert_eq!(caps.get::<Vec<String>>("rest"), Some(&vec![]));
        let caps = run(&p, "/api/v1/x").unwrap();
        assert_eq!(
            caps.get::<Vec<String>>("rest"),
            Some(&vec!["v1".to_owned(), "x".to_owned()])
        );
        assert!(run(&p, "/").is_none());
        assert!(run(&p, "/other/v1").is_none());
    }

    #[test]
    fn extension() {
        let p = PathPattern::root().ext("name", decoder::string(), "json");
        let caps = run(&p, "/report.json").unwrap();
        assert_eq!(caps.get_str("name"), Some("report"));
        assert!(run(&p, "/report.xml").is_none());
        assert!(run(&p, "/report").is_none());

        let caps = run(&p, "/archive.tar.json").unwrap();
        assert_eq!(caps.get_str("name"), Some("archive.tar"));

        let typed = PathPattern::root().lit("n").ext("n", decoder::int(), "txt");
        assert_eq!(run(&typed, "/n/7.txt").unwrap().get::<i32>("n"), Some(&7));
        assert!(run(&typed, "/n/seven.txt").is_none());
    }

    #[test]
    fn parse_syntax() {
        let p: PathPattern = "/files/:dir/*rest".parse().unwrap();
        assert_eq!(p.to_string(), "/files/:dir<String>/*rest");
        let caps = run(&p, "/files/home/a/b").unwrap();
        assert_eq!(caps.get_str("dir"), Some("home"));

        let p: PathPattern = "/reports/:name.json".parse().unwrap();
        assert_eq!(p.to_string(), "/reports/:name<String>.json");

        assert_eq!(PathPattern::parse("/").unwrap().len(), 0);
        assert_eq!(PathPattern::parse("").unwrap().len(), 0);
        assert_eq!(PathPattern::parse("users/").unwrap().len(), 2);
    }

    #[test]
    fn invalid_patterns() {
        let cases: &[(&str, &str)] = &[
            ("/u/:", "capture name can not be empty"),
            ("/u/*", "capture name can not be empty"),
            ("/u/*rest/x", "wildcard pattern can only appear at end"),
            ("/u/:name.json/x", "extension pattern can only appear at end"),
            ("/u/:name.", "extension can not be empty"),
            ("/u/:name.tar.gz", "extension can not contain '.'"),
        ];
        for &(pattern, msg) in cases {
            let err = PathPattern::parse(pattern).unwrap_err();
            assert_eq!(err.msg(), msg, "pattern = {:?}", pattern);
        }

        let p = PathPattern::from("/u/:id").with_decoder("uid", decoder::int());
        assert!(p.validate().is_err());
    }

    #[test]
    fn shape() {
        let a = PathPattern::from("/u/:id/p/:id");
        let b = PathPattern::from("/u/:uid/p/:pid");
        let c = PathPattern::from("/u/:uid/p").rest("x");
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
        assert!(!a.same_shape(&b.clone().with_decoder("pid", decoder::int())));

        let year = decoder::int().map(i64::from);
        let x = PathPattern::root().var("n", year.clone());
        let y = PathPattern::root().var("m", year);
        let z = PathPattern::root().var("n", decoder::parse::<i64>());
        assert!(x.same_shape(&y));
        assert!(!x.same_shape(&z));
    }
}
