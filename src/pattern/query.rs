use crate::decoder::{Decoder, DecoderId};
use crate::request::QueryParams;
use crate::router::Captures;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

/// What an optional parameter does with a value its decoder rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnInvalid {
    /// The pattern does not match. The default.
    #[default]
    Mismatch,
    /// The value is treated as absent.
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Binds `T`. Absent or undecodable means no match.
    Required,
    /// Binds `Option<T>`.
    Optional,
    /// Binds `Vec<T>` of every value, empty when absent.
    OptionalMulti,
    /// Binds `Result<T, DecodeError>`. Absent means no match.
    Validated,
    /// Binds `T`, falling back to a default when absent.
    Defaulted,
    /// Binds `bool`, whether the name is present at all.
    Flag,
}

trait Extract: Send + Sync {
    fn extract(
        &self,
        name: &Arc<str>,
        values: &[String],
        on_invalid: OnInvalid,
        captures: &mut Captures,
    ) -> bool;
}

struct Required<T>(Decoder<T>);
struct Optional<T>(Decoder<T>);
struct Multi<T>(Decoder<T>);
struct Validated<T>(Decoder<T>);
struct Defaulted<T>(Decoder<T>, T);
struct Flag;

fn rejected(name: &str, e: &dyn fmt::Display) {
    trace!(param = name, error = %e, "query parameter rejected");
}

impl<T: Any + Send + Sync> Extract for Required<T> {
    fn extract(
        &self,
        name: &Arc<str>,
        values: &[String],
        _: OnInvalid,
        captures: &mut Captures,
    ) -> bool {
        let first = match values.first() {
            Some(v) => v,
            None => return false,
        };
        match self.0.decode(first) {
            Ok(v) => {
                captures.push(Arc::clone(name), Box::new(v));
                true
            }
            Err(e) => {
                rejected(name, &e);
                false
            }
        }
    }
}

impl<T: Any + Send + Sync> Extract for Optional<T> {
    fn extract(
        &self,
        name: &Arc<str>,
        values: &[String],
        on_invalid: OnInvalid,
        captures: &mut Captures,
    ) -> bool {
        let value: Option<T> = match values.first().map(|v| self.0.decode(v)) {
            None => None,
            Some(Ok(v)) => Some(v),
            Some(Err(e)) => {
                rejected(name, &e);
                match on_invalid {
                    OnInvalid::Mismatch => return false,
                    OnInvalid::Absent => None,
                }
            }
        };
        captures.push(Arc::clone(name), Box::new(value));
        true
    }
}

impl<T: Any + Send + Sync> Extract for Multi<T> {
    fn extract(
        &self,
        name: &Arc<str>,
        values: &[String],
        on_invalid: OnInvalid,
        captures: &mut Captures,
    ) -> bool {
        let mut decoded: Vec<T> = Vec::with_capacity(values.len());
        for v in values {
            match self.0.decode(v) {
                Ok(v) => decoded.push(v),
                Err(e) => {
                    rejected(name, &e);
                    if on_invalid == OnInvalid::Mismatch {
                        return false;
                    }
                }
            }
        }
        captures.push(Arc::clone(name), Box::new(decoded));
        true
    }
}

impl<T: Any + Send + Sync> Extract for Validated<T> {
    fn extract(
        &self,
        name: &Arc<str>,
        values: &[String],
        _: OnInvalid,
        captures: &mut Captures,
    ) -> bool {
        let first = match values.first() {
            Some(v) => v,
            None => return false,
        };
        let result = self.0.decode(first);
        if let Err(ref e) = result {
            captures.push_error(Arc::clone(name), e.clone());
        }
        captures.push(Arc::clone(name), Box::new(result));
        true
    }
}

impl<T: Any + Send + Sync + Clone> Extract for Defaulted<T> {
    fn extract(
        &self,
        name: &Arc<str>,
        values: &[String],
        on_invalid: OnInvalid,
        captures: &mut Captures,
    ) -> bool {
        let value = match values.first().map(|v| self.0.decode(v)) {
            None => self.1.clone(),
            Some(Ok(v)) => v,
            Some(Err(e)) => {
                rejected(name, &e);
                match on_invalid {
                    OnInvalid::Mismatch => return false,
                    OnInvalid::Absent => self.1.clone(),
                }
            }
        };
        captures.push(Arc::clone(name), Box::new(value));
        true
    }
}

impl Extract for Flag {
    fn extract(
        &self,
        name: &Arc<str>,
        values: &[String],
        _: OnInvalid,
        captures: &mut Captures,
    ) -> bool {
        captures.push(Arc::clone(name), Box::new(!values.is_empty()));
        true
    }
}

/// One named query parameter with its decoder and policy.
#[derive(Clone)]
pub struct QueryParam {
    name: Arc<str>,
    kind: ParamKind,
    label: Arc<str>,
    decoder: Option<DecoderId>,
    on_invalid: OnInvalid,
    rule: Arc<dyn Extract>,
}

impl QueryParam {
    fn with_rule<T: 'static>(
        name: &str,
        kind: ParamKind,
        decoder: &Decoder<T>,
        rule: Arc<dyn Extract>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            label: decoder.label().into(),
            decoder: Some(decoder.id()),
            on_invalid: OnInvalid::default(),
            rule,
        }
    }

    pub fn required<T: Any + Send + Sync>(name: &str, decoder: Decoder<T>) -> Self {
        let rule = Arc::new(Required(decoder.clone()));
        Self::with_rule(name, ParamKind::Required, &decoder, rule)
    }

    pub fn optional<T: Any + Send + Sync>(name: &str, decoder: Decoder<T>) -> Self {
        let rule = Arc::new(Optional(decoder.clone()));
        Self::with_rule(name, ParamKind::Optional, &decoder, rule)
    }

    pub fn multi<T: Any + Send + Sync>(name: &str, decoder: Decoder<T>) -> Self {
        let rule = Arc::new(Multi(decoder.clone()));
        Self::with_rule(name, ParamKind::OptionalMulti, &decoder, rule)
    }

    /// A parameter whose decode failure is handed to the handler instead of
    /// failing the match. Failures are also listed by
    /// [`Captures::decode_errors`].
    pub fn validated<T: Any + Send + Sync>(name: &str, decoder: Decoder<T>) -> Self {
        let rule = Arc::new(Validated(decoder.clone()));
        Self::with_rule(name, ParamKind::Validated, &decoder, rule)
    }

    pub fn with_default<T>(name: &str, decoder: Decoder<T>, default: T) -> Self
    where
        T: Any + Send + Sync + Clone,
    {
        let rule = Arc::new(Defaulted(decoder.clone(), default));
        Self::with_rule(name, ParamKind::Defaulted, &decoder, rule)
    }

    pub fn flag(name: &str) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Flag,
            label: "Flag".into(),
            decoder: None,
            on_invalid: OnInvalid::default(),
            rule: Arc::new(Flag),
        }
    }

    /// Treats undecodable values as absent. Affects optional, multi and
    /// defaulted parameters.
    pub fn lenient(self) -> Self {
        self.on_invalid(OnInvalid::Absent)
    }

    pub fn on_invalid(mut self, on_invalid: OnInvalid) -> Self {
        self.on_invalid = on_invalid;
        self
    }

    /// Conjunction with another parameter or pattern.
    pub fn and(self, other: impl Into<QueryPattern>) -> QueryPattern {
        QueryPattern::from(self).and(other)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    fn extract(&self, query: &QueryParams, captures: &mut Captures) -> bool {
        self.rule
            .extract(&self.name, query.get_all(&self.name), self.on_invalid, captures)
    }

    fn same_shape(&self, other: &QueryParam) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.decoder == other.decoder
            && self.on_invalid == other.on_invalid
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamKind::Flag => f.write_str(&self.name),
            ParamKind::Required => write!(f, "{}=<{}>", self.name, self.label),
            ParamKind::Optional => write!(f, "{}=<{}>?", self.name, self.label),
            ParamKind::OptionalMulti => write!(f, "{}=<{}>*", self.name, self.label),
            ParamKind::Validated => write!(f, "{}=<{}>!", self.name, self.label),
            ParamKind::Defaulted => write!(f, "{}=<{}>~", self.name, self.label),
        }
    }
}

impl fmt::Debug for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParam")
            .field("name", &&*self.name)
            .field("kind", &self.kind)
            .field("label", &&*self.label)
            .field("on_invalid", &self.on_invalid)
            .finish()
    }
}

/// A conjunction of query parameters. Every parameter must match; bound
/// values follow declaration order.
#[derive(Debug, Clone, Default)]
pub struct QueryPattern {
    params: Vec<QueryParam>,
}

impl QueryPattern {
    /// The empty conjunction. Matches every query.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, other: impl Into<QueryPattern>) -> Self {
        self.params.extend(other.into().params);
        self
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.params.iter().any(|p| p.name.is_empty()) {
            return Err("query parameter name can not be empty");
        }
        Ok(())
    }

    pub(crate) fn matches(&self, query: &QueryParams, captures: &mut Captures) -> bool {
        self.params.iter().all(|p| p.extract(query, captures))
    }

    pub(crate) fn same_shape(&self, other: &QueryPattern) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(a, b)| a.same_shape(b))
    }
}

impl From<QueryParam> for QueryPattern {
    fn from(param: QueryParam) -> Self {
        Self {
            params: vec![param],
        }
    }
}

impl fmt::Display for QueryPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}", sep, p)?;
        }
        Ok(())
    }
}
