//! Route patterns: a method set, a path pattern and a query pattern.
//!
//! ```
//! use typed_router::{decoder, get, Method, QueryParam, Request};
//!
//! let pattern = get("/users")
//!     .method(Method::HEAD)
//!     .query(QueryParam::required("page", decoder::int()));
//!
//! let caps = pattern.matches(&Request::new(Method::GET, "/users?page=2")).unwrap();
//! assert_eq!(caps.get::<i32>("page"), Some(&2));
//! assert!(pattern.matches(&Request::new(Method::POST, "/users?page=2")).is_none());
//! ```

mod method;
mod path;
mod query;

pub use self::method::MethodSet;
pub use self::path::PathPattern;
pub use self::query::{OnInvalid, ParamKind, QueryParam, QueryPattern};

use crate::request::Request;
use crate::router::Captures;

use std::fmt;

use http::Method;

/// A composed predicate and extractor over the method, path and query of a
/// request.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    methods: Option<MethodSet>,
    path: PathPattern,
    query: QueryPattern,
}

impl Pattern {
    /// A pattern accepting any method.
    pub fn new(path: impl Into<PathPattern>) -> Self {
        Self {
            methods: None,
            path: path.into(),
            query: QueryPattern::new(),
        }
    }

    /// Adds `method` to the accepted methods.
    pub fn method(mut self, method: Method) -> Self {
        self.methods.get_or_insert_with(MethodSet::new).insert(method);
        self
    }

    /// Adds every method of `methods`. An empty list leaves a pattern that
    /// fails validation rather than one accepting any method.
    pub fn methods<I: IntoIterator<Item = Method>>(mut self, methods: I) -> Self {
        let set = self.methods.get_or_insert_with(MethodSet::new);
        methods.into_iter().for_each(|m| set.insert(m));
        self
    }

    /// Adds query parameters; they are conjoined with those already present.
    pub fn query(mut self, query: impl Into<QueryPattern>) -> Self {
        self.query = self.query.and(query);
        self
    }

    pub fn method_set(&self) -> Option<&MethodSet> {
        self.methods.as_ref()
    }

    pub fn path_pattern(&self) -> &PathPattern {
        &self.path
    }

    pub fn query_pattern(&self) -> &QueryPattern {
        &self.query
    }

    /// Matches `req` and returns the bound values.
    pub fn matches(&self, req: &Request) -> Option<Captures> {
        if !self.accepts_method(req.method()) {
            return None;
        }
        self.matches_target(req)
    }
}

impl Pattern {
    pub(crate) fn accepts_method(&self, method: &Method) -> bool {
        match &self.methods {
            Some(set) => set.contains(method),
            None => true,
        }
    }

    /// Path and query only.
    pub(crate) fn matches_target(&self, req: &Request) -> Option<Captures> {
        let mut captures = Captures::new();
        if !self.path.matches(req.segments(), &mut captures) {
            return None;
        }
        if !self.query.matches(req.query(), &mut captures) {
            return None;
        }
        Some(captures)
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if let Some(set) = &self.methods {
            if set.is_empty() {
                return Err("method set can not be empty");
            }
        }
        self.path.validate()?;
        self.query.validate()
    }

    pub(crate) fn same_shape(&self, other: &Pattern) -> bool {
        self.methods == other.methods
            && self.path.same_shape(&other.path)
            && self.query.same_shape(&other.query)
    }

    pub(crate) fn prefixed(self, prefix: &PathPattern) -> Self {
        if prefix.is_empty() {
            return self;
        }
        Self {
            path: prefix.clone().join(self.path),
            ..self
        }
    }
}

impl From<PathPattern> for Pattern {
    fn from(path: PathPattern) -> Self {
        Self::new(path)
    }
}

impl From<&str> for Pattern {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.methods {
            Some(set) => write!(f, "{} ", set)?,
            None => f.write_str("* ")?,
        }
        write!(f, "{}{}", self.path, self.query)
    }
}

macro_rules! method_pattern {
    ($name:ident, $method:ident) => {
        #[doc = concat!("A pattern matching ", stringify!($method), " requests on `path`.")]
        #[inline]
        pub fn $name(path: impl Into<PathPattern>) -> Pattern {
            Pattern::new(path).method(Method::$method)
        }
    };
}

method_pattern!(get, GET);
method_pattern!(post, POST);
method_pattern!(put, PUT);
method_pattern!(delete, DELETE);
method_pattern!(head, HEAD);
method_pattern!(options, OPTIONS);
method_pattern!(connect, CONNECT);
method_pattern!(patch, PATCH);
method_pattern!(trace, TRACE);
