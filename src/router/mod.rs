mod captures;
mod endpoint;
mod error;
mod router_macro;

pub use self::captures::Captures;
pub use self::error::RouterError;

pub(crate) use self::captures::Value;

use self::endpoint::Endpoint;
use crate::pattern::{MethodSet, PathPattern, Pattern};
use crate::request::Request;

use std::fmt;

use tracing::{debug, trace};

/// An ordered list of route rules. The first rule whose pattern matches a
/// request wins.
///
/// A router never changes after it is built, so it can be shared between
/// threads and matched against concurrently.
pub struct Router<T> {
    rules: Vec<Rule<T>>,
}

struct Rule<T> {
    pattern: Pattern,
    data: T,
}

impl<T> Router<T> {
    /// A router without rules. It matches nothing.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn builder() -> RouterBuilder<T> {
        RouterBuilder::new()
    }

    /// Returns the data of the first matching rule and the values its
    /// pattern bound.
    pub fn find(&self, req: &Request) -> Option<(&T, Captures)> {
        self.rules.iter().enumerate().find_map(|(i, rule)| {
            let captures = rule.pattern.matches(req)?;
            trace!(rule = i, pattern = %rule.pattern, "route matched");
            Some((&rule.data, captures))
        })
    }

    /// Methods of the rules that match `req` on path and query but not on
    /// method. Empty when some rule matches outright or when no path matches.
    pub fn allowed_methods(&self, req: &Request) -> MethodSet {
        let mut allowed = MethodSet::new();
        for rule in &self.rules {
            let set = match rule.pattern.method_set() {
                Some(set) => set,
                None => continue,
            };
            if !set.contains(req.method()) && rule.pattern.matches_target(req).is_some() {
                allowed.union_with(set);
            }
        }
        allowed
    }

    /// Returns a new router with one more rule at the end.
    pub fn with_route(self, pattern: impl Into<Pattern>, data: T) -> Result<Self, RouterError> {
        let mut rules = self.rules;
        push_rule(&mut rules, pattern.into(), data)?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Patterns in matching order.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> + '_ {
        self.rules.iter().map(|r| &r.pattern)
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.rules.iter().map(|r| (r.pattern.to_string(), &r.data)))
            .finish()
    }
}

fn push_rule<T>(rules: &mut Vec<Rule<T>>, pattern: Pattern, data: T) -> Result<(), RouterError> {
    if let Err(msg) = pattern.validate() {
        return Err(RouterError::new(msg, pattern.to_string()));
    }
    if rules.iter().any(|r| r.pattern.same_shape(&pattern)) {
        return Err(RouterError::new(
            "pattern collision occurred",
            pattern.to_string(),
        ));
    }
    rules.push(Rule { pattern, data });
    Ok(())
}

/// Collects rules and nested routers, then builds an immutable [`Router`].
///
/// Configuration errors are reported by [`build`](RouterBuilder::build).
pub struct RouterBuilder<T> {
    entries: Vec<Endpoint<T>>,
}

impl<T> RouterBuilder<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn route(mut self, pattern: impl Into<Pattern>, data: T) -> Self {
        self.entries.push(Endpoint::Rule(pattern.into(), data));
        self
    }

    /// Mounts every rule of `router` under `prefix`, at this position in the
    /// matching order.
    pub fn nest(mut self, prefix: impl Into<PathPattern>, router: RouterBuilder<T>) -> Self {
        self.entries.push(Endpoint::Nested(prefix.into(), router));
        self
    }

    pub fn build(self) -> Result<Router<T>, RouterError> {
        let nested = self.entries.iter().filter(|e| e.is_nested()).count();
        let mut rules = Vec::with_capacity(self.entries.len());
        flatten(self.entries, &PathPattern::root(), &mut rules)?;
        debug!(rules = rules.len(), nested, "router built");
        Ok(Router { rules })
    }
}

impl<T> Default for RouterBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten<T>(
    entries: Vec<Endpoint<T>>,
    prefix: &PathPattern,
    rules: &mut Vec<Rule<T>>,
) -> Result<(), RouterError> {
    for entry in entries {
        match entry {
            Endpoint::Rule(pattern, data) => push_rule(rules, pattern.prefixed(prefix), data)?,
            Endpoint::Nested(sub_prefix, builder) => {
                if let Err(msg) = sub_prefix.validate() {
                    return Err(RouterError::new(msg, sub_prefix.to_string()));
                }
                if sub_prefix.has_remainder() {
                    return Err(RouterError::new(
                        "wildcard pattern can not be used for router prefix",
                        sub_prefix.to_string(),
                    ));
                }
                let joined = prefix.clone().join(sub_prefix);
                flatten(builder.entries, &joined, rules)?;
            }
        }
    }
    Ok(())
}
