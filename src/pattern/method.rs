use std::fmt;

use http::Method;
use smallvec::SmallVec;

/// A disjunction of HTTP methods.
#[derive(Debug, Clone, Default)]
pub struct MethodSet {
    methods: SmallVec<[Method; 4]>,
}

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `method` to the set.
    pub fn or(mut self, method: Method) -> Self {
        self.insert(method);
        self
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> + '_ {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Methods joined the way the `Allow` header lists them.
    pub fn to_allow_header(&self) -> String {
        self.join(", ")
    }

    pub(crate) fn insert(&mut self, method: Method) {
        if !self.contains(&method) {
            self.methods.push(method)
        }
    }

    pub(crate) fn union_with(&mut self, other: &MethodSet) {
        for m in other.iter() {
            self.insert(m.clone());
        }
    }

    fn join(&self, sep: &str) -> String {
        let parts: SmallVec<[&str; 4]> = self.methods.iter().map(Method::as_str).collect();
        parts.join(sep)
    }
}

impl PartialEq for MethodSet {
    /// Order-insensitive.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|m| other.contains(m))
    }
}

impl Eq for MethodSet {}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        Self::new().or(method)
    }
}

impl FromIterator<Method> for MethodSet {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        let mut set = Self::new();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjunction() {
        let set = MethodSet::from(Method::GET).or(Method::POST).or(Method::GET);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Method::GET));
        assert!(set.contains(&Method::POST));
        assert!(!set.contains(&Method::DELETE));
        assert_eq!(set.to_string(), "GET|POST");
        assert_eq!(set.to_allow_header(), "GET, POST");
    }

    #[test]
    fn order_insensitive_eq() {
        let a: MethodSet = vec![Method::GET, Method::POST].into_iter().collect();
        let b: MethodSet = vec![Method::POST, Method::GET].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, MethodSet::from(Method::GET));
    }
}
