use std::collections::HashMap;

use http::Method;
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

const SLASH: char = '/';
const QUESTION: char = '?';

/// The routing view of an HTTP request: method, decoded path segments and
/// query parameters.
///
/// The root path (`""` or `"/"`) has no segments. A trailing slash yields a
/// trailing empty segment, so `/users/` is `["users", ""]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    segments: Vec<String>,
    query: QueryParams,
}

impl Request {
    /// Builds a request from a request target such as `/users/42?page=2`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once(QUESTION) {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        Self {
            method,
            segments: split_path(path),
            query: QueryParams::parse(query),
        }
    }

    pub fn from_parts(method: Method, segments: Vec<String>, query: QueryParams) -> Self {
        Self {
            method,
            segments,
            query,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }
}

impl<B> From<&http::Request<B>> for Request {
    fn from(req: &http::Request<B>) -> Self {
        let uri = req.uri();
        Self {
            method: req.method().clone(),
            segments: split_path(uri.path()),
            query: QueryParams::parse(uri.query().unwrap_or("")),
        }
    }
}

fn split_path(path: &str) -> Vec<String> {
    let path = path.strip_prefix(SLASH).unwrap_or(path);
    if path.is_empty() {
        return Vec::new();
    }
    path.split(SLASH)
        .map(|part| percent_decode_str(part).decode_utf8_lossy().into_owned())
        .collect()
}

/// Multi-valued query parameters. Values of a repeated name keep their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    map: HashMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parses an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// The first value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Every value of `name`; empty when the parameter is absent.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.map.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Number of distinct parameter names.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .fold(HashMap::new(), |mut map: HashMap<String, Vec<String>>, (k, v)| {
                map.entry(k.into()).or_default().push(v.into());
                map
            });
        Self { map }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_target() {
        let req = Request::new(Method::GET, "/users/42?country=US&year=2016");
        assert_eq!(req.segments(), ["users", "42"]);
        assert_eq!(req.query().get("country"), Some("US"));
        assert_eq!(req.query().get("year"), Some("2016"));
        assert_eq!(req.query().len(), 2);
    }

    #[test]
    fn root_and_trailing_slash() {
        assert!(Request::new(Method::GET, "/").segments().is_empty());
        assert!(Request::new(Method::GET, "").segments().is_empty());
        assert!(Request::new(Method::GET, "/?a=1").segments().is_empty());
        assert_eq!(Request::new(Method::GET, "/users/").segments(), ["users", ""]);
        assert_eq!(Request::new(Method::GET, "users").segments(), ["users"]);
    }

    #[test]
    fn decoding() {
        let req = Request::new(Method::GET, "/files/my%20report.json?q=a+b&q=c%26d&flag");
        assert_eq!(req.segments(), ["files", "my report.json"]);
        assert_eq!(req.query().get_all("q"), ["a b", "c&d"]);
        assert!(req.query().contains("flag"));
        assert_eq!(req.query().get("flag"), Some(""));
        assert!(req.query().get_all("missing").is_empty());
    }

    #[test]
    fn from_http_request() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("http://localhost:3000/api/v1?x=1")
            .body(())
            .unwrap();
        let req = Request::from(&req);
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.segments(), ["api", "v1"]);
        assert_eq!(req.query().get("x"), Some("1"));
    }
}
