//! A declarative HTTP request router with typed path and query extraction.
//!
//! Rules are tried in declaration order and the first one whose pattern
//! matches wins. A value that fails to decode is not an error: the rule
//! simply does not match and the next rule is tried.
//!
//! ```
//! use typed_router::{decoder, get, PathPattern, QueryParam, Request, Method, Router};
//!
//! let router = Router::builder()
//!     .route(get(PathPattern::root().lit("users").var("id", decoder::int())), "user")
//!     .route(get("/search").query(QueryParam::optional("q", decoder::string())), "search")
//!     .build()
//!     .unwrap();
//!
//! let (data, caps) = router.find(&Request::new(Method::GET, "/users/42")).unwrap();
//! assert_eq!(*data, "user");
//! assert_eq!(caps.get::<i32>("id"), Some(&42));
//!
//! assert!(router.find(&Request::new(Method::GET, "/users/abc")).is_none());
//! ```

#![deny(unsafe_code)]

pub mod decoder;
mod pattern;
mod request;
mod router;

#[cfg(feature = "hyper-service")]
pub mod hyper_service;

pub use http::Method;

pub use crate::decoder::{DecodeError, Decoder};
pub use crate::pattern::{
    connect, delete, get, head, options, patch, post, put, trace, MethodSet, OnInvalid, ParamKind,
    PathPattern, Pattern, QueryParam, QueryPattern,
};
pub use crate::request::{QueryParams, Request};
pub use crate::router::{Captures, Router, RouterBuilder, RouterError};

#[cfg(feature = "hyper-service")]
pub use crate::hyper_service::{Handler, RouterService};

#[test]
fn test_simple() {
    let router: Router<usize> = router! {
        @ "/user/:user_id" => router! {
            GET "post/:post_id" => 1,
            GET "profile" => 2,
            GET "file/*path" => 3,
            GET "" => 4
        },
        GET "explore" => 5,
        GET "pan/*path" => 0
    }
    .build()
    .unwrap();

    let cases: &[(_, _, &[&str])] = &[
        ("/user/asd/post/123", 1, &["user_id", "post_id"]),
        ("/user/asd/profile", 2, &["user_id"]),
        ("/user/asd/file/home/asd/.bashrc", 3, &["user_id", "path"]),
        ("/user/asd", 4, &["user_id"]),
        ("/explore", 5, &[]),
        ("pan/home/asd", 0, &["path"]),
    ];

    for (url, data, names) in cases {
        let (ret, caps) = router.find(&Request::new(Method::GET, url)).unwrap();
        assert_eq!(ret, data);
        let v: Vec<&str> = caps.names().collect();
        assert_eq!(&v, names);
    }

    let (_, caps) = router
        .find(&Request::new(Method::GET, "/user/asd/file/home/asd/.bashrc"))
        .unwrap();
    assert_eq!(caps.get::<Vec<String>>("path").unwrap(), &["home", "asd", ".bashrc"]);
}
