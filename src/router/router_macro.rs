/// Declares a [`RouterBuilder`](crate::RouterBuilder) from string patterns.
///
/// Each entry is a `|`-separated method list, a pattern literal and the
/// route data. `@` nests another builder under a prefix.
///
/// ```
/// use typed_router::{router, Method, Request};
///
/// let router = router! {
///     GET "/users/:id" => 1,
///     GET | POST "/api" => 2,
///     @ "/v1" => router! {
///         GET "/info" => 3
///     }
/// }
/// .build()
/// .unwrap();
///
/// let (data, caps) = router.find(&Request::new(Method::GET, "/users/asd")).unwrap();
/// assert_eq!(*data, 1);
/// assert_eq!(caps.get_str("id"), Some("asd"));
/// assert_eq!(*router.find(&Request::new(Method::POST, "/api")).unwrap().0, 2);
/// assert_eq!(*router.find(&Request::new(Method::GET, "/v1/info")).unwrap().0, 3);
/// ```
#[macro_export]
macro_rules! router {
    {@entry $builder:expr, [@], $prefix:expr, $sub_router:expr} => {
        $builder.nest($prefix, $sub_router)
    };
    {@entry $builder:expr, [$($method:ident)|+], $pattern:expr, $data:expr} => {
        $builder.route(
            $crate::Pattern::from($pattern)$(.method($crate::Method::$method))+,
            $data,
        )
    };

    {$($($method:tt)|+ $pattern:literal => $data:expr),+ $(,)?} => {{
        let __builder = $crate::RouterBuilder::new();
        $(let __builder = $crate::router!(@entry __builder, [$($method)|+], $pattern, $data);)+
        __builder
    }};
}
