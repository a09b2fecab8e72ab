/// Like [`router!`](crate::router), but every entry is a
/// [`Handler`](crate::hyper_service::Handler).
///
/// With a trailing `_ => default` entry the macro builds the router and
/// returns `Result<RouterService, RouterError>`; without it, the macro
/// returns the builder so that it can be nested.
#[macro_export]
macro_rules! router_service {
    {@entry $builder:expr, [@], $prefix:expr, $sub_router:expr} => {
        $builder.nest($prefix, $sub_router)
    };
    {@entry $builder:expr, [$($method:ident)|+], $pattern:expr, $handler:expr} => {
        $builder.route(
            $crate::Pattern::from($pattern)$(.method($crate::Method::$method))+,
            Box::new($handler) as $crate::hyper_service::BoxHandler,
        )
    };

    {$($($method:tt)|+ $pattern:literal => $handler:expr),+ ; _ => $default:expr $(,)?} => {{
        let __builder = $crate::RouterBuilder::<$crate::hyper_service::BoxHandler>::new();
        $(
            let __builder = $crate::router_service!(
                @entry __builder, [$($method)|+], $pattern, $handler
            );
        )+
        __builder
            .build()
            .map(|__router| $crate::hyper_service::RouterService::new(__router, $default))
    }};

    {$($($method:tt)|+ $pattern:literal => $handler:expr),+ $(,)?} => {{
        let __builder = $crate::RouterBuilder::<$crate::hyper_service::BoxHandler>::new();
        $(
            let __builder = $crate::router_service!(
                @entry __builder, [$($method)|+], $pattern, $handler
            );
        )+
        __builder
    }};
}
