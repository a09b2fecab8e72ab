use typed_router::hyper_service::BoxHandler;
use typed_router::{decoder, get, router_service, Captures, PathPattern, QueryParam, RouterService};

use std::convert::Infallible as Never;

use hyper::service::make_service_fn;
use hyper::{Body, Request, Response, StatusCode};
use tracing::info;

#[derive(Debug, Clone, Copy)]
struct Year(i32);

impl Year {
    fn of(n: i32) -> Result<Year, String> {
        if (1..=9999).contains(&n) {
            Ok(Year(n))
        } else {
            Err(format!("invalid year: {}", n))
        }
    }
}

async fn not_found(req: Request<Body>, _: Captures) -> Result<Response<Body>, Never> {
    info!(method = %req.method(), path = req.uri().path(), "not found");
    let mut res = Response::new(Body::from("404 Not Found"));
    *res.status_mut() = StatusCode::NOT_FOUND;
    Ok(res)
}

async fn hello(_: Request<Body>, caps: Captures) -> Result<Response<Body>, Never> {
    let name = caps.get_str("name").unwrap_or("nobody");
    Ok(Response::new(Body::from(format!("hello, {}!", name))))
}

async fn file(_: Request<Body>, caps: Captures) -> Result<Response<Body>, Never> {
    let path = caps.get::<Vec<String>>("filepath").map(|p| p.join("/")).unwrap_or_default();
    Ok(Response::new(Body::from(format!("access file: {}", path))))
}

async fn stats(_: Request<Body>, caps: Captures) -> Result<Response<Body>, Never> {
    let country = caps.get_str("country").unwrap_or_default();
    let body = match caps.get::<Option<Year>>("year") {
        Some(Some(year)) => format!("stats for {} in {}", country, year.0),
        _ => format!("stats for {}", country),
    };
    Ok(Response::new(Body::from(body)))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let router = router_service! {
        GET "/hello/:name" => hello,
        @ "/api/v1" => router_service!{
            GET "/file/*filepath" => file
        }
    }
    .route(
        get(PathPattern::root().lit("stats").var("country", decoder::string()))
            .query(QueryParam::optional("year", decoder::int().try_map(Year::of))),
        Box::new(stats) as BoxHandler,
    )
    .build()
    .map(|r| RouterService::new(r, not_found))
    .unwrap();

    let make = make_service_fn(|_| {
        let router = router.clone();
        async move { Ok::<_, Never>(router) }
    });

    let addr = "127.0.0.1:3000";

    let server = hyper::Server::bind(&addr.parse().unwrap()).serve(make);

    println!("Server is listening on: http://{}", addr);
    println!("hello: http://{}/hello/world", addr);
    println!("api: http://{}/api/v1/file/path/to/public/file", addr);
    println!("stats: http://{}/stats/US?year=2016", addr);
    println!("404: http://{}/other/path", addr);
    println!();

    server.await.unwrap();
}
