#![cfg(feature = "hyper-service")]

use typed_router::{router_service, Captures, RouterService};

use std::convert::Infallible as Never;

use hyper::service::Service;
use hyper::{Body, Request, Response, StatusCode};

async fn hello(_: Request<Body>, caps: Captures) -> Result<Response<Body>, Never> {
    let name = caps.get_str("name").unwrap_or_default().to_owned();
    Ok(Response::new(Body::from(format!("hello, {}!", name))))
}

async fn user(_: Request<Body>, caps: Captures) -> Result<Response<Body>, Never> {
    let id = caps.get::<i32>("id").copied().unwrap_or_default();
    Ok(Response::new(Body::from(format!("user {}", id))))
}

async fn teapot(_: Request<Body>, _: Captures) -> Result<Response<Body>, Never> {
    let mut res = Response::new(Body::from("teapot"));
    *res.status_mut() = StatusCode::IM_A_TEAPOT;
    Ok(res)
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(service: &mut RouterService, req: Request<Body>) -> (StatusCode, String) {
    let res = service.call(req).await.unwrap();
    let status = res.status();
    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn service() -> RouterService {
    router_service! {
        GET "/hello/:name" => hello,
        @ "/api/v1" => router_service! {
            GET | HEAD "/file/*path" => hello
        };
        _ => teapot
    }
    .unwrap()
}

#[tokio::test]
async fn dispatch() {
    let mut service = service();
    let (status, body) = send(&mut service, request("GET", "/hello/world")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello, world!");
}

#[tokio::test]
async fn default_handler() {
    let mut service = service();
    let (status, body) = send(&mut service, request("GET", "/other/path")).await;
    assert_eq!(status, StatusCode::IM_A_TEAPOT);
    assert_eq!(body, "teapot");
}

#[tokio::test]
async fn method_not_allowed() {
    let mut service = service();
    let res = service
        .call(request("DELETE", "/api/v1/file/a/b"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[hyper::header::ALLOW], "GET, HEAD");
}

#[tokio::test]
async fn typed_capture_falls_through() {
    use typed_router::{decoder, get, PathPattern, Router};

    let router = Router::builder()
        .route(
            get(PathPattern::root().lit("users").var("id", decoder::int())),
            Box::new(user) as typed_router::hyper_service::BoxHandler,
        )
        .build()
        .unwrap();
    let mut service = RouterService::from_router(router);

    let (status, body) = send(&mut service, request("GET", "/users/42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "user 42");

    let (status, body) = send(&mut service, request("GET", "/users/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 Not Found");
}

#[tokio::test]
async fn shared_clone() {
    let service = service();
    let mut a = service.clone();
    let mut b = service;
    assert_eq!(send(&mut a, request("GET", "/hello/a")).await.1, "hello, a!");
    assert_eq!(send(&mut b, request("GET", "/hello/b")).await.1, "hello, b!");
}
