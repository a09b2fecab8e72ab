use super::handler::{BoxHandler, Handler};
use super::{BoxError, BoxFuture, Request, Response};
use crate::router::{Captures, Router};

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use hyper::service::Service;
use hyper::{Body, StatusCode};
use tracing::debug;

/// Dispatches each request to the handler of the first matching rule.
///
/// Requests that match a rule's path and query but none of its methods are
/// answered with `405 Method Not Allowed` and an `Allow` header. Everything
/// else goes to the default handler.
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router<BoxHandler>>,
    default: Arc<BoxHandler>,
}

impl RouterService {
    pub fn new(router: Router<BoxHandler>, default: impl Handler + Send + Sync + 'static) -> Self {
        Self {
            router: Arc::new(router),
            default: Arc::new(Box::new(default)),
        }
    }

    /// Uses a plain `404 Not Found` response as the default handler.
    pub fn from_router(router: Router<BoxHandler>) -> Self {
        Self::new(router, not_found)
    }

    pub fn router(&self) -> &Router<BoxHandler> {
        &self.router
    }
}

impl Service<Request> for RouterService {
    type Response = Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Response, BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let target = crate::Request::from(&req);

        if let Some((handler, captures)) = self.router.find(&target) {
            return Handler::call(&**handler, req, captures);
        }

        let allowed = self.router.allowed_methods(&target);
        if !allowed.is_empty() {
            debug!(
                method = %req.method(),
                uri = %req.uri(),
                allow = %allowed,
                "method not allowed"
            );
            let allow = allowed.to_allow_header();
            return Box::pin(async move {
                let res = hyper::Response::builder()
                    .status(StatusCode::METHOD_NOT_ALLOWED)
                    .header(http::header::ALLOW, allow)
                    .body(Body::from("405 Method Not Allowed"))?;
                Ok::<_, BoxError>(res)
            });
        }

        debug!(method = %req.method(), uri = %req.uri(), "no route matched");
        Handler::call(&**self.default, req, Captures::default())
    }
}

async fn not_found(_: Request, _: Captures) -> Result<Response, Infallible> {
    let mut res = Response::new(Body::from("404 Not Found"));
    *res.status_mut() = StatusCode::NOT_FOUND;
    Ok(res)
}
