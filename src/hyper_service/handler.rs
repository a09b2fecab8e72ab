use super::{BoxError, BoxFuture, Request, Response, StdError};
use crate::router::Captures;

use std::future::Future;

pub trait Handler {
    fn call(
        &self,
        req: Request,
        captures: Captures,
    ) -> BoxFuture<'static, Result<Response, BoxError>>;
}

pub type BoxHandler = Box<dyn Handler + Send + Sync>;

impl<F, E, Fut> Handler for F
where
    F: Fn(Request, Captures) -> Fut,
    E: StdError + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, E>> + Send + 'static,
{
    fn call(
        &self,
        req: Request,
        captures: Captures,
    ) -> BoxFuture<'static, Result<Response, BoxError>> {
        let fut = (self)(req, captures);
        Box::pin(async move {
            match fut.await {
                Ok(r) => Ok(r),
                Err(e) => Err(Box::new(e) as BoxError),
            }
        })
    }
}
