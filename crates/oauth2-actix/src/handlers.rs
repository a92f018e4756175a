//! Injected application handlers.
//!
//! Handlers are stored behind `Arc` so a configured flow can be cloned into
//! every actix worker. The futures they return run on the worker's local
//! executor and need not be `Send`. Errors are converted into
//! [`actix_web::Error`] and surface through actix's normal error pipeline.

use actix_web::HttpResponse;
use futures::future::{FutureExt, LocalBoxFuture, TryFutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use oauth2_core::OAuth2Error;

use crate::request::GrantRequest;

pub type HandlerFuture = LocalBoxFuture<'static, Result<HttpResponse, actix_web::Error>>;

type HandlerFn<P> = dyn Fn(P, GrantRequest) -> HandlerFuture + Send + Sync;

/// Receives the validated parameters of one grant step.
pub struct GrantHandler<P> {
    inner: Arc<HandlerFn<P>>,
}

impl<P: 'static> GrantHandler<P> {
    pub fn new<F, Fut, E>(f: F) -> Self
    where
        F: Fn(P, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        Self {
            inner: Arc::new(move |params: P, req: GrantRequest| -> HandlerFuture {
                f(params, req)
                    .map_err(Into::<actix_web::Error>::into)
                    .boxed_local()
            }),
        }
    }

    pub fn call(&self, params: P, req: GrantRequest) -> HandlerFuture {
        (self.inner)(params, req)
    }
}

impl<P> Clone for GrantHandler<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> fmt::Debug for GrantHandler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GrantHandler")
    }
}

/// Receives a rejection instead of the default JSON error responder.
#[derive(Clone)]
pub struct BadRequestHandler {
    inner: Arc<HandlerFn<OAuth2Error>>,
}

impl BadRequestHandler {
    pub fn new<F, Fut, E>(f: F) -> Self
    where
        F: Fn(OAuth2Error, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        Self {
            inner: Arc::new(move |error: OAuth2Error, req: GrantRequest| -> HandlerFuture {
                f(error, req)
                    .map_err(Into::<actix_web::Error>::into)
                    .boxed_local()
            }),
        }
    }

    pub fn call(&self, error: OAuth2Error, req: GrantRequest) -> HandlerFuture {
        (self.inner)(error, req)
    }
}

impl fmt::Debug for BadRequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BadRequestHandler")
    }
}
