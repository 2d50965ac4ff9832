use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::Arc,
};

use crate::core::error::QuechoError;
use crate::core::http::{HttpMethod, Request, Response};

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response, QuechoError>> + Send>>;

pub type Handler = Box<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Boxes an async closure into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, QuechoError>> + Send + 'static,
{
    Box::new(move |req| Box::pin(f(req)))
}

/// Route table owned by a single server instance.
///
/// Lookup order: routes registered for the request's method, then routes
/// registered for any method, then the fallback.
#[derive(Default)]
pub struct Routes {
    by_method: HashMap<HttpMethod, matchit::Router<Arc<Handler>>>,
    any_method: matchit::Router<Arc<Handler>>,
    fallback: Option<Arc<Handler>>,
}

pub struct RouteMatch {
    pub handler: Arc<Handler>,
    pub params: HashMap<String, String>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, method: HttpMethod, path: &str, handler: Arc<Handler>) -> Result<(), QuechoError> {
        self.by_method
            .entry(method)
            .or_default()
            .insert(path, handler)
            .map_err(|e| QuechoError::internal_server_error(format!("Invalid route {path}: {e}")))
    }

    pub fn add_any(&mut self, path: &str, handler: Arc<Handler>) -> Result<(), QuechoError> {
        self.any_method
            .insert(path, handler)
            .map_err(|e| QuechoError::internal_server_error(format!("Invalid route {path}: {e}")))
    }

    pub fn set_fallback(&mut self, handler: Arc<Handler>) {
        self.fallback = Some(handler);
    }

    pub fn find(&self, method: &HttpMethod, path: &str) -> Option<RouteMatch> {
        let matched = self
            .by_method
            .get(method)
            .and_then(|router| router.at(path).ok())
            .or_else(|| self.any_method.at(path).ok());

        match matched {
            Some(m) => Some(RouteMatch {
                handler: m.value.clone(),
                params: m.params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            }),
            None => self.fallback.clone().map(|handler| RouteMatch {
                handler,
                params: HashMap::new(),
            }),
        }
    }
}
