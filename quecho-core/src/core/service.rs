use std::{
    collections::HashMap,
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
};

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{
    body::{Body, Bytes},
    service::Service,
    Request as HyperRequest, Response as HyperResponse,
};

use crate::core::error::QuechoError;
use crate::core::http::{parse_query, HttpMethod, Request, Response};
use crate::core::router::Routes;
use crate::IntoResponse;

/// Largest request body buffered before the request is rejected with 413.
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone)]
pub struct QuechoService {
    pub routes: Arc<Routes>,
    pub body_limit: usize,
}

impl QuechoService {
    pub fn new(routes: Arc<Routes>) -> Self {
        Self {
            routes,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Runs one request through the route table. Handler errors are turned
    /// into error responses here so a failing request never takes the
    /// connection task down with it.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let Some(matched) = self.routes.find(&req.method, &req.path) else {
            return QuechoError::not_found("Route not found.").into_response();
        };

        req.path_params = matched.params;
        let method = req.method.clone();
        let path = req.path.clone();

        match (matched.handler)(req).await {
            Ok(res) => res,
            Err(err) => {
                quecho_log::error!("{method:?} {path} failed: {err}");
                err.into_response()
            }
        }
    }
}

impl<B> Service<HyperRequest<B>> for QuechoService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Response = HyperResponse<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, hyper_req: HyperRequest<B>) -> Self::Future {
        let method = HttpMethod::from_hyper(hyper_req.method());
        let path = hyper_req.uri().path().to_string();

        quecho_log::info!("Incoming request: {method:?} {path}");

        let service = self.clone();
        Box::pin(async move {
            let (parts, body) = hyper_req.into_parts();
            let body_bytes = match Limited::new(body, service.body_limit).collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    let err = if e.downcast_ref::<LengthLimitError>().is_some() {
                        quecho_log::warn!("Request body exceeds {} bytes: {method:?} {path}", service.body_limit);
                        QuechoError::payload_too_large("Request body too large.")
                    } else {
                        quecho_log::warn!("Failed to read request body: {e}");
                        QuechoError::bad_request("Failed to read request body.")
                    };
                    let res: HyperResponse<Full<Bytes>> = err.into_response().into();
                    return Ok::<_, Infallible>(res);
                }
            };

            let mut headers = HashMap::new();
            for (name, value) in parts.headers.iter() {
                headers.insert(name.to_string(), value.to_str().unwrap_or("").to_string());
            }

            let query_params = parts.uri.query().map_or_else(HashMap::new, parse_query);

            let quecho_req = Request::new(
                method,
                path,
                headers,
                HashMap::new(),
                query_params,
                body_bytes.to_vec(),
            );

            quecho_log::debug!("Request details: {{ method: {:?}, path: {:?}, headers: {:?}, query_params: {:?}, body_len: {} }}",
                quecho_req.method,
                quecho_req.path,
                quecho_req.headers,
                quecho_req.query_params,
                quecho_req.body.len()
            );

            let hyper_res: HyperResponse<Full<Bytes>> = service.dispatch(quecho_req).await.into();
            Ok::<_, Infallible>(hyper_res)
        })
    }
}
