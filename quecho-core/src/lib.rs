pub mod core;

pub use core::error::QuechoError;
pub use core::extractor::{FromRequest, Query};
pub use core::http::{parse_query, HttpMethod, IntoResponse, Request, Response};
pub use core::router::{handler, Handler, HandlerFuture, Routes};
pub use core::server::Quecho;
pub use core::service::{QuechoService, DEFAULT_BODY_LIMIT};
pub use hyper::StatusCode;
