pub mod error;
pub mod extractor;
pub mod http;
pub mod router;
pub mod server;
pub mod service;
