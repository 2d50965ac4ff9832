pub mod echo_handler;

pub use echo_handler::{EchoHandler, EchoParams, QueryRecord};
