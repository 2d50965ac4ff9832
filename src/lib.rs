pub mod handlers;

use std::sync::Arc;

use quecho_core::{Quecho, QuechoError};

use crate::handlers::EchoHandler;

/// Builds the server: the echo handler answers `/` for every method and is
/// also the fallback, so any path reaches it.
pub fn app(config: &quecho_config::Echo) -> Result<Quecho, QuechoError> {
    let echo = Arc::new(EchoHandler::from_config(config));

    let mut app = Quecho::new();
    app.add_any_route("/", Arc::clone(&echo).into_handler())?;
    app.set_fallback(echo.into_handler());
    Ok(app)
}
