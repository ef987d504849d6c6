//! HTTP server setup.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{api, model::AppState};

/// Create and bind the slash-command server.
///
/// Signal handling is left to the caller, see [`super::run_until_shutdown`].
pub fn main_server(
    app_state: Arc<AppState>,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::from(app_state.clone()))
            .configure(api::routes)
    })
    .disable_signals()
    .bind((address, port))?
    .run())
}
