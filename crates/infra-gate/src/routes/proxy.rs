use crate::services::http::RequestDispatcher;

use actix_web::{web, HttpRequest};

/// Largest request body the data plane will buffer before forwarding.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Configures the data-plane catch-all route.
///
/// Every path, including `/`, lands in the same resource and is handed to
/// the dispatcher; actual routing happens against the live route table, not
/// the web framework's router. The payload limit bounds the memory one
/// buffered request body can take.
pub fn configure_gate(cfg: &mut web::ServiceConfig, dispatcher: RequestDispatcher) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .service(
            web::resource("/{tail:.*}").to(move |req: HttpRequest, body: web::Bytes| {
                let dispatcher = dispatcher.clone();
                async move { dispatcher.handle_request(req, body).await }
            }),
        );
}
