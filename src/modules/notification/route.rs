use actix_web::web::ServiceConfig;

use crate::modules::notification::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_notifications);
}

/// The socket authenticates from its query string, outside the bearer middleware.
pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(notifications_socket);
}
