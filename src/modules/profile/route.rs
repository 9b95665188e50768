use crate::modules::profile::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/auth").service(sign_up).service(sign_in).service(refresh).service(sign_out),
    );
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/profile").service(get_own_profile)).service(
        scope("/clients").service(list_clients).service(get_client).service(update_client),
    );
}
