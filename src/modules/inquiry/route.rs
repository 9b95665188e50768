use actix_web::web::{scope, ServiceConfig};

use crate::modules::inquiry::handle::*;

/// The contact form is open to anonymous visitors.
pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/public").service(submit_inquiry));
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/inquiries").service(get_inquiries).service(get_inquiry).service(update_inquiry),
    )
    .service(
        scope("/ideas").service(get_ideas).service(create_idea).service(get_idea).service(update_idea),
    );
}
