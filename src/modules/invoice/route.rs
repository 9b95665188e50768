use actix_web::web::{scope, ServiceConfig};

use crate::modules::invoice::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/invoices")
            .service(get_invoices)
            .service(create_invoice)
            .service(get_invoice)
            .service(update_invoice),
    );
}
