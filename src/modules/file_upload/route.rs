use actix_web::web::{scope, ServiceConfig};

use crate::modules::file_upload::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(upload_file).service(scope("/files").service(get_file).service(delete_file));
}

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(get_object);
}
