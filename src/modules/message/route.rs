use actix_web::web::{scope, ServiceConfig};

use crate::modules::message::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/messages").service(get_messages).service(send_message).service(mark_message_read),
    );
}
