use actix_web::web::{scope, ServiceConfig};

use crate::modules::{conversation::handle::*, message::handle::mark_conversation_read};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/conversations")
            .service(get_conversations)
            .service(create_conversation)
            .service(mark_conversation_read)
            .service(get_conversation)
            .service(update_conversation),
    );
}
