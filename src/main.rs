use actix_cors::Cors;
use actix_web::{
    self, http::header, middleware::{from_fn, Logger}, web, App, HttpResponse, HttpServer,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, RedisCache},
    constants::CHANGE_FEED_CAPACITY,
    middlewares::authentication,
    modules::{
        conversation::{handle::ConversationSvc, repository_pg::ConversationRepositoryPg},
        file_upload::{
            handle::FileUploadSvc, FileRepositoryPg, LocalStorage, UploadConfig, UrlSigner,
        },
        inquiry::{handle::SubmissionSvc, repository_pg::SubmissionRepositoryPg},
        invoice::{handle::InvoiceSvc, repository_pg::InvoiceRepositoryPg},
        message::{handle::MessageSvc, repository_pg::MessageRepositoryPg},
        notification::{
            feed::ChangeFeed, handle::NotificationSvc, listener,
            repository_pg::NotificationRepositoryPg,
        },
        profile::{repository_pg::ProfileRepositoryPg, service::ProfileService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check(db_pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(db_pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().body("Server is running"),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().body("Database unavailable")
        }
    }
}

/// Public routes first, then everything behind the bearer token.
fn api_configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(modules::profile::route::public_api_configure)
        .configure(modules::inquiry::route::public_api_configure)
        .configure(modules::file_upload::route::public_api_configure)
        .configure(modules::notification::route::public_api_configure)
        .service(
            web::scope("")
                .wrap(from_fn(authentication))
                .configure(modules::profile::route::configure)
                .configure(modules::conversation::route::configure)
                .configure(modules::message::route::configure)
                .configure(modules::file_upload::route::configure)
                .configure(modules::invoice::route::configure)
                .configure(modules::inquiry::route::configure)
                .configure(modules::notification::route::configure),
        );
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        log::warn!("Tracing subscriber already set: {}", e);
    }

    let db_pool = connect_database().await.map_err(|e| {
        log::error!("Database connection error: {:?}", e);
        std::io::Error::other("Database connection error")
    })?;

    let redis_cache = RedisCache::new().await.map_err(|e| {
        log::error!("Redis connection error: {:?}", e);
        std::io::Error::other("Redis connection error")
    })?;

    let feed = ChangeFeed::new(CHANGE_FEED_CAPACITY);
    listener::spawn(db_pool.clone(), feed.clone());

    let profile_repo = Arc::new(ProfileRepositoryPg::new(db_pool.clone()));
    let conversation_repo = Arc::new(ConversationRepositoryPg::new(db_pool.clone()));

    let profile_service = web::Data::new(ProfileService::with_dependencies(
        profile_repo.clone(),
        Some(Arc::new(redis_cache)),
    ));
    let conversation_service = web::Data::new(ConversationSvc::with_dependencies(
        conversation_repo.clone(),
        profile_repo.clone(),
    ));
    let message_service = web::Data::new(MessageSvc::with_dependencies(
        Arc::new(MessageRepositoryPg::new(db_pool.clone())),
        conversation_repo.clone(),
    ));
    let file_service = web::Data::new(FileUploadSvc::new(
        Arc::new(FileRepositoryPg::new(db_pool.clone())),
        Arc::new(LocalStorage::new(&ENV.storage_dir)),
        conversation_repo.clone(),
        UrlSigner::new(ENV.jwt_secret.as_bytes(), &ENV.public_url, ENV.signed_url_ttl),
        UploadConfig::default(),
    ));
    let invoice_service = web::Data::new(InvoiceSvc::with_dependencies(
        Arc::new(InvoiceRepositoryPg::new(db_pool.clone())),
        profile_repo.clone(),
    ));
    let submission_service = web::Data::new(SubmissionSvc::with_dependencies(Arc::new(
        SubmissionRepositoryPg::new(db_pool.clone()),
    )));
    let notification_service = web::Data::new(NotificationSvc::new(
        Arc::new(NotificationRepositoryPg::new(db_pool.clone())),
        feed.clone(),
    ));
    let db_data = web::Data::new(db_pool);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(profile_service.clone())
            .app_data(conversation_service.clone())
            .app_data(message_service.clone())
            .app_data(file_service.clone())
            .app_data(invoice_service.clone())
            .app_data(submission_service.clone())
            .app_data(notification_service.clone())
            .app_data(db_data.clone())
            .service(health_check)
            .service(web::scope("/api").configure(api_configure))
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
