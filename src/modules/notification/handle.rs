use actix_web::{get, web, HttpRequest, HttpResponse};
use actix_ws::{Message, Session};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    api::{error, success},
    middlewares::decode_access_token,
    modules::{
        notification::{
            aggregator::{NotificationAggregator, NotificationCounts},
            repository_pg::NotificationRepositoryPg,
        },
        policy::Principal,
        profile::service::ProfileService,
    },
};

pub type NotificationSvc = NotificationAggregator<NotificationRepositoryPg>;

#[get("/notifications")]
pub async fn get_notifications(
    aggregator: web::Data<NotificationSvc>,
    principal: Principal,
) -> Result<success::Success<NotificationCounts>, error::Error> {
    let counts = aggregator.recompute(&principal).await?;
    Ok(success::Success::ok(Some(counts)))
}

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// Browsers cannot set headers on a websocket handshake, so the access
/// token travels in the query string.
#[get("/ws/notifications")]
pub async fn notifications_socket(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<SocketQuery>,
    aggregator: web::Data<NotificationSvc>,
    profiles: web::Data<ProfileService>,
) -> Result<HttpResponse, actix_web::Error> {
    let token = query
        .token
        .as_deref()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?;
    let claims = decode_access_token(token)?;
    let principal = profiles.principal(&claims).await.map_err(error::Error::from)?;

    let (response, ws_session, msg_stream) = actix_ws::handle(&req, stream)?;

    tracing::info!("Notification socket opened for {}", principal.id);
    actix_web::rt::spawn(run_socket(aggregator.into_inner(), principal, ws_session, msg_stream));

    Ok(response)
}

enum Wake {
    Client(Option<Result<Message, actix_ws::ProtocolError>>),
    Changed(bool),
}

async fn run_socket(
    aggregator: Arc<NotificationSvc>,
    principal: Principal,
    mut ws_session: Session,
    mut msg_stream: actix_ws::MessageStream,
) {
    let user_id = principal.id;
    let mut session = aggregator.open(principal).await;

    if push(&mut ws_session, session.counts()).await {
        loop {
            let wake = tokio::select! {
                msg = msg_stream.recv() => Wake::Client(msg),
                changed = session.changed() => Wake::Changed(changed),
            };

            match wake {
                Wake::Changed(true) => {
                    let counts = session.refresh().await;
                    if !push(&mut ws_session, counts).await {
                        break;
                    }
                }
                Wake::Changed(false) => {
                    tracing::warn!("Change feed closed, dropping socket for {}", user_id);
                    break;
                }
                Wake::Client(Some(Ok(Message::Ping(data)))) => {
                    if ws_session.pong(&data).await.is_err() {
                        break;
                    }
                }
                Wake::Client(Some(Ok(Message::Close(reason)))) => {
                    tracing::debug!("Notification socket close frame: {:?}", reason);
                    break;
                }
                Wake::Client(Some(Ok(_))) => {}
                Wake::Client(Some(Err(e))) => {
                    tracing::error!("Notification socket protocol error: {}", e);
                    break;
                }
                Wake::Client(None) => break,
            }
        }
    }

    session.close();
    let _ = ws_session.close(None).await;
    tracing::info!("Notification socket closed for {}", user_id);
}

async fn push(ws_session: &mut Session, counts: NotificationCounts) -> bool {
    let payload = match serde_json::to_string(&counts) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Could not encode notification counts: {}", e);
            return false;
        }
    };
    ws_session.text(payload).await.is_ok()
}
