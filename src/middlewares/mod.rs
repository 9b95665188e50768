use actix_web::{
    body::MessageBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;

use crate::{
    api::error,
    modules::{policy::Principal, profile::service::ProfileService},
    utils::Claims,
    ENV,
};

/// Decodes an access token; refresh tokens are not accepted here.
pub fn decode_access_token(token: &str) -> Result<Claims, error::Error> {
    let claims = Claims::decode(token, ENV.jwt_secret.as_ref())
        .map_err(|_| error::Error::unauthorized("Token Invalid or Expired"))?;
    if !claims.is_access_token() {
        return Err(error::Error::unauthorized("Token Invalid or Expired"));
    }
    Ok(claims)
}

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Unauthorized").into());
        }
    };

    let claims = decode_access_token(token)?;

    req.extensions_mut().insert(claims);

    next.call(req).await
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    let extensions = req.extensions();

    let claims = extensions
        .get::<Claims>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .clone();

    Ok(claims)
}

/// Resolves the caller's role from its profile on every request.
impl FromRequest for Principal {
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = get_claims(req);
        let profiles = req.app_data::<web::Data<ProfileService>>().cloned();

        Box::pin(async move {
            let claims = claims?;
            let profiles = profiles.ok_or_else(|| {
                log::error!("ProfileService missing from app data");
                error::Error::internal_server_error()
            })?;
            Ok(profiles.principal(&claims).await?)
        })
    }
}
