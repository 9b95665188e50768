use actix_web::{
    cookie::{time, Cookie},
    get, patch, post, web, HttpRequest,
};
use uuid::Uuid;

use crate::modules::policy::Principal;
use crate::modules::profile::{model, schema::UserRole, service::ProfileService};
use crate::{
    api::{error, success},
    utils::ValidatedJson,
    ENV,
};

fn refresh_cookie(value: String, max_age: i64) -> Cookie<'static> {
    Cookie::build("refresh_token", value)
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(max_age))
        .finish()
}

#[get("")]
pub async fn get_own_profile(
    profile_service: web::Data<ProfileService>,
    principal: Principal,
) -> Result<success::Success<model::ProfileResponse>, error::Error> {
    let profile = profile_service.get_profile(&principal, principal.id).await?;
    Ok(success::Success::ok(Some(profile)).message("Profile retrieved successfully"))
}

#[get("")]
pub async fn list_clients(
    profile_service: web::Data<ProfileService>,
    principal: Principal,
) -> Result<success::Success<Vec<model::ProfileResponse>>, error::Error> {
    let clients = profile_service.list_by_role(&principal, UserRole::Client).await?;
    Ok(success::Success::ok(Some(clients)))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_client(
    profile_service: web::Data<ProfileService>,
    principal: Principal,
    id: web::Path<Uuid>,
) -> Result<success::Success<model::ProfileResponse>, error::Error> {
    let profile = profile_service.get_profile(&principal, id.into_inner()).await?;
    Ok(success::Success::ok(Some(profile)))
}

#[patch("/{id:[0-9a-fA-F-]{36}}")]
pub async fn update_client(
    profile_service: web::Data<ProfileService>,
    principal: Principal,
    id: web::Path<Uuid>,
    body: ValidatedJson<model::UpdateProfileModel>,
) -> Result<success::Success<model::ProfileResponse>, error::Error> {
    let profile = profile_service.update_profile(&principal, id.into_inner(), body.0).await?;
    Ok(success::Success::ok(Some(profile)).message("Profile updated successfully"))
}

#[post("/signup")]
pub async fn sign_up(
    profile_service: web::Data<ProfileService>,
    body: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<model::SignUpResponse>, error::Error> {
    let id = profile_service.sign_up(body.0).await?;
    Ok(success::Success::created(Some(model::SignUpResponse { id })).message("Signup successful"))
}

#[post("/signin")]
pub async fn sign_in(
    profile_service: web::Data<ProfileService>,
    body: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let (access_token, refresh_token) = profile_service.sign_in(body.0).await?;

    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Signin successful")
        .cookies(vec![refresh_cookie(refresh_token, ENV.refresh_token_expiration as i64)]))
}

#[post("/refresh")]
pub async fn refresh(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    let (access_token, refresh_token) = profile_service.refresh(refresh_token).await?;

    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Refresh successful")
        .cookies(vec![refresh_cookie(refresh_token, ENV.refresh_token_expiration as i64)]))
}

#[get("/signout")]
pub async fn sign_out(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    profile_service.sign_out(refresh_token).await?;

    let mut cleared = refresh_cookie(String::new(), 0);
    cleared.set_expires(time::OffsetDateTime::UNIX_EPOCH);
    Ok(success::Success::no_content().cookies(vec![cleared]))
}
