use crate::auth::auth::AuthUser;
use crate::auth::guard::{GuardDecision, LOGIN_PATH, guard, guest_only as guest_redirect};
use crate::model::role::Role;
use crate::state::AppState;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::LOCATION,
    web::Data,
};
use serde_json::json;
use tracing::debug;

/// `303 See Other` to `target`, with the target repeated in the body for
/// callers that do not follow redirects.
pub fn redirect_to(target: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, target))
        .json(json!({ "redirect": target }))
}

async fn enforce(
    req: ServiceRequest,
    next: Next<BoxBody>,
    required: &[Role],
) -> Result<ServiceResponse<BoxBody>, Error> {
    let state = req
        .app_data::<Data<AppState>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App state missing"))?;

    let session = state.session.current();

    match guard(session.as_ref(), required) {
        GuardDecision::Allow => {
            if let Some(session) = session {
                req.extensions_mut().insert(AuthUser::from(session));
            }
            next.call(req).await
        }
        decision => {
            let target = decision.redirect_target().unwrap_or(LOGIN_PATH);
            debug!(path = %req.path(), target, "Guard redirect");
            let resp = redirect_to(target);
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}

pub async fn admin_only(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    enforce(req, next, &[Role::Admin]).await
}

pub async fn hr_only(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    enforce(req, next, &[Role::Hr]).await
}

pub async fn staff_only(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    enforce(req, next, &[Role::Staff]).await
}

/// Any role, as long as a token is held.
pub async fn signed_in(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    enforce(req, next, &[]).await
}

/// Login and register: signed-in operators are sent to their dashboard.
pub async fn guest_only(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let dashboard = req
        .app_data::<Data<AppState>>()
        .and_then(|state| guest_redirect(state.session.current().as_ref()));

    match dashboard {
        Some(target) => {
            let resp = redirect_to(target);
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
        None => next.call(req).await,
    }
}
