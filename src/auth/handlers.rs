use crate::{
    api::error::ViewError,
    model::role::Role,
    models::{BackendLogin, LoginReqDto, LoginResponse, RegisterReqDto},
    state::AppState,
};
use actix_web::{HttpResponse, web};
use serde_json::json;
use std::str::FromStr;
use tracing::{debug, error, info, instrument, warn};

const CREDENTIALS_REQUIRED: &str = "Username and password are required.";

/// Sign in against the backend and store the session
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 303, description = "Already signed in; redirected to the role dashboard"),
        (status = 400, description = "Missing credentials", body = Object, example = json!({
            "error": "Username and password are required."
        })),
        (status = 502, description = "Rejected by the backend", body = Object, example = json!({
            "error": "Invalid username or password"
        }))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ViewError> {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.username.is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(ViewError::validation(CREDENTIALS_REQUIRED));
    }

    // 2️⃣ Ask the backend
    let body = json!({ "username": user.username, "password": user.password });
    let answer = state
        .views
        .login
        .post("", &body)
        .await
        .map_err(|e| ViewError::upstream_as(e, "Invalid username or password"))?;

    let backend: BackendLogin = serde_json::from_value(answer).map_err(|e| {
        error!(error = %e, "Unreadable login response");
        ViewError::Upstream("Invalid username or password".into())
    })?;

    // 3️⃣ Only known roles get a session
    let role = match Role::from_str(&backend.role) {
        Ok(role) => role,
        Err(_) => {
            warn!(role = %backend.role, "Login returned an unknown role");
            return Err(ViewError::validation("Unexpected user role. Contact support."));
        }
    };

    debug!(user_id = backend.id, %role, "Storing session");
    state.reset_views();

    state
        .session
        .login(backend.id, backend.token, backend.username.clone(), role)
        .map_err(|e| {
            error!(error = %e, "Failed to persist session");
            ViewError::Render("Failed to store session".into())
        })?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        redirect: role.dashboard_path().to_string(),
        username: backend.username,
        role: role.to_string(),
    }))
}

/// Create an account on the backend
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterReqDto,
    responses(
        (status = 200, description = "Registered", body = Object, example = json!({
            "message": "Registration successful", "redirect": "/login"
        })),
        (status = 400, description = "Missing credentials", body = Object),
        (status = 502, description = "Backend refused", body = Object, example = json!({
            "error": "Registration failed"
        }))
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(state, user), fields(username = %user.username))]
pub async fn register(
    user: web::Json<RegisterReqDto>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ViewError> {
    if user.username.is_empty() || user.password.is_empty() {
        return Err(ViewError::validation(CREDENTIALS_REQUIRED));
    }

    let body = json!({ "username": user.username, "password": user.password });
    state
        .views
        .register
        .post("", &body)
        .await
        .map_err(|e| ViewError::upstream_as(e, "Registration failed"))?;

    info!("Registration accepted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Registration successful",
        "redirect": "/login"
    })))
}

/// Drop the session and cancel every pending backend call
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Signed out", body = Object, example = json!({
            "message": "Logged out", "redirect": "/login"
        }))
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn logout(state: web::Data<AppState>) -> Result<HttpResponse, ViewError> {
    state.views.teardown_all();
    state.reset_views();
    state.session.logout().map_err(|e| {
        error!(error = %e, "Failed to clear session");
        ViewError::Render("Failed to clear session".into())
    })?;

    info!("Logged out");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Logged out",
        "redirect": "/login"
    })))
}
