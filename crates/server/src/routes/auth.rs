use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use service::auth::domain::{AuthUser, LoginInput, RegisterInput, SessionSnapshot};
use service::auth::repository::UserRepository;
use service::auth::AuthService;
use service::domain::DomainService;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<dyn UserRepository>>,
    pub domains: Arc<DomainService>,
    pub cookie_name: String,
    pub token_ttl_hours: i64,
    /// Request body cap for multipart uploads.
    pub body_limit: usize,
}

impl ServerState {
    /// Two image parts plus form fields fit under this cap.
    pub fn upload_body_limit(max_file_size: u64) -> usize {
        (max_file_size as usize).saturating_mul(2).saturating_add(1024 * 1024)
    }
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub message: &'static str,
    pub user: SessionSnapshot,
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub message: &'static str,
    pub user: AuthUser,
}

#[utoipa::path(post, path = "/api/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged in, jwt cookie set"), (status = 400, description = "Incorrect Password"),
              (status = 404, description = "Email address doesn't exist"), (status = 503, description = "Domains unavailable")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;

    let mut cookie = Cookie::new(state.cookie_name.clone(), session.token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::hours(state.token_ttl_hours));
    let jar = jar.add(cookie);

    Ok((jar, Json(LoginOutput { message: "You have successfully Login", user: session.user })))
}

#[utoipa::path(post, path = "/api/logout", tag = "auth", responses((status = 200, description = "Cookie cleared")))]
pub async fn logout(State(state): State<ServerState>, jar: CookieJar) -> impl IntoResponse {
    let mut cookie = Cookie::from(state.cookie_name.clone());
    cookie.set_path("/");
    let jar = jar.remove(cookie);
    (jar, Json(common::types::MessageBody::new("success")))
}

#[utoipa::path(post, path = "/api/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 200, description = "Account created"), (status = 400, description = "Validation failed or email exists"),
              (status = 401, description = "Unauthenticated")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<RegisterOutput>, JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok(Json(RegisterOutput { message: "Account created successfully", user }))
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Accepts `Authorization: Bearer <jwt>` or the session cookie. Anything
/// else is 401 `Unauthenticated`.
pub async fn require_auth(
    State(state): State<ServerState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let token = match bearer_token(&req) {
        Some(t) => t.to_string(),
        None => match jar.get(&state.cookie_name) {
            Some(c) if !c.value().is_empty() => c.value().to_string(),
            _ => {
                tracing::warn!(path = %path, "missing bearer token and session cookie");
                return Err(JsonApiError::unauthenticated());
            }
        },
    };

    match state.auth.verify_token(&token) {
        Ok(claims) => {
            tracing::debug!(path = %path, user = %claims.sub, "authenticated");
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(JsonApiError::unauthenticated())
        }
    }
}
