use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, MessageResponse, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        services::AuthService,
    },
    error::{ApiError, ApiResult},
    extract::{AppForm, AppJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/protected", get(protected))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_register(payload: &RegisterRequest) -> ApiResult<()> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::Validation("username is required".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation("password is required".into()));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    Ok(())
}

#[instrument(skip(auth, payload), fields(username = %payload.username))]
pub async fn register(
    State(auth): State<AuthService>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    payload.email = payload.email.trim().to_owned();
    if let Err(e) = validate_register(&payload) {
        warn!(error = %e, "register rejected");
        return Err(e);
    }

    auth.register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "User registered successfully".into(),
    }))
}

#[instrument(skip(auth, form), fields(username = %form.username))]
pub async fn login(
    State(auth): State<AuthService>,
    AppForm(form): AppForm<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let token = auth.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip_all, fields(username = %user))]
pub async fn protected(AuthUser(user): AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Hello {user}, you accessed a protected route!"),
    })
}
