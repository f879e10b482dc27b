use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::ValidatedJson;
use crate::middleware::auth::{AdminClaims, ADMIN_ROLE};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/admin/login", post(login_admin))
}

async fn login_admin(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if !state.auth.verify_admin(&req.username, &req.password) {
        tracing::warn!("Failed admin login for user '{}'", req.username);
        return Err(AppError::AuthenticationError("Invalid username or password".to_string()));
    }

    let claims = AdminClaims {
        sub: req.username,
        role: ADMIN_ROLE.to_owned(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(state.auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    tracing::info!("Admin '{}' logged in", claims.sub);
    Ok(Json(AuthResponse {
        token,
        expires_in: state.auth.expiration,
    }))
}
