use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pizza_auth::{AuthContext, Role, TokenSubject};

use crate::credentials::{hash_password, verify_password};
use crate::error::{ServiceError, ServiceResult};
use crate::store::{NewUser, User};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ServiceResult<Json<AuthResponse>> {
    let missing = [&request.name, &request.email, &request.password]
        .iter()
        .any(|field| field.trim().is_empty());
    if missing {
        return Err(ServiceError::MissingFields);
    }

    let password_hash = hash_password(&request.password)?;
    let user = state
        .db
        .create_user(NewUser {
            name: request.name,
            email: request.email,
            password_hash,
            roles: vec![Role::Diner],
        })
        .await?;

    let token = issue_for(&state, &user)?;
    Ok(Json(AuthResponse { user, token }))
}

/// Unknown email and wrong password produce the same not-found signal so the
/// response shape cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ServiceResult<Json<AuthResponse>> {
    let user = state
        .db
        .find_user_by_email(&request.email)
        .await?
        .filter(|user| verify_password(&user.password_hash, &request.password));

    let Some(user) = user else {
        debug!("login rejected");
        return Err(ServiceError::not_found("unknown user"));
    };

    let token = issue_for(&state, &user)?;
    Ok(Json(AuthResponse { user, token }))
}

pub async fn logout(State(state): State<AppState>, auth: AuthContext) -> Json<MessageResponse> {
    state.tokens.revoke(&auth.token);
    Json(MessageResponse {
        message: "logout successful",
    })
}

pub(crate) fn issue_for(state: &AppState, user: &User) -> ServiceResult<String> {
    let subject = TokenSubject {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        roles: user.roles.clone(),
    };
    state.tokens.issue(&subject).map_err(ServiceError::from)
}
