use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pizza_auth::{can_act, Action, AuthContext, Role, Target};

use crate::auth_handlers::{issue_for, AuthResponse, MessageResponse};
use crate::credentials::hash_password;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{User, UserPatch};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListUsersQuery {
    pub page: usize,
    pub limit: Option<usize>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub more: bool,
}

pub async fn get_me(State(state): State<AppState>, auth: AuthContext) -> ServiceResult<Json<User>> {
    let user = state
        .db
        .get_user(auth.subject())
        .await?
        .ok_or_else(|| ServiceError::not_found("unknown user"))?;
    Ok(Json(user))
}

/// Admin may update anyone including roles; everyone else only their own
/// record and never their role set.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ServiceResult<Json<AuthResponse>> {
    let target_id = Uuid::parse_str(&user_id).ok();
    let target = Target {
        owner_id: target_id,
        franchise_id: None,
    };
    if !can_act(&auth.claims, Action::UpdateUser, &target) {
        return Err(ServiceError::forbidden("unauthorized"));
    }
    let target_id = target_id.ok_or_else(|| ServiceError::not_found("unknown user"))?;

    if request.roles.is_some() && !auth.is_admin() {
        return Err(ServiceError::forbidden("unauthorized"));
    }

    let password_hash = match request.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let user = state
        .db
        .update_user(
            target_id,
            UserPatch {
                name: request.name,
                email: request.email,
                password_hash,
                roles: request.roles,
            },
        )
        .await?;

    // Reissue so the caller holds a token matching the updated identity.
    let token = issue_for(&state, &user)?;
    Ok(Json(AuthResponse { user, token }))
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListUsersQuery>,
) -> ServiceResult<Json<UserListResponse>> {
    if !can_act(&auth.claims, Action::ListUsers, &Target::none()) {
        return Err(ServiceError::forbidden("unauthorized"));
    }

    let limit = query.limit.unwrap_or(state.config.default_page_limit);
    let (users, more) = state
        .db
        .list_users(query.page, limit, query.name.as_deref())
        .await?;
    Ok(Json(UserListResponse { users, more }))
}

/// Deleting a user also revokes every token they still hold.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ServiceResult<Json<MessageResponse>> {
    if !can_act(&auth.claims, Action::DeleteUser, &Target::none()) {
        return Err(ServiceError::forbidden("unauthorized"));
    }
    let target_id = Uuid::parse_str(&user_id)
        .map_err(|_| ServiceError::not_found("unknown user"))?;

    state.db.delete_user(target_id).await?;
    state.tokens.revoke_subject(target_id);
    Ok(Json(MessageResponse {
        message: "user deleted",
    }))
}
