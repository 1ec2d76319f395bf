use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pizza_auth::{can_act, Action, AuthContext, Target};

use crate::auth_handlers::MessageResponse;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{Franchise, FranchiseAdmin, StoreLocation};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListFranchisesQuery {
    pub page: usize,
    pub limit: Option<usize>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateFranchiseRequest {
    pub name: String,
    pub admins: Vec<FranchiseAdminRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FranchiseAdminRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateStoreRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FranchiseListResponse {
    pub franchises: Vec<FranchiseView>,
    pub more: bool,
}

/// Public projection of a franchise; the admin roster is only present for
/// admin callers.
#[derive(Debug, Serialize)]
pub struct FranchiseView {
    pub id: Uuid,
    pub name: String,
    pub stores: Vec<StoreLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admins: Option<Vec<FranchiseAdmin>>,
}

impl FranchiseView {
    fn project(franchise: Franchise, include_admins: bool) -> Self {
        Self {
            id: franchise.id,
            name: franchise.name,
            stores: franchise.stores,
            admins: include_admins.then_some(franchise.admins),
        }
    }
}

/// Anonymous access is allowed; admins additionally see each franchise's
/// admin roster.
pub async fn list_franchises(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    Query(query): Query<ListFranchisesQuery>,
) -> ServiceResult<Json<FranchiseListResponse>> {
    let limit = query.limit.unwrap_or(state.config.default_page_limit);
    let (franchises, more) = state
        .db
        .list_franchises(query.page, limit, query.name.as_deref())
        .await?;

    let include_admins = auth.as_ref().is_some_and(AuthContext::is_admin);
    let franchises = franchises
        .into_iter()
        .map(|franchise| FranchiseView::project(franchise, include_admins))
        .collect();
    Ok(Json(FranchiseListResponse { franchises, more }))
}

/// Callers other than the user themselves (or an admin) get an empty list
/// rather than an error.
pub async fn list_user_franchises(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ServiceResult<Json<Vec<Franchise>>> {
    let Some(target_id) = Uuid::parse_str(&user_id).ok() else {
        return Ok(Json(Vec::new()));
    };
    if !can_act(
        &auth.claims,
        Action::ViewUserFranchises,
        &Target::owner(target_id),
    ) {
        return Ok(Json(Vec::new()));
    }

    let franchises = state.db.franchises_for_user(target_id).await?;
    Ok(Json(franchises))
}

pub async fn create_franchise(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateFranchiseRequest>,
) -> ServiceResult<Json<Franchise>> {
    if !can_act(&auth.claims, Action::CreateFranchise, &Target::none()) {
        return Err(ServiceError::forbidden("unable to create a franchise"));
    }

    let mut admin_ids = Vec::with_capacity(request.admins.len());
    for admin in &request.admins {
        let user = state
            .db
            .find_user_by_email(&admin.email)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!(
                    "unknown user for franchise admin {} provided",
                    admin.email
                ))
            })?;
        admin_ids.push(user.id);
    }

    let franchise = state.db.create_franchise(request.name, admin_ids).await?;
    Ok(Json(franchise))
}

pub async fn delete_franchise(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(franchise_id): Path<String>,
) -> ServiceResult<Json<MessageResponse>> {
    let franchise_id = Uuid::parse_str(&franchise_id).ok();
    let target = Target {
        owner_id: None,
        franchise_id,
    };
    if !can_act(&auth.claims, Action::DeleteFranchise, &target) {
        return Err(ServiceError::forbidden("unable to delete a franchise"));
    }
    let franchise_id =
        franchise_id.ok_or_else(|| ServiceError::not_found("unknown franchise"))?;

    state.db.delete_franchise(franchise_id).await?;
    Ok(Json(MessageResponse {
        message: "franchise deleted",
    }))
}

pub async fn create_store(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(franchise_id): Path<String>,
    Json(request): Json<CreateStoreRequest>,
) -> ServiceResult<Json<StoreLocation>> {
    let franchise_id = Uuid::parse_str(&franchise_id).ok();
    let target = Target {
        owner_id: None,
        franchise_id,
    };
    if !can_act(&auth.claims, Action::CreateStore, &target) {
        return Err(ServiceError::forbidden("unable to create a store"));
    }
    let franchise_id =
        franchise_id.ok_or_else(|| ServiceError::not_found("unknown franchise"))?;

    let store = state.db.create_store(franchise_id, request.name).await?;
    Ok(Json(store))
}

pub async fn delete_store(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((franchise_id, store_id)): Path<(String, String)>,
) -> ServiceResult<Json<MessageResponse>> {
    let franchise_id = Uuid::parse_str(&franchise_id).ok();
    let target = Target {
        owner_id: None,
        franchise_id,
    };
    if !can_act(&auth.claims, Action::DeleteStore, &target) {
        return Err(ServiceError::forbidden("unable to delete a store"));
    }
    let franchise_id =
        franchise_id.ok_or_else(|| ServiceError::not_found("unknown franchise"))?;
    let store_id = Uuid::parse_str(&store_id)
        .map_err(|_| ServiceError::not_found("unknown store"))?;

    state.db.delete_store(franchise_id, store_id).await?;
    Ok(Json(MessageResponse {
        message: "store deleted",
    }))
}
