use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pizza_auth::{can_act, Action, AuthContext, Target};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{MenuItem, NewMenuItem, NewOrder, Order};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListOrdersQuery {
    pub page: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub diner_id: Uuid,
    pub orders: Vec<Order>,
    pub page: usize,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
}

pub async fn get_menu(State(state): State<AppState>) -> ServiceResult<Json<Vec<MenuItem>>> {
    let menu = state.db.menu().await?;
    Ok(Json(menu))
}

/// Returns the full menu including the new item.
pub async fn add_menu_item(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<NewMenuItem>,
) -> ServiceResult<Json<Vec<MenuItem>>> {
    if !can_act(&auth.claims, Action::EditMenu, &Target::none()) {
        return Err(ServiceError::forbidden("unable to add menu item"));
    }

    state.db.add_menu_item(request).await?;
    let menu = state.db.menu().await?;
    Ok(Json(menu))
}

pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListOrdersQuery>,
) -> ServiceResult<Json<OrderListResponse>> {
    let (orders, _more) = state
        .db
        .orders_for_user(auth.subject(), query.page, state.config.default_page_limit)
        .await?;
    Ok(Json(OrderListResponse {
        diner_id: auth.subject(),
        orders,
        page: query.page,
    }))
}

pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<NewOrder>,
) -> ServiceResult<Json<CreateOrderResponse>> {
    let order = state.db.create_order(auth.subject(), request).await?;
    Ok(Json(CreateOrderResponse { order }))
}
