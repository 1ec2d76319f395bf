use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use pizza_auth::TokenService;

use crate::config::ServiceConfig;
use crate::store::Datastore;
use crate::{auth_handlers, franchise_handlers, order_handlers, user_handlers};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Datastore>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<ServiceConfig>,
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<ServiceConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/healthz", get(health))
        .route(
            "/api/auth",
            post(auth_handlers::register)
                .put(auth_handlers::login)
                .delete(auth_handlers::logout),
        )
        .route("/api/user/me", get(user_handlers::get_me))
        .route("/api/user", get(user_handlers::list_users))
        .route(
            "/api/user/:user_id",
            put(user_handlers::update_user).delete(user_handlers::delete_user),
        )
        .route(
            "/api/franchise",
            get(franchise_handlers::list_franchises).post(franchise_handlers::create_franchise),
        )
        .route(
            "/api/franchise/:id",
            get(franchise_handlers::list_user_franchises)
                .delete(franchise_handlers::delete_franchise),
        )
        .route(
            "/api/franchise/:franchise_id/store",
            post(franchise_handlers::create_store),
        )
        .route(
            "/api/franchise/:franchise_id/store/:store_id",
            delete(franchise_handlers::delete_store),
        )
        .route(
            "/api/order/menu",
            get(order_handlers::get_menu).put(order_handlers::add_menu_item),
        )
        .route(
            "/api/order",
            get(order_handlers::list_orders).post(order_handlers::create_order),
        )
        .with_state(state)
        .layer(cors)
}
