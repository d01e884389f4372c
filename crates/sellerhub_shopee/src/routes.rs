// --- File: crates/sellerhub_shopee/src/routes.rs ---

use crate::handlers::{
    auth_callback_handler, auth_history_handler, auth_link_handler, create_partner_handler,
    delete_partner_handler, get_partner_handler, list_orders_handler, list_partners_handler,
    list_shops_handler, order_details_handler, shop_details_handler, shop_token_handler,
    stored_orders_handler, update_partner_handler, ShopeeState,
};
use crate::service::ShopeeService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the Shopee feature.
///
/// Paths are relative to the `/api` mount point.
pub fn routes(service: Arc<ShopeeService>) -> Router {
    let state = Arc::new(ShopeeState { service });

    Router::new()
        // Partner management
        .route(
            "/shopee/partners",
            post(create_partner_handler).get(list_partners_handler),
        )
        .route(
            "/shopee/partners/{partner_id}",
            get(get_partner_handler)
                .put(update_partner_handler)
                .delete(delete_partner_handler),
        )
        // Authorization
        .route("/shopee/partners/{partner_id}/auth-link", post(auth_link_handler))
        .route(
            "/shopee/partners/{partner_id}/auth-requests",
            get(auth_history_handler),
        )
        .route(
            "/shopee/webhook/auth_partner/{partner_id}",
            get(auth_callback_handler),
        )
        // Shops
        .route("/shopee/partners/{partner_id}/shops", get(list_shops_handler))
        .route("/shopee/shops/{shop_id}/token", get(shop_token_handler))
        .route("/shopee/shops/{shop_id}/details", get(shop_details_handler))
        // Orders
        .route("/shopee/shops/{shop_id}/orders", get(list_orders_handler))
        .route("/shopee/shops/{shop_id}/orders/detail", get(order_details_handler))
        .route("/shopee/shops/{shop_id}/orders/stored", get(stored_orders_handler))
        .with_state(state)
}
