// --- File: crates/sellerhub_shopee/src/handlers.rs ---
use crate::models::{OrderBatch, OrderListQuery, OrderPage, ShopListing};
use crate::service::ShopeeService;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use sellerhub_common::models::{AuthorizationRequest, Order, PartnerCredential, ShopAuth, ShopDetails};
use sellerhub_common::SellerHubError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared state for all Shopee handlers.
#[derive(Clone)]
pub struct ShopeeState {
    pub service: Arc<ShopeeService>,
}

// --- Request / response payloads ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct CreatePartnerRequest {
    pub partner_id: String,
    #[serde(default)]
    pub partner_name: String,
    pub secret_key: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Default)]
pub struct UpdatePartnerRequest {
    pub partner_name: Option<String>,
    pub secret_key: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthLinkResponse {
    pub partner_id: String,
    pub url: String,
    pub request_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<AuthorizationRequest> for AuthLinkResponse {
    fn from(request: AuthorizationRequest) -> Self {
        Self {
            partner_id: request.partner_id,
            url: request.generated_url,
            request_id: request.id,
            created_at: request.created_at,
        }
    }
}

/// Query string the consent page appends to the redirect URL.
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub shop_id: String,
}

/// Untyped order list filter; empty or missing values use the service defaults.
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize, Default)]
pub struct ListOrdersQuery {
    /// `create_time` (default) or `update_time`
    pub time_range_field: Option<String>,
    /// Unix seconds; defaults to today 00:00:00 in the configured time zone
    pub time_from: Option<String>,
    /// Unix seconds; defaults to today 23:59:59 in the configured time zone
    pub time_to: Option<String>,
    pub order_status: Option<String>,
    pub cursor: Option<String>,
    pub page_size: Option<String>,
    pub response_optional_fields: Option<String>,
    #[serde(default)]
    pub request_order_status_pending: bool,
    pub logistics_channel_id: Option<i64>,
}

impl ListOrdersQuery {
    fn into_query(self) -> Result<OrderListQuery, SellerHubError> {
        let mut query = OrderListQuery::from_raw(
            self.time_range_field.as_deref().unwrap_or_default(),
            self.time_from.as_deref().unwrap_or_default(),
            self.time_to.as_deref().unwrap_or_default(),
            self.order_status.as_deref().unwrap_or_default(),
            self.cursor.as_deref().unwrap_or_default(),
            self.page_size.as_deref().unwrap_or_default(),
        )?;
        query.response_optional_fields = self.response_optional_fields.filter(|f| !f.is_empty());
        query.request_order_status_pending = self.request_order_status_pending;
        query.logistics_channel_id = self.logistics_channel_id;
        Ok(query)
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct OrderDetailQuery {
    /// Comma separated order SNs, at most 50
    pub order_sn_list: String,
    #[serde(default, alias = "pending")]
    pub request_order_status_pending: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct StoredOrdersQuery {
    pub limit: Option<i64>,
}

// --- Partners ---

pub async fn create_partner_handler(
    State(state): State<Arc<ShopeeState>>,
    Json(payload): Json<CreatePartnerRequest>,
) -> Result<(StatusCode, Json<PartnerCredential>), SellerHubError> {
    let partner = state
        .service
        .register_partner(&payload.partner_id, &payload.partner_name, &payload.secret_key)
        .await?;
    Ok((StatusCode::CREATED, Json(partner)))
}

pub async fn list_partners_handler(
    State(state): State<Arc<ShopeeState>>,
) -> Result<Json<Vec<PartnerCredential>>, SellerHubError> {
    Ok(Json(state.service.list_partners().await?))
}

pub async fn get_partner_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(partner_id): Path<String>,
) -> Result<Json<PartnerCredential>, SellerHubError> {
    Ok(Json(state.service.get_partner(&partner_id).await?))
}

pub async fn update_partner_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(partner_id): Path<String>,
    Json(payload): Json<UpdatePartnerRequest>,
) -> Result<Json<PartnerCredential>, SellerHubError> {
    let partner = state
        .service
        .update_partner(
            &partner_id,
            payload.partner_name.as_deref(),
            payload.secret_key.as_deref(),
        )
        .await?;
    Ok(Json(partner))
}

pub async fn delete_partner_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(partner_id): Path<String>,
) -> Result<StatusCode, SellerHubError> {
    state.service.delete_partner(&partner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Authorization ---

pub async fn auth_link_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(partner_id): Path<String>,
) -> Result<Json<AuthLinkResponse>, SellerHubError> {
    let request = state.service.request_authorization(&partner_id).await?;
    Ok(Json(request.into()))
}

pub async fn auth_history_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(partner_id): Path<String>,
) -> Result<Json<Vec<AuthLinkResponse>>, SellerHubError> {
    let history = state.service.authorization_history(&partner_id).await?;
    Ok(Json(history.into_iter().map(AuthLinkResponse::from).collect()))
}

/// Redirect target of the consent page.
pub async fn auth_callback_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(partner_id): Path<String>,
    Query(query): Query<AuthCallbackQuery>,
) -> Result<Json<ShopAuth>, SellerHubError> {
    info!(partner_id = %partner_id, shop_id = %query.shop_id, "Received Shopee authorization callback");
    let auth = state
        .service
        .exchange_code_for_tokens(&partner_id, &query.shop_id, &query.code)
        .await?;
    Ok(Json(auth))
}

// --- Shops ---

pub async fn list_shops_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(partner_id): Path<String>,
) -> Result<Json<ShopListing>, SellerHubError> {
    Ok(Json(state.service.list_shops_for_partner(&partner_id).await?))
}

pub async fn shop_token_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(shop_id): Path<String>,
) -> Result<Json<ShopAuth>, SellerHubError> {
    Ok(Json(state.service.get_usable_access_token(&shop_id).await?))
}

pub async fn shop_details_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(shop_id): Path<String>,
) -> Result<Json<ShopDetails>, SellerHubError> {
    Ok(Json(state.service.get_shop_details(&shop_id).await?))
}

// --- Orders ---

pub async fn list_orders_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(shop_id): Path<String>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrderPage>, SellerHubError> {
    let query = query.into_query()?;
    Ok(Json(state.service.list_orders(&shop_id, query).await?))
}

pub async fn order_details_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(shop_id): Path<String>,
    Query(query): Query<OrderDetailQuery>,
) -> Result<Json<OrderBatch>, SellerHubError> {
    let order_sns: Vec<String> = query
        .order_sn_list
        .split(',')
        .map(str::trim)
        .filter(|sn| !sn.is_empty())
        .map(str::to_string)
        .collect();
    let batch = state
        .service
        .get_order_details(&shop_id, &order_sns, query.request_order_status_pending)
        .await?;
    Ok(Json(batch))
}

pub async fn stored_orders_handler(
    State(state): State<Arc<ShopeeState>>,
    Path(shop_id): Path<String>,
    Query(query): Query<StoredOrdersQuery>,
) -> Result<Json<Vec<Order>>, SellerHubError> {
    let orders = state
        .service
        .stored_orders(&shop_id, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(orders))
}
