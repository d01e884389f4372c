// --- File: crates/sellerhub_shopee/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    AuthCallbackQuery, AuthLinkResponse, CreatePartnerRequest, ListOrdersQuery, OrderDetailQuery,
    StoredOrdersQuery, UpdatePartnerRequest,
};
use crate::models::{AuthorizedShop, IngestReport, OrderBatch, OrderPage, ShopListing, TimeRangeField};
use sellerhub_common::models::{
    InvoiceData, LinkedShop, Order, OrderDetails, OrderItem, OrderPackage, PackageItem,
    PartnerCredential, RecipientAddress, ShopAuth, ShopDetails,
};

#[utoipa::path(
    post,
    path = "/shopee/partners", // Path relative to /api
    request_body(content = CreatePartnerRequest, example = json!({
        "partner_id": "2001234",
        "partner_name": "Main storefront",
        "secret_key": "shpk-test-secret"
    })),
    responses(
        (status = 201, description = "Partner registered", body = PartnerCredential),
        (status = 400, description = "Missing or non-numeric partner id"),
        (status = 409, description = "Partner already registered")
    ),
    tag = "Shopee Partners"
)]
fn doc_create_partner_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/partners",
    responses((status = 200, description = "All registered partners", body = [PartnerCredential])),
    tag = "Shopee Partners"
)]
fn doc_list_partners_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/partners/{partner_id}",
    params(("partner_id" = String, Path, description = "Marketplace-issued partner id")),
    responses(
        (status = 200, description = "Partner", body = PartnerCredential),
        (status = 404, description = "Unknown partner")
    ),
    tag = "Shopee Partners"
)]
fn doc_get_partner_handler() {}

#[utoipa::path(
    put,
    path = "/shopee/partners/{partner_id}",
    params(("partner_id" = String, Path, description = "Marketplace-issued partner id")),
    request_body = UpdatePartnerRequest,
    responses(
        (status = 200, description = "Updated partner", body = PartnerCredential),
        (status = 404, description = "Unknown partner")
    ),
    tag = "Shopee Partners"
)]
fn doc_update_partner_handler() {}

#[utoipa::path(
    delete,
    path = "/shopee/partners/{partner_id}",
    params(("partner_id" = String, Path, description = "Marketplace-issued partner id")),
    responses(
        (status = 204, description = "Partner deleted"),
        (status = 404, description = "Unknown partner")
    ),
    tag = "Shopee Partners"
)]
fn doc_delete_partner_handler() {}

#[utoipa::path(
    post,
    path = "/shopee/partners/{partner_id}/auth-link",
    params(("partner_id" = String, Path, description = "Marketplace-issued partner id")),
    responses(
        (status = 200, description = "Signed consent URL, recorded in the audit log", body = AuthLinkResponse),
        (status = 404, description = "Unknown partner")
    ),
    tag = "Shopee Authorization"
)]
fn doc_auth_link_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/partners/{partner_id}/auth-requests",
    params(("partner_id" = String, Path, description = "Marketplace-issued partner id")),
    responses((status = 200, description = "Issued consent URLs, oldest first", body = [AuthLinkResponse])),
    tag = "Shopee Authorization"
)]
fn doc_auth_history_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/webhook/auth_partner/{partner_id}",
    params(
        ("partner_id" = String, Path, description = "Partner the consent was issued for"),
        AuthCallbackQuery
    ),
    responses(
        (status = 200, description = "Tokens stored for the shop", body = ShopAuth),
        (status = 400, description = "Missing code or shop_id"),
        (status = 502, description = "Shopee rejected the code")
    ),
    tag = "Shopee Authorization"
)]
fn doc_auth_callback_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/partners/{partner_id}/shops",
    params(("partner_id" = String, Path, description = "Marketplace-issued partner id")),
    responses(
        (status = 200, description = "Shops that authorized the partner", body = ShopListing),
        (status = 404, description = "Unknown partner")
    ),
    tag = "Shopee Shops"
)]
fn doc_list_shops_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/shops/{shop_id}/token",
    params(("shop_id" = String, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Usable credentials, refreshed if they were about to expire", body = ShopAuth),
        (status = 404, description = "Shop never authorized")
    ),
    tag = "Shopee Shops"
)]
fn doc_shop_token_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/shops/{shop_id}/details",
    params(("shop_id" = String, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Profile and shop info, cached after the first fetch", body = ShopDetails),
        (status = 404, description = "Shop never authorized")
    ),
    tag = "Shopee Shops"
)]
fn doc_shop_details_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/shops/{shop_id}/orders",
    params(("shop_id" = String, Path, description = "Shop id"), ListOrdersQuery),
    responses(
        (status = 200, description = "One synced page of orders", body = OrderPage),
        (status = 400, description = "Invalid filter"),
        (status = 502, description = "Shopee API error")
    ),
    tag = "Shopee Orders"
)]
fn doc_list_orders_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/shops/{shop_id}/orders/detail",
    params(("shop_id" = String, Path, description = "Shop id"), OrderDetailQuery),
    responses(
        (status = 200, description = "Synced order details", body = OrderBatch),
        (status = 400, description = "Empty or oversized order_sn_list")
    ),
    tag = "Shopee Orders"
)]
fn doc_order_details_handler() {}

#[utoipa::path(
    get,
    path = "/shopee/shops/{shop_id}/orders/stored",
    params(("shop_id" = String, Path, description = "Shop id"), StoredOrdersQuery),
    responses((status = 200, description = "Orders already in storage, newest first", body = [Order])),
    tag = "Shopee Orders"
)]
fn doc_stored_orders_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_create_partner_handler,
        doc_list_partners_handler,
        doc_get_partner_handler,
        doc_update_partner_handler,
        doc_delete_partner_handler,
        doc_auth_link_handler,
        doc_auth_history_handler,
        doc_auth_callback_handler,
        doc_list_shops_handler,
        doc_shop_token_handler,
        doc_shop_details_handler,
        doc_list_orders_handler,
        doc_order_details_handler,
        doc_stored_orders_handler
    ),
    components(
        schemas(
            CreatePartnerRequest, UpdatePartnerRequest, AuthLinkResponse,
            PartnerCredential, ShopAuth,
            AuthorizedShop, ShopListing, LinkedShop, ShopDetails,
            OrderPage, OrderBatch, IngestReport, TimeRangeField,
            Order, OrderDetails, OrderItem, OrderPackage, PackageItem, RecipientAddress, InvoiceData
        )
    ),
    tags(
        (name = "Shopee Partners", description = "Partner credential management"),
        (name = "Shopee Authorization", description = "Shop consent links and callback"),
        (name = "Shopee Shops", description = "Authorized shops, tokens and shop details"),
        (name = "Shopee Orders", description = "Order list and detail synchronisation")
    )
)]
pub struct ShopeeApiDoc;
