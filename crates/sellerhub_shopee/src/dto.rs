//! Wire shapes of the Shopee partner API.
//!
//! Every response carries the `request_id`/`error`/`message` header read by
//! [`EnvelopeHeader::from_body`]; payload structs below only describe what follows it.
//! Fields default when absent so optional provider fields never fail a decode.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treats an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub request_id: String,
    pub error: String,
    pub message: String,
}

impl EnvelopeHeader {
    /// Reads each header field on its own, so an oddly typed sibling never hides `error`.
    ///
    /// Strings are taken as is and numbers are rendered; anything else counts as empty.
    /// A body that is not a JSON object yields an empty header.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |name: &str| match value.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Self {
            request_id: field("request_id"),
            error: field("error"),
            message: field("message"),
        }
    }
}

// --- Auth ---

/// Body of `/auth/token/get`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGetBody<'a> {
    pub code: &'a str,
    pub partner_id: i64,
    pub shop_id: i64,
}

/// Body of `/auth/access_token/get`.
#[derive(Clone, Serialize)]
pub struct RefreshTokenBody<'a> {
    pub refresh_token: &'a str,
    pub partner_id: i64,
    pub shop_id: i64,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    #[serde(deserialize_with = "nullable")]
    pub access_token: String,
    #[serde(deserialize_with = "nullable")]
    pub refresh_token: String,
    /// Seconds until the access token expires, as reported by the provider.
    pub expire_in: i64,
    pub partner_id: Option<i64>,
    pub shop_id: Option<i64>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("expire_in", &self.expire_in)
            .field("partner_id", &self.partner_id)
            .field("shop_id", &self.shop_id)
            .finish_non_exhaustive()
    }
}

// --- Shops by partner ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SipAffiShop {
    pub affi_shop_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub region: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthedShop {
    pub shop_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub region: String,
    pub auth_time: i64,
    pub expire_time: i64,
    #[serde(deserialize_with = "nullable")]
    pub sip_affi_shop_list: Vec<SipAffiShop>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShopsByPartnerResponse {
    #[serde(deserialize_with = "nullable")]
    pub authed_shop_list: Vec<AuthedShop>,
    pub more: bool,
}

// --- Orders ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderRef {
    pub order_sn: String,
    #[serde(deserialize_with = "nullable")]
    pub booking_sn: String,
    #[serde(deserialize_with = "nullable")]
    pub order_status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderListPage {
    pub more: bool,
    #[serde(deserialize_with = "nullable")]
    pub next_cursor: String,
    #[serde(deserialize_with = "nullable")]
    pub order_list: Vec<OrderRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderListResponse {
    pub response: OrderListPage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireRecipientAddress {
    pub name: String,
    pub phone: String,
    pub town: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub region: String,
    pub zipcode: String,
    pub full_address: String,
    pub virtual_contact_number: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageInfo {
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireOrderItem {
    pub item_id: i64,
    pub item_name: String,
    pub item_sku: String,
    pub model_id: i64,
    pub model_name: String,
    pub model_sku: String,
    pub model_quantity_purchased: i64,
    pub model_original_price: f64,
    pub model_discounted_price: f64,
    pub wholesale: bool,
    pub weight: f64,
    pub add_on_deal: bool,
    pub main_item: bool,
    pub add_on_deal_id: i64,
    pub promotion_type: String,
    pub promotion_id: i64,
    pub order_item_id: i64,
    pub promotion_group_id: i64,
    pub image_info: ImageInfo,
    #[serde(deserialize_with = "nullable")]
    pub product_location_id: Vec<String>,
    pub is_prescription_item: bool,
    pub is_b2c_owned_item: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WirePackageItem {
    pub item_id: i64,
    pub model_id: i64,
    pub model_quantity: i64,
    pub order_item_id: i64,
    pub promotion_group_id: i64,
    pub product_location_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WirePackage {
    pub package_number: String,
    pub logistics_status: String,
    pub logistics_channel_id: i64,
    pub shipping_carrier: String,
    pub allow_self_design_awb: bool,
    #[serde(deserialize_with = "nullable")]
    pub item_list: Vec<WirePackageItem>,
    pub group_shipment_id: i64,
    pub parcel_chargeable_weight_gram: i64,
    pub package_query_number: String,
    pub sorting_group: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireInvoice {
    pub number: String,
    pub series_number: String,
    pub access_key: String,
    pub issue_date: i64,
    pub total_value: f64,
    pub products_total_value: f64,
    pub tax_code: String,
}

/// One entry of `/order/get_order_detail`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireOrderDetail {
    pub order_sn: String,
    pub booking_sn: String,
    pub order_status: String,
    pub region: String,
    pub currency: String,
    pub cod: bool,
    pub total_amount: f64,
    #[serde(deserialize_with = "nullable")]
    pub pending_terms: Vec<String>,
    pub shipping_carrier: String,
    pub checkout_shipping_carrier: String,
    pub payment_method: String,
    pub estimated_shipping_fee: f64,
    pub actual_shipping_fee: f64,
    pub actual_shipping_fee_confirmed: bool,
    pub reverse_shipping_fee: f64,
    pub message_to_seller: String,
    pub note: String,
    pub note_update_time: i64,
    pub create_time: i64,
    pub update_time: i64,
    pub days_to_ship: i64,
    pub ship_by_date: i64,
    pub pay_time: i64,
    pub pickup_done_time: i64,
    pub edt_from: i64,
    pub edt_to: i64,
    pub return_request_due_date: i64,
    pub buyer_user_id: i64,
    pub buyer_username: String,
    pub buyer_cpf_id: String,
    pub recipient_address: WireRecipientAddress,
    #[serde(deserialize_with = "nullable")]
    pub item_list: Vec<WireOrderItem>,
    #[serde(deserialize_with = "nullable")]
    pub package_list: Vec<WirePackage>,
    pub invoice_data: Option<WireInvoice>,
    pub goods_to_declare: bool,
    pub dropshipper: String,
    pub dropshipper_phone: String,
    pub split_up: bool,
    pub buyer_cancel_reason: String,
    pub cancel_by: String,
    pub cancel_reason: String,
    pub fulfillment_flag: String,
    pub order_chargeable_weight_gram: i64,
    #[serde(deserialize_with = "nullable")]
    pub prescription_images: Vec<String>,
    pub prescription_check_status: i64,
    pub advance_package: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderDetailList {
    #[serde(deserialize_with = "nullable")]
    pub order_list: Vec<WireOrderDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderDetailResponse {
    #[serde(deserialize_with = "nullable")]
    pub warning: Vec<String>,
    pub response: OrderDetailList,
}

// --- Shop ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShopProfile {
    pub shop_logo: String,
    pub description: String,
    pub shop_name: String,
    pub invoice_issuer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShopProfileResponse {
    pub response: ShopProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkedDirectShop {
    pub direct_shop_id: i64,
    pub direct_shop_region: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutletShop {
    pub outlet_shop_id: i64,
}

/// `/shop/get_shop_info` is not wrapped in `response`; its fields sit next to the header.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShopInfoResponse {
    pub shop_name: String,
    pub region: String,
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub sip_affi_shops: Vec<SipAffiShop>,
    pub is_cb: bool,
    pub is_sip: bool,
    pub is_upgraded_cbsc: bool,
    pub merchant_id: Option<i64>,
    pub shop_fulfillment_flag: String,
    pub is_main_shop: bool,
    pub is_direct_shop: bool,
    pub linked_main_shop_id: Option<i64>,
    #[serde(deserialize_with = "nullable")]
    pub linked_direct_shop_list: Vec<LinkedDirectShop>,
    pub is_one_awb: bool,
    pub is_mart_shop: bool,
    pub is_outlet_shop: bool,
    pub mart_shop_id: Option<i64>,
    #[serde(deserialize_with = "nullable")]
    pub outlet_shop_info_list: Vec<OutletShop>,
    pub auth_time: i64,
    pub expire_time: i64,
}
