//! Domain entities for the marketplace integration.
//!
//! There is one type per entity. Wire DTOs are mapped into these by the Shopee crate and
//! repositories bind them to rows; nothing else duplicates their fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor stamped into `created_by` / `updated_by` when no caller identity is known.
pub const SYSTEM_ACTOR: &str = "sellerhub";

const REDACTED: &str = "<redacted>";

/// A partner credential pair issued by the marketplace.
///
/// `secret_key` is only ever used to compute signatures; it is not serialized and not
/// printed by `Debug`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct PartnerCredential {
    pub partner_id: String,
    pub partner_name: String,
    #[serde(skip_serializing, default)]
    pub secret_key: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl PartnerCredential {
    pub fn new(
        partner_id: impl Into<String>,
        partner_name: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            partner_id: partner_id.into(),
            partner_name: partner_name.into(),
            secret_key: secret_key.into(),
            created_at: now,
            created_by: SYSTEM_ACTOR.to_string(),
            updated_at: now,
            updated_by: SYSTEM_ACTOR.to_string(),
        }
    }
}

impl fmt::Debug for PartnerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartnerCredential")
            .field("partner_id", &self.partner_id)
            .field("partner_name", &self.partner_name)
            .field("secret_key", &REDACTED)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Per-shop OAuth credentials. One live row per shop.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopAuth {
    pub partner_id: String,
    pub shop_id: String,
    pub authorization_code: String,
    pub access_token: String,
    #[serde(skip_serializing, default)]
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl ShopAuth {
    /// Row written by shop-list sync before the seller has granted access.
    pub fn placeholder(partner_id: impl Into<String>, shop_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            partner_id: partner_id.into(),
            shop_id: shop_id.into(),
            authorization_code: String::new(),
            access_token: String::new(),
            refresh_token: String::new(),
            expires_at: now,
            created_at: now,
            created_by: SYSTEM_ACTOR.to_string(),
            updated_at: now,
            updated_by: SYSTEM_ACTOR.to_string(),
        }
    }

    /// A placeholder has never gone through a code exchange and cannot be refreshed.
    pub fn is_authorized(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Whole seconds left before `expires_at`, negative once expired.
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.expires_at.timestamp() - now.timestamp()
    }
}

impl fmt::Debug for ShopAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopAuth")
            .field("partner_id", &self.partner_id)
            .field("shop_id", &self.shop_id)
            .field("access_token", &REDACTED)
            .field("refresh_token", &REDACTED)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Append-only audit row, one per generated authorization link.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorizationRequest {
    pub id: Option<i64>,
    pub partner_id: String,
    pub partner_name: String,
    #[serde(skip_serializing, default)]
    pub secret_key_used: String,
    pub generated_url: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl fmt::Debug for AuthorizationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationRequest")
            .field("id", &self.id)
            .field("partner_id", &self.partner_id)
            .field("generated_url", &self.generated_url)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A shop linked to another one (SIP affiliates, direct shops).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LinkedShop {
    pub shop_id: String,
    pub region: String,
}

/// Read-through cache of a shop's profile and info.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopDetails {
    pub shop_id: String,
    pub shop_name: String,
    pub logo: String,
    pub description: String,
    pub invoice_issuer: String,
    pub region: String,
    pub status: String,
    pub fulfillment_flag: String,
    pub is_cb: bool,
    pub is_sip: bool,
    pub is_upgraded_cbsc: bool,
    pub is_main_shop: bool,
    pub is_direct_shop: bool,
    pub is_one_awb: bool,
    pub is_mart_shop: bool,
    pub is_outlet_shop: bool,
    pub merchant_id: Option<String>,
    pub linked_main_shop_id: Option<String>,
    pub mart_shop_id: Option<String>,
    pub sip_affiliated_shops: Vec<LinkedShop>,
    pub linked_direct_shops: Vec<LinkedShop>,
    pub outlet_shop_ids: Vec<String>,
    pub auth_time: Option<DateTime<Utc>>,
    pub expire_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecipientAddress {
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

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderItem {
    pub item_id: String,
    pub item_name: String,
    pub item_sku: String,
    pub model_id: String,
    pub model_name: String,
    pub model_sku: String,
    pub quantity: i64,
    pub original_price: f64,
    pub discounted_price: f64,
    pub wholesale: bool,
    pub weight: f64,
    pub add_on_deal: bool,
    pub main_item: bool,
    pub add_on_deal_id: Option<String>,
    pub promotion_type: String,
    pub promotion_id: Option<String>,
    pub order_item_id: String,
    pub promotion_group_id: Option<String>,
    pub image_url: String,
    pub product_location_ids: Vec<String>,
    pub is_prescription_item: bool,
    pub is_b2c_owned_item: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PackageItem {
    pub item_id: String,
    pub model_id: String,
    pub quantity: i64,
    pub order_item_id: String,
    pub promotion_group_id: Option<String>,
    pub product_location_id: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderPackage {
    pub package_number: String,
    pub logistics_status: String,
    pub logistics_channel_id: String,
    pub shipping_carrier: String,
    pub allow_self_design_awb: bool,
    pub items: Vec<PackageItem>,
    pub group_shipment_id: Option<String>,
    pub parcel_chargeable_weight_gram: i64,
    pub package_query_number: String,
    pub sorting_group: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InvoiceData {
    pub number: String,
    pub series_number: String,
    pub access_key: String,
    pub issue_date: Option<DateTime<Utc>>,
    pub total_value: f64,
    pub products_total_value: f64,
    pub tax_code: String,
}

/// Everything about an order beyond its identity and status.
///
/// Stored as a single JSON document next to the indexed columns of [`Order`].
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderDetails {
    pub region: String,
    pub currency: String,
    pub cod: bool,
    pub total_amount: f64,
    pub estimated_shipping_fee: f64,
    pub actual_shipping_fee: f64,
    pub actual_shipping_fee_confirmed: bool,
    pub reverse_shipping_fee: f64,
    pub payment_method: String,
    pub shipping_carrier: String,
    pub checkout_shipping_carrier: String,
    pub message_to_seller: String,
    pub note: String,
    pub note_update_time: Option<DateTime<Utc>>,
    pub buyer_user_id: String,
    pub buyer_username: String,
    pub buyer_cpf_id: String,
    pub days_to_ship: i64,
    pub ship_by_date: Option<DateTime<Utc>>,
    pub pay_time: Option<DateTime<Utc>>,
    pub pickup_done_time: Option<DateTime<Utc>>,
    pub edt_from: Option<DateTime<Utc>>,
    pub edt_to: Option<DateTime<Utc>>,
    pub return_request_due_date: Option<DateTime<Utc>>,
    pub recipient_address: RecipientAddress,
    pub items: Vec<OrderItem>,
    pub packages: Vec<OrderPackage>,
    pub invoice: Option<InvoiceData>,
    pub pending_terms: Vec<String>,
    pub cancel_by: String,
    pub cancel_reason: String,
    pub buyer_cancel_reason: String,
    pub dropshipper: String,
    pub dropshipper_phone: String,
    pub split_up: bool,
    pub goods_to_declare: bool,
    pub fulfillment_flag: String,
    pub order_chargeable_weight_gram: i64,
    pub prescription_images: Vec<String>,
    pub prescription_check_status: i64,
    pub advance_package: bool,
}

/// Aggregate root keyed by the provider's order SN.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub shop_id: String,
    pub order_sn: String,
    pub booking_sn: String,
    pub order_status: String,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub details: OrderDetails,
    pub synced_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_do_not_leak_through_debug_or_json() {
        let partner = PartnerCredential::new("1001", "Acme", "super-secret");
        let debug = format!("{:?}", partner);
        assert!(!debug.contains("super-secret"));

        let json = serde_json::to_string(&partner).unwrap();
        assert!(!json.contains("super-secret"));
    }

    #[test]
    fn placeholder_is_not_authorized() {
        let auth = ShopAuth::placeholder("1001", "55");
        assert!(!auth.is_authorized());
        assert!(auth.access_token.is_empty());
    }

    #[test]
    fn seconds_until_expiry_is_negative_when_expired() {
        let mut auth = ShopAuth::placeholder("1001", "55");
        let now = Utc::now();
        auth.expires_at = now - chrono::Duration::seconds(30);
        assert_eq!(auth.seconds_until_expiry(now), -30);
    }
}
