//! Test fixtures for the Shopee integration tests
//!
//! Every test gets its own in-memory database and its own wiremock server standing in for
//! the partner API.
#![allow(dead_code)]

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sellerhub_common::models::{PartnerCredential, ShopAuth};
use sellerhub_config::ShopeeConfig;
use sellerhub_db::repositories::shop_auth::ShopAuthUpsert;
use sellerhub_db::{DbClient, PartnerRepository, ShopAuthRepository, ShopeeRepositories};
use sellerhub_shopee::ShopeeService;
use serde_json::{json, Value};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::{Match, MockServer, Request};

pub const PARTNER_ID: &str = "2001";
pub const PARTNER_SECRET: &str = "K1-test-secret";
pub const SHOP_ID: &str = "5501";
pub const REDIRECT_BASE: &str = "http://127.0.0.1:8086/api/shopee/webhook/auth_partner";

pub struct TestEnv {
    pub server: MockServer,
    pub service: Arc<ShopeeService>,
    pub repos: ShopeeRepositories,
}

pub async fn setup() -> TestEnv {
    setup_with(|_| {}).await
}

/// Like [`setup`], letting the test adjust the Shopee config first.
pub async fn setup_with(customize: impl FnOnce(&mut ShopeeConfig)) -> TestEnv {
    let server = MockServer::start().await;

    let mut config = ShopeeConfig::with_base_url(server.uri(), REDIRECT_BASE);
    customize(&mut config);

    let db = DbClient::from_url("sqlite::memory:").await.unwrap();
    let repos = ShopeeRepositories::new(db);
    repos.init_schema().await.unwrap();
    repos
        .partners
        .create_partner(PartnerCredential::new(PARTNER_ID, "Test partner", PARTNER_SECRET))
        .await
        .unwrap();

    let service = Arc::new(ShopeeService::new(config, repos.clone()).unwrap());
    TestEnv {
        server,
        service,
        repos,
    }
}

/// Stores credentials for [`SHOP_ID`] expiring `expires_in_secs` from now.
pub async fn seed_shop_auth(
    repos: &ShopeeRepositories,
    access_token: &str,
    refresh_token: &str,
    expires_in_secs: i64,
) -> ShopAuth {
    repos
        .shop_auth
        .upsert_shop_auth(ShopAuthUpsert {
            partner_id: PARTNER_ID,
            shop_id: SHOP_ID,
            authorization_code: "code-0",
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
            actor: "test",
        })
        .await
        .unwrap()
}

/// Wraps `payload` in a successful response envelope.
pub fn envelope(payload: Value) -> Value {
    let mut body = json!({ "request_id": "req-test", "error": "", "message": "" });
    if let (Some(body), Some(payload)) = (body.as_object_mut(), payload.as_object()) {
        for (key, value) in payload {
            body.insert(key.clone(), value.clone());
        }
    }
    body
}

pub fn error_envelope(error: &str, message: &str) -> Value {
    json!({ "request_id": "req-err", "error": error, "message": message })
}

pub fn order_detail(order_sn: &str, status: &str, create_time: i64) -> Value {
    json!({
        "order_sn": order_sn,
        "order_status": status,
        "region": "SG",
        "currency": "SGD",
        "total_amount": 42.5,
        "create_time": create_time,
        "update_time": create_time + 60,
        "buyer_user_id": 7001,
        "buyer_username": "buyer_one",
        "recipient_address": { "name": "Tan", "city": "Singapore", "full_address": "1 Test Rd" },
        "item_list": [{
            "item_id": 100200,
            "item_name": "Widget",
            "model_id": 0,
            "model_quantity_purchased": 1,
            "model_discounted_price": 42.5
        }],
        "package_list": [{ "package_number": format!("PKG-{}", order_sn), "logistics_channel_id": 18025 }]
    })
}

pub fn hmac_hex(key: &str, message: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes()).unwrap();
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Matches requests whose `sign` query parameter is the expected HMAC for their own
/// path and `timestamp`.
pub struct SignedWith {
    /// Empty for PUBLIC scope.
    pub access_token: String,
    pub shop_id: String,
}

impl SignedWith {
    pub fn public() -> Self {
        Self {
            access_token: String::new(),
            shop_id: String::new(),
        }
    }

    pub fn shop(access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            shop_id: SHOP_ID.to_string(),
        }
    }
}

impl Match for SignedWith {
    fn matches(&self, request: &Request) -> bool {
        let query: HashMap<String, String> = request.url.query_pairs().into_owned().collect();
        let (Some(timestamp), Some(sign), Some(partner_id)) =
            (query.get("timestamp"), query.get("sign"), query.get("partner_id"))
        else {
            return false;
        };
        let base = format!(
            "{}{}{}{}{}",
            partner_id,
            request.url.path(),
            timestamp,
            self.access_token,
            self.shop_id
        );
        *sign == hmac_hex(PARTNER_SECRET, &base)
    }
}
