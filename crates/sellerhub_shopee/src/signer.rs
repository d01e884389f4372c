//! Request signing for the Shopee partner API.
//!
//! Every call carries `partner_id`, `timestamp` and `sign` query parameters, where `sign` is
//! the hex HMAC-SHA256 of a base string keyed with the partner secret:
//!
//! | scope      | base string                                                  |
//! |------------|--------------------------------------------------------------|
//! | `PUBLIC`   | `partner_id ‖ path ‖ timestamp`                              |
//! | `SHOP`     | `partner_id ‖ path ‖ timestamp ‖ access_token ‖ shop_id`     |
//! | `MERCHANT` | `partner_id ‖ path ‖ timestamp ‖ access_token ‖ merchant_id` |
//!
//! `path` is the full versioned path (`/api/v2/...`). The timestamp that went into the
//! signature must be the one sent on the wire, so [`SignedRequest`] carries it.

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("unsupported API path: {0}")]
    UnsupportedPath(String),

    #[error("invalid signature scope: {0}")]
    InvalidScope(String),

    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// Which fields are folded into the base string.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignScope {
    Public,
    Shop,
    Merchant,
}

impl FromStr for SignScope {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(SignScope::Public),
            "SHOP" => Ok(SignScope::Shop),
            "MERCHANT" => Ok(SignScope::Merchant),
            _ => Err(SignatureError::InvalidScope(s.to_string())),
        }
    }
}

impl fmt::Display for SignScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignScope::Public => "PUBLIC",
            SignScope::Shop => "SHOP",
            SignScope::Merchant => "MERCHANT",
        })
    }
}

/// The provider endpoints this crate talks to, with their HTTP method and signing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    AuthPartner,
    TokenGet,
    AccessTokenGet,
    ShopsByPartner,
    OrderList,
    OrderDetail,
    ShopProfile,
    ShopInfo,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::AuthPartner,
        Endpoint::TokenGet,
        Endpoint::AccessTokenGet,
        Endpoint::ShopsByPartner,
        Endpoint::OrderList,
        Endpoint::OrderDetail,
        Endpoint::ShopProfile,
        Endpoint::ShopInfo,
    ];

    /// Path relative to the API prefix.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::AuthPartner => "/shop/auth_partner",
            Endpoint::TokenGet => "/auth/token/get",
            Endpoint::AccessTokenGet => "/auth/access_token/get",
            Endpoint::ShopsByPartner => "/public/get_shops_by_partner",
            Endpoint::OrderList => "/order/get_order_list",
            Endpoint::OrderDetail => "/order/get_order_detail",
            Endpoint::ShopProfile => "/shop/get_profile",
            Endpoint::ShopInfo => "/shop/get_shop_info",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::TokenGet | Endpoint::AccessTokenGet => Method::POST,
            _ => Method::GET,
        }
    }

    pub fn scope(self) -> SignScope {
        match self {
            Endpoint::AuthPartner | Endpoint::TokenGet | Endpoint::ShopsByPartner => {
                SignScope::Public
            }
            Endpoint::AccessTokenGet
            | Endpoint::OrderList
            | Endpoint::OrderDetail
            | Endpoint::ShopProfile
            | Endpoint::ShopInfo => SignScope::Shop,
        }
    }

    /// Looks a path up in the endpoint table. Accepts it with or without `api_prefix`.
    pub fn from_path(path: &str, api_prefix: &str) -> Result<Self, SignatureError> {
        let relative = path.strip_prefix(api_prefix).unwrap_or(path);
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.path() == relative)
            .ok_or_else(|| SignatureError::UnsupportedPath(path.to_string()))
    }
}

/// Identity and credentials folded into a signature.
///
/// `shop_id` and `access_token` are ignored for [`SignScope::Public`].
#[derive(Clone, Copy)]
pub struct SignParams<'a> {
    pub partner_id: &'a str,
    pub secret_key: &'a str,
    pub shop_id: &'a str,
    pub access_token: &'a str,
}

impl<'a> SignParams<'a> {
    pub fn public(partner_id: &'a str, secret_key: &'a str) -> Self {
        Self {
            partner_id,
            secret_key,
            shop_id: "",
            access_token: "",
        }
    }

    pub fn shop(
        partner_id: &'a str,
        secret_key: &'a str,
        shop_id: &'a str,
        access_token: &'a str,
    ) -> Self {
        Self {
            partner_id,
            secret_key,
            shop_id,
            access_token,
        }
    }
}

impl fmt::Debug for SignParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignParams")
            .field("partner_id", &self.partner_id)
            .field("shop_id", &self.shop_id)
            .finish_non_exhaustive()
    }
}

/// Output of the signer: everything needed to put the call on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub signature: String,
    pub method: Method,
    pub canonical_path: String,
    /// Unix seconds; send this exact value as the `timestamp` query parameter.
    pub signed_at: i64,
    pub scope: SignScope,
}

#[derive(Debug, Clone)]
pub struct Signer {
    api_prefix: String,
}

impl Signer {
    pub fn new(api_prefix: impl Into<String>) -> Self {
        Self {
            api_prefix: api_prefix.into(),
        }
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// Signs `path` at the current time.
    pub fn sign(
        &self,
        scope: SignScope,
        path: &str,
        params: &SignParams<'_>,
    ) -> Result<SignedRequest, SignatureError> {
        self.sign_at(scope, path, params, Utc::now().timestamp())
    }

    /// Signs `path` with its own table scope.
    pub fn sign_endpoint(
        &self,
        endpoint: Endpoint,
        params: &SignParams<'_>,
    ) -> Result<SignedRequest, SignatureError> {
        self.sign(endpoint.scope(), endpoint.path(), params)
    }

    pub fn sign_at(
        &self,
        scope: SignScope,
        path: &str,
        params: &SignParams<'_>,
        timestamp: i64,
    ) -> Result<SignedRequest, SignatureError> {
        let endpoint = Endpoint::from_path(path, &self.api_prefix)?;
        let canonical_path = format!("{}{}", self.api_prefix, endpoint.path());

        let base = base_string(scope, &canonical_path, params, timestamp);
        let signature = hmac_sha256_hex(params.secret_key, &base)?;

        Ok(SignedRequest {
            signature,
            method: endpoint.method(),
            canonical_path,
            signed_at: timestamp,
            scope,
        })
    }
}

/// Concatenates the scope's fields with no separator.
pub fn base_string(
    scope: SignScope,
    canonical_path: &str,
    params: &SignParams<'_>,
    timestamp: i64,
) -> String {
    let mut base = format!("{}{}{}", params.partner_id, canonical_path, timestamp);
    match scope {
        SignScope::Public => {}
        SignScope::Shop => {
            base.push_str(params.access_token);
            base.push_str(params.shop_id);
        }
        SignScope::Merchant => {
            // merchant-level APIs are not wired up, the merchant id is always empty
            base.push_str(params.access_token);
        }
    }
    base
}

pub fn hmac_sha256_hex(secret_key: &str, message: &str) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
