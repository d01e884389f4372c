//! Shopee partner API client module
//!
//! This module provides the client that performs signed calls against the Shopee
//! partner API (v2). It owns the HTTP connection pool and the [`Signer`], and turns every
//! response envelope into either a typed payload or a [`ShopeeError`].
//!
//! The client holds no credentials. Partner secrets and shop tokens are passed in per call,
//! so one client serves every partner and shop.

use crate::dto::{
    EnvelopeHeader, OrderDetailResponse, OrderListPage, OrderListResponse, RefreshTokenBody,
    ShopInfoResponse, ShopProfile, ShopProfileResponse, ShopsByPartnerResponse, TokenGetBody,
    TokenResponse,
};
use crate::error::ShopeeError;
use crate::models::{OrderListParams, MAX_ORDER_SN_BATCH};
use crate::signer::{Endpoint, SignParams, SignScope, Signer};
use reqwest::{Client, StatusCode};
use sellerhub_common::create_client;
use sellerhub_common::models::{PartnerCredential, ShopAuth};
use sellerhub_config::ShopeeConfig;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// Most characters of a non-JSON error body kept in a [`ShopeeError::Provider`] message.
const ERROR_BODY_SNIPPET: usize = 200;

/// Client for the Shopee partner API
///
/// Cheap to clone: the underlying `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct ShopeeClient {
    /// HTTP client with the configured per-request timeout
    http: Client,

    /// Scheme and host, e.g. `https://partner.shopeemobile.com`
    base_url: String,

    signer: Signer,
}

impl ShopeeClient {
    /// Creates a new client for the configured API host
    ///
    /// # Arguments
    ///
    /// * `config` - Shopee settings; only the base URL, prefix and timeout are used here
    pub fn new(config: &ShopeeConfig) -> Result<Self, ShopeeError> {
        let http = create_client(config.request_timeout_secs, false)?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            signer: Signer::new(config.api_prefix.clone()),
        })
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Builds the consent URL a seller opens to grant `partner` access to their shop.
    ///
    /// Nothing is sent; the URL embeds a PUBLIC signature over `/shop/auth_partner`.
    pub fn authorization_url(
        &self,
        partner_id: &str,
        secret_key: &str,
        redirect_url: &str,
    ) -> Result<String, ShopeeError> {
        let signed = self
            .signer
            .sign_endpoint(Endpoint::AuthPartner, &SignParams::public(partner_id, secret_key))?;
        let query = encode_query(&[
            ("partner_id", partner_id.to_string()),
            ("timestamp", signed.signed_at.to_string()),
            ("sign", signed.signature),
            ("redirect", redirect_url.to_string()),
        ])?;
        Ok(format!("{}{}?{}", self.base_url, signed.canonical_path, query))
    }

    /// Exchanges a one-time authorization code for the shop's first token pair.
    #[instrument(skip(self, partner, code), fields(partner_id = %partner.partner_id))]
    pub async fn get_access_token(
        &self,
        partner: &PartnerCredential,
        shop_id: &str,
        code: &str,
    ) -> Result<TokenResponse, ShopeeError> {
        let body = TokenGetBody {
            code,
            partner_id: numeric_id("partner_id", &partner.partner_id)?,
            shop_id: numeric_id("shop_id", shop_id)?,
        };
        self.call(
            Endpoint::TokenGet,
            SignParams::public(&partner.partner_id, &partner.secret_key),
            Vec::new(),
            Some(serde_json::to_value(&body)?),
        )
        .await
    }

    /// Trades the stored refresh token for a new pair.
    ///
    /// Signed with SHOP scope using the access token being replaced.
    #[instrument(skip(self, partner, auth), fields(shop_id = %auth.shop_id))]
    pub async fn refresh_access_token(
        &self,
        partner: &PartnerCredential,
        auth: &ShopAuth,
    ) -> Result<TokenResponse, ShopeeError> {
        let body = RefreshTokenBody {
            refresh_token: &auth.refresh_token,
            partner_id: numeric_id("partner_id", &partner.partner_id)?,
            shop_id: numeric_id("shop_id", &auth.shop_id)?,
        };
        self.call(
            Endpoint::AccessTokenGet,
            shop_params(partner, auth),
            Vec::new(),
            Some(serde_json::to_value(&body)?),
        )
        .await
    }

    /// Lists shops that authorized `partner`, one page at a time (`page_no` starts at 1).
    #[instrument(skip(self, partner), fields(partner_id = %partner.partner_id))]
    pub async fn get_shops_by_partner(
        &self,
        partner: &PartnerCredential,
        page_no: u32,
        page_size: u32,
    ) -> Result<ShopsByPartnerResponse, ShopeeError> {
        self.call(
            Endpoint::ShopsByPartner,
            SignParams::public(&partner.partner_id, &partner.secret_key),
            vec![
                ("page_no", page_no.to_string()),
                ("page_size", page_size.to_string()),
            ],
            None,
        )
        .await
    }

    #[instrument(skip(self, partner, auth, params), fields(shop_id = %auth.shop_id))]
    pub async fn get_order_list(
        &self,
        partner: &PartnerCredential,
        auth: &ShopAuth,
        params: &OrderListParams,
    ) -> Result<OrderListPage, ShopeeError> {
        let response: OrderListResponse = self
            .call(
                Endpoint::OrderList,
                shop_params(partner, auth),
                params.query_pairs(),
                None,
            )
            .await?;
        Ok(response.response)
    }

    /// Fetches full records for up to 50 order SNs.
    #[instrument(skip(self, partner, auth, order_sns), fields(shop_id = %auth.shop_id, count = order_sns.len()))]
    pub async fn get_order_detail(
        &self,
        partner: &PartnerCredential,
        auth: &ShopAuth,
        order_sns: &[String],
        response_optional_fields: &str,
        request_order_status_pending: bool,
    ) -> Result<OrderDetailResponse, ShopeeError> {
        if order_sns.is_empty() || order_sns.len() > MAX_ORDER_SN_BATCH {
            return Err(ShopeeError::InvalidInput(format!(
                "order_sn_list must hold 1 to {} entries, got {}",
                MAX_ORDER_SN_BATCH,
                order_sns.len()
            )));
        }

        let mut query = vec![
            ("order_sn_list", order_sns.join(",")),
            ("response_optional_fields", response_optional_fields.to_string()),
        ];
        if request_order_status_pending {
            query.push(("request_order_status_pending", "true".to_string()));
        }

        self.call(Endpoint::OrderDetail, shop_params(partner, auth), query, None)
            .await
    }

    #[instrument(skip(self, partner, auth), fields(shop_id = %auth.shop_id))]
    pub async fn get_shop_profile(
        &self,
        partner: &PartnerCredential,
        auth: &ShopAuth,
    ) -> Result<ShopProfile, ShopeeError> {
        let response: ShopProfileResponse = self
            .call(Endpoint::ShopProfile, shop_params(partner, auth), Vec::new(), None)
            .await?;
        Ok(response.response)
    }

    #[instrument(skip(self, partner, auth), fields(shop_id = %auth.shop_id))]
    pub async fn get_shop_info(
        &self,
        partner: &PartnerCredential,
        auth: &ShopAuth,
    ) -> Result<ShopInfoResponse, ShopeeError> {
        self.call(Endpoint::ShopInfo, shop_params(partner, auth), Vec::new(), None)
            .await
    }

    /// Signs, sends and decodes one call.
    ///
    /// Query parameters with empty values are omitted. SHOP-scoped calls also carry
    /// `access_token` and `shop_id` in the query.
    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: SignParams<'_>,
        extra_query: Vec<(&'static str, String)>,
        body: Option<serde_json::Value>,
    ) -> Result<T, ShopeeError> {
        let signed = self.signer.sign_endpoint(endpoint, &params)?;

        let mut query = vec![
            ("partner_id", params.partner_id.to_string()),
            ("timestamp", signed.signed_at.to_string()),
            ("sign", signed.signature.clone()),
        ];
        if signed.scope == SignScope::Shop {
            query.push(("access_token", params.access_token.to_string()));
            query.push(("shop_id", params.shop_id.to_string()));
        }
        query.extend(extra_query.into_iter().filter(|(_, value)| !value.is_empty()));

        let url = format!(
            "{}{}?{}",
            self.base_url,
            signed.canonical_path,
            encode_query(&query)?
        );

        debug!(method = %signed.method, path = %signed.canonical_path, "Calling Shopee API");
        let mut request = self.http.request(signed.method.clone(), &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        decode_envelope(status, &bytes).inspect_err(|e| {
            warn!(path = %signed.canonical_path, status = status.as_u16(), "Shopee call failed: {}", e);
        })
    }
}

/// Checks the provider envelope, then decodes the payload.
///
/// A non-empty `error` field wins over the HTTP status: the provider reports application
/// errors with status 200 too.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, ShopeeError> {
    let header = EnvelopeHeader::from_body(body);

    if !header.error.is_empty() {
        return Err(ShopeeError::provider(
            header.error,
            header.message,
            header.request_id,
        ));
    }

    if !status.is_success() {
        let message = if header.message.is_empty() {
            String::from_utf8_lossy(body)
                .chars()
                .take(ERROR_BODY_SNIPPET)
                .collect()
        } else {
            header.message
        };
        return Err(ShopeeError::provider(
            format!("http_{}", status.as_u16()),
            message,
            header.request_id,
        ));
    }

    Ok(serde_json::from_slice(body)?)
}

fn shop_params<'a>(partner: &'a PartnerCredential, auth: &'a ShopAuth) -> SignParams<'a> {
    SignParams::shop(
        &partner.partner_id,
        &partner.secret_key,
        &auth.shop_id,
        &auth.access_token,
    )
}

fn encode_query(pairs: &[(&str, String)]) -> Result<String, ShopeeError> {
    serde_urlencoded::to_string(pairs)
        .map_err(|e| ShopeeError::InvalidInput(format!("cannot encode query: {}", e)))
}

/// The provider wants numeric ids in request bodies.
fn numeric_id(name: &str, value: &str) -> Result<i64, ShopeeError> {
    value
        .parse::<i64>()
        .map_err(|_| ShopeeError::InvalidInput(format!("{} must be numeric, got {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::OrderListResponse;

    #[test]
    fn envelope_error_wins_over_success_status() {
        let body = br#"{"request_id":"r-1","error":"error_auth","message":"Invalid access_token."}"#;
        let err = decode_envelope::<OrderListResponse>(StatusCode::OK, body).unwrap_err();
        match err {
            ShopeeError::Provider {
                error,
                message,
                request_id,
            } => {
                assert_eq!(error, "error_auth");
                assert_eq!(message, "Invalid access_token.");
                assert_eq!(request_id, "r-1");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn envelope_error_survives_oddly_typed_header_fields() {
        let body = br#"{"request_id":12345,"error":"error_auth","message":{"detail":"x"},"response":{}}"#;
        let err = decode_envelope::<OrderListResponse>(StatusCode::OK, body).unwrap_err();
        match err {
            ShopeeError::Provider {
                error,
                message,
                request_id,
            } => {
                assert_eq!(error, "error_auth");
                assert_eq!(message, "");
                assert_eq!(request_id, "12345");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn http_failure_without_envelope_uses_status_code() {
        let err =
            decode_envelope::<OrderListResponse>(StatusCode::BAD_GATEWAY, b"upstream down")
                .unwrap_err();
        assert_eq!(err.provider_code(), Some("http_502"));
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let body = br#"{"request_id":"r","error":"","response":{"order_list":"nope"}}"#;
        let err = decode_envelope::<OrderListResponse>(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, ShopeeError::Decode(_)));
    }

    #[test]
    fn successful_envelope_decodes_payload() {
        let body = br#"{"request_id":"r","error":"","message":"","response":{"more":true,"next_cursor":"20","order_list":[{"order_sn":"A1","booking_sn":""}]}}"#;
        let page = decode_envelope::<OrderListResponse>(StatusCode::OK, body)
            .unwrap()
            .response;
        assert!(page.more);
        assert_eq!(page.next_cursor, "20");
        assert_eq!(page.order_list[0].order_sn, "A1");
    }

    #[test]
    fn null_error_field_counts_as_success() {
        let body = br#"{"request_id":"r","error":null,"message":null,"response":{}}"#;
        assert!(decode_envelope::<OrderListResponse>(StatusCode::OK, body).is_ok());
    }

    #[test]
    fn authorization_url_is_signed_over_auth_partner() {
        let config = ShopeeConfig::with_base_url(
            "https://partner.test-stable.shopeemobile.com/",
            "https://app.example.com/cb",
        );
        let client = ShopeeClient::new(&config).unwrap();
        let url = client
            .authorization_url("1001", "K1", "https://app.example.com/cb/1001")
            .unwrap();

        let parsed = reqwest::Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/api/v2/shop/auth_partner");
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs["partner_id"], "1001");
        assert_eq!(pairs["redirect"], "https://app.example.com/cb/1001");

        let timestamp: i64 = pairs["timestamp"].parse().unwrap();
        let expected = client
            .signer()
            .sign_at(
                SignScope::Public,
                "/shop/auth_partner",
                &SignParams::public("1001", "K1"),
                timestamp,
            )
            .unwrap();
        assert_eq!(pairs["sign"], expected.signature);
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        assert!(matches!(
            numeric_id("shop_id", "S1"),
            Err(ShopeeError::InvalidInput(_))
        ));
        assert_eq!(numeric_id("shop_id", "5501").unwrap(), 5501);
    }
}
