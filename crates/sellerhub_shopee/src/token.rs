//! Access-token lifecycle for authorized shops.
//!
//! A token is usable while more than `refresh_margin_secs` of its lifetime remain. Below
//! that it is refreshed before use and the new pair is written back in a single upsert.
//! Two callers racing on the same stale token may both refresh; the last upsert wins.

use crate::client::ShopeeClient;
use crate::error::ShopeeError;
use chrono::{DateTime, Duration, Utc};
use sellerhub_common::models::{PartnerCredential, ShopAuth, SYSTEM_ACTOR};
use sellerhub_db::repositories::shop_auth::ShopAuthUpsert;
use sellerhub_db::{PartnerRepository, ShopAuthRepository, SqlPartnerRepository, SqlShopAuthRepository};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// Expired or inside the refresh margin.
    Stale,
}

/// Second-granularity freshness check.
pub fn classify(auth: &ShopAuth, now: DateTime<Utc>, refresh_margin_secs: i64) -> Freshness {
    if auth.seconds_until_expiry(now) >= refresh_margin_secs {
        Freshness::Fresh
    } else {
        Freshness::Stale
    }
}

#[derive(Debug, Clone)]
pub struct TokenManager {
    client: ShopeeClient,
    partners: SqlPartnerRepository,
    shop_auth: SqlShopAuthRepository,
    refresh_margin_secs: i64,
    token_lifetime_secs: i64,
}

impl TokenManager {
    pub fn new(
        client: ShopeeClient,
        partners: SqlPartnerRepository,
        shop_auth: SqlShopAuthRepository,
        refresh_margin_secs: i64,
        token_lifetime_secs: i64,
    ) -> Self {
        Self {
            client,
            partners,
            shop_auth,
            refresh_margin_secs,
            token_lifetime_secs,
        }
    }

    /// Returns credentials whose access token can be used right now, refreshing first if needed.
    ///
    /// `NotFound` if the shop has no row or only a placeholder. A failed refresh leaves the
    /// stored row as it was.
    pub async fn get_usable_access_token(&self, shop_id: &str) -> Result<ShopAuth, ShopeeError> {
        let auth = self.authorized_shop(shop_id).await?;

        match classify(&auth, Utc::now(), self.refresh_margin_secs) {
            Freshness::Fresh => Ok(auth),
            Freshness::Stale => {
                let partner = self.partner(&auth.partner_id).await?;
                self.refresh(&partner, &auth).await
            }
        }
    }

    /// Same as [`Self::get_usable_access_token`], also returning the owning partner.
    pub async fn usable_credentials(
        &self,
        shop_id: &str,
    ) -> Result<(PartnerCredential, ShopAuth), ShopeeError> {
        let auth = self.authorized_shop(shop_id).await?;
        let partner = self.partner(&auth.partner_id).await?;

        let auth = match classify(&auth, Utc::now(), self.refresh_margin_secs) {
            Freshness::Fresh => auth,
            Freshness::Stale => self.refresh(&partner, &auth).await?,
        };
        Ok((partner, auth))
    }

    /// Trades `current`'s refresh token for a new pair and stores it.
    pub async fn refresh(
        &self,
        partner: &PartnerCredential,
        current: &ShopAuth,
    ) -> Result<ShopAuth, ShopeeError> {
        info!(shop_id = %current.shop_id, "Refreshing Shopee access token");

        let tokens = match self.client.refresh_access_token(partner, current).await {
            Ok(tokens) if !tokens.access_token.is_empty() && !tokens.refresh_token.is_empty() => {
                tokens
            }
            Ok(_) => {
                return Err(refresh_failed(
                    current,
                    ShopeeError::Mapping("refresh response without tokens".to_string()),
                ))
            }
            Err(e) => return Err(refresh_failed(current, e)),
        };

        self.store_tokens(
            &current.partner_id,
            &current.shop_id,
            &current.authorization_code,
            &tokens.access_token,
            &tokens.refresh_token,
        )
        .await
    }

    /// Writes a token pair with `expires_at = now + token lifetime`.
    pub async fn store_tokens(
        &self,
        partner_id: &str,
        shop_id: &str,
        authorization_code: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<ShopAuth, ShopeeError> {
        let expires_at = Utc::now() + Duration::seconds(self.token_lifetime_secs);
        let stored = self
            .shop_auth
            .upsert_shop_auth(ShopAuthUpsert {
                partner_id,
                shop_id,
                authorization_code,
                access_token,
                refresh_token,
                expires_at,
                actor: SYSTEM_ACTOR,
            })
            .await?;
        info!(shop_id = %shop_id, expires_at = %stored.expires_at, "Stored Shopee token pair");
        Ok(stored)
    }

    async fn authorized_shop(&self, shop_id: &str) -> Result<ShopAuth, ShopeeError> {
        match self.shop_auth.get_shop_auth(shop_id).await? {
            Some(auth) if auth.is_authorized() => Ok(auth),
            Some(_) => Err(ShopeeError::NotFound(format!(
                "shop {} has not completed authorization",
                shop_id
            ))),
            None => Err(ShopeeError::NotFound(format!("no credentials for shop {}", shop_id))),
        }
    }

    async fn partner(&self, partner_id: &str) -> Result<PartnerCredential, ShopeeError> {
        self.partners
            .get_partner_by_id(partner_id)
            .await?
            .ok_or_else(|| ShopeeError::NotFound(format!("partner {} not registered", partner_id)))
    }
}

fn refresh_failed(current: &ShopAuth, source: ShopeeError) -> ShopeeError {
    warn!(shop_id = %current.shop_id, "Shopee token refresh failed: {}", source);
    ShopeeError::RefreshFailed {
        shop_id: current.shop_id.clone(),
        source: Box::new(source),
    }
}
