// --- File: crates/sellerhub_shopee/src/service.rs ---
//! Partner onboarding and shop authorization.
//!
//! Shop and order synchronisation live in [`crate::sync`] as a second `impl` block of
//! [`ShopeeService`].

use crate::client::ShopeeClient;
use crate::error::ShopeeError;
use crate::token::TokenManager;
use chrono::Utc;
use chrono_tz::Tz;
use sellerhub_common::models::{
    AuthorizationRequest, PartnerCredential, ShopAuth, SYSTEM_ACTOR,
};
use sellerhub_config::ShopeeConfig;
use sellerhub_db::{AuthRequestRepository, PartnerRepository, ShopeeRepositories};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Entry point for everything the HTTP layer does with Shopee.
#[derive(Debug, Clone)]
pub struct ShopeeService {
    pub(crate) config: ShopeeConfig,
    pub(crate) time_zone: Tz,
    pub(crate) client: ShopeeClient,
    pub(crate) repos: ShopeeRepositories,
    pub(crate) tokens: TokenManager,
}

impl ShopeeService {
    pub fn new(config: ShopeeConfig, repos: ShopeeRepositories) -> Result<Self, ShopeeError> {
        let time_zone: Tz = config.time_zone.parse().map_err(|_| {
            ShopeeError::Config(format!("unknown time zone: {}", config.time_zone))
        })?;
        if config.refresh_margin_secs < 0 || config.token_lifetime_secs <= config.refresh_margin_secs {
            return Err(ShopeeError::Config(format!(
                "token_lifetime_secs ({}) must exceed refresh_margin_secs ({})",
                config.token_lifetime_secs, config.refresh_margin_secs
            )));
        }

        let client = ShopeeClient::new(&config)?;
        let tokens = TokenManager::new(
            client.clone(),
            repos.partners.clone(),
            repos.shop_auth.clone(),
            config.refresh_margin_secs,
            config.token_lifetime_secs,
        );

        Ok(Self {
            config,
            time_zone,
            client,
            repos,
            tokens,
        })
    }

    pub fn config(&self) -> &ShopeeConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    // --- Partners ---

    #[instrument(skip(self, secret_key))]
    pub async fn register_partner(
        &self,
        partner_id: &str,
        partner_name: &str,
        secret_key: &str,
    ) -> Result<PartnerCredential, ShopeeError> {
        require("partner_id", partner_id)?;
        require("secret_key", secret_key)?;
        if partner_id.parse::<i64>().is_err() {
            return Err(ShopeeError::InvalidInput(format!(
                "partner_id must be numeric, got {:?}",
                partner_id
            )));
        }

        let partner = self
            .repos
            .partners
            .create_partner(PartnerCredential::new(partner_id, partner_name, secret_key))
            .await?;
        info!(partner_id = %partner.partner_id, "Registered Shopee partner");
        Ok(partner)
    }

    pub async fn get_partner(&self, partner_id: &str) -> Result<PartnerCredential, ShopeeError> {
        self.repos
            .partners
            .get_partner_by_id(partner_id)
            .await?
            .ok_or_else(|| ShopeeError::NotFound(format!("partner {} not registered", partner_id)))
    }

    pub async fn list_partners(&self) -> Result<Vec<PartnerCredential>, ShopeeError> {
        Ok(self.repos.partners.list_partners().await?)
    }

    /// Replaces the fields that are `Some`.
    #[instrument(skip(self, secret_key))]
    pub async fn update_partner(
        &self,
        partner_id: &str,
        partner_name: Option<&str>,
        secret_key: Option<&str>,
    ) -> Result<PartnerCredential, ShopeeError> {
        let mut partner = self.get_partner(partner_id).await?;
        if let Some(name) = partner_name {
            partner.partner_name = name.to_string();
        }
        if let Some(secret) = secret_key {
            require("secret_key", secret)?;
            partner.secret_key = secret.to_string();
        }
        partner.updated_at = Utc::now();
        partner.updated_by = SYSTEM_ACTOR.to_string();

        Ok(self.repos.partners.update_partner(partner).await?)
    }

    pub async fn delete_partner(&self, partner_id: &str) -> Result<(), ShopeeError> {
        if self.repos.partners.delete_partner(partner_id).await? {
            info!(partner_id = %partner_id, "Deleted Shopee partner");
            Ok(())
        } else {
            Err(ShopeeError::NotFound(format!("partner {} not registered", partner_id)))
        }
    }

    // --- Authorization ---

    /// Redirect target handed to the consent page for `partner_id`.
    pub fn redirect_url(&self, partner_id: &str) -> String {
        format!(
            "{}/{}",
            self.config.redirect_base_url.trim_end_matches('/'),
            partner_id
        )
    }

    /// Builds a consent URL without touching storage.
    pub fn generate_auth_link(
        &self,
        partner_id: &str,
        secret_key: &str,
    ) -> Result<String, ShopeeError> {
        require("partner_id", partner_id)?;
        require("secret_key", secret_key)?;
        self.client
            .authorization_url(partner_id, secret_key, &self.redirect_url(partner_id))
    }

    /// Appends an audit row for an issued consent URL.
    pub async fn record_authorization_request(
        &self,
        partner: &PartnerCredential,
        generated_url: &str,
    ) -> Result<AuthorizationRequest, ShopeeError> {
        let request = AuthorizationRequest {
            id: None,
            partner_id: partner.partner_id.clone(),
            partner_name: partner.partner_name.clone(),
            secret_key_used: partner.secret_key.clone(),
            generated_url: generated_url.to_string(),
            created_at: Utc::now(),
            created_by: SYSTEM_ACTOR.to_string(),
        };
        Ok(self.repos.auth_requests.record(request).await?)
    }

    /// Looks up the partner, builds its consent URL and records it.
    #[instrument(skip(self))]
    pub async fn request_authorization(
        &self,
        partner_id: &str,
    ) -> Result<AuthorizationRequest, ShopeeError> {
        let partner = self.get_partner(partner_id).await?;
        let url = self.generate_auth_link(&partner.partner_id, &partner.secret_key)?;
        let recorded = self.record_authorization_request(&partner, &url).await?;
        info!(partner_id = %partner_id, "Issued Shopee authorization link");
        Ok(recorded)
    }

    pub async fn authorization_history(
        &self,
        partner_id: &str,
    ) -> Result<Vec<AuthorizationRequest>, ShopeeError> {
        self.get_partner(partner_id).await?;
        Ok(self.repos.auth_requests.list_by_partner(partner_id).await?)
    }

    /// Completes the consent callback: trades `code` for tokens and stores them.
    #[instrument(skip(self, code))]
    pub async fn exchange_code_for_tokens(
        &self,
        partner_id: &str,
        shop_id: &str,
        code: &str,
    ) -> Result<ShopAuth, ShopeeError> {
        require("shop_id", shop_id)?;
        require("code", code)?;
        let partner = self.get_partner(partner_id).await?;

        let tokens = self.client.get_access_token(&partner, shop_id, code).await?;
        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Err(ShopeeError::Mapping(
                "token response without access or refresh token".to_string(),
            ));
        }

        self.tokens
            .store_tokens(
                &partner.partner_id,
                shop_id,
                code,
                &tokens.access_token,
                &tokens.refresh_token,
            )
            .await
    }

    pub async fn get_usable_access_token(&self, shop_id: &str) -> Result<ShopAuth, ShopeeError> {
        self.tokens.get_usable_access_token(shop_id).await
    }
}

/// Runs `operation` until it finishes or `cancel` fires, whichever comes first.
///
/// On cancellation the operation future is dropped: an in-flight HTTP call is aborted and
/// nothing after it is persisted.
pub async fn run_cancellable<T, F>(cancel: &CancellationToken, operation: F) -> Result<T, ShopeeError>
where
    F: Future<Output = Result<T, ShopeeError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ShopeeError::Cancelled),
        result = operation => result,
    }
}

fn require(name: &str, value: &str) -> Result<(), ShopeeError> {
    if value.trim().is_empty() {
        Err(ShopeeError::InvalidInput(format!("{} must not be empty", name)))
    } else {
        Ok(())
    }
}
