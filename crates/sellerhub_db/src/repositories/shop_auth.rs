//! Repository for per-shop OAuth credentials
//!
//! Exactly one live row per `shop_id`, enforced by a unique index. Rows are overwritten on
//! every code exchange or refresh and never deleted.

use crate::error::DbError;
use chrono::{DateTime, Utc};

pub use sellerhub_common::models::ShopAuth;

/// New token pair to store for a shop.
#[derive(Debug, Clone)]
pub struct ShopAuthUpsert<'a> {
    pub partner_id: &'a str,
    pub shop_id: &'a str,
    pub authorization_code: &'a str,
    pub access_token: &'a str,
    pub refresh_token: &'a str,
    pub expires_at: DateTime<Utc>,
    pub actor: &'a str,
}

/// Storage for [`ShopAuth`] rows.
pub trait ShopAuthRepository {
    /// Creates the `shopee_shop_auth` table and its unique index on `shop_id`.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn get_shop_auth(
        &self,
        shop_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ShopAuth>, DbError>> + Send;

    /// Inserts or overwrites the credentials for `upsert.shop_id` in one statement.
    ///
    /// `created_at/by` survive an overwrite; everything else is replaced.
    fn upsert_shop_auth(
        &self,
        upsert: ShopAuthUpsert<'_>,
    ) -> impl std::future::Future<Output = Result<ShopAuth, DbError>> + Send;

    /// Inserts a row only if the shop has none yet. Returns `true` if a row was created.
    fn insert_placeholder(
        &self,
        partner_id: &str,
        shop_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    fn list_by_partner(
        &self,
        partner_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ShopAuth>, DbError>> + Send;
}
