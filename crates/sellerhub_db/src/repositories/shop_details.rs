//! Repository for cached shop details

use crate::error::DbError;

pub use sellerhub_common::models::ShopDetails;

pub trait ShopDetailsRepository {
    /// Creates the `shopee_shop_details` table and its unique index on `shop_id`.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn find_by_shop_id(
        &self,
        shop_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ShopDetails>, DbError>> + Send;

    /// Inserts a new row; [`DbError::Conflict`] if the shop is already cached.
    fn insert(
        &self,
        details: &ShopDetails,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;
}
