//! Repository for synced orders
//!
//! Keyed by the provider-assigned `order_sn`, which is unique across shops.

use crate::error::DbError;

pub use sellerhub_common::models::Order;

pub trait OrderRepository {
    /// Creates the `shopee_orders` table, the unique index on `order_sn` and a lookup index on `shop_id`.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn find_by_order_sn(
        &self,
        order_sn: &str,
    ) -> impl std::future::Future<Output = Result<Option<Order>, DbError>> + Send;

    /// Inserts a new order; [`DbError::Conflict`] if the SN is already stored.
    fn insert(&self, order: &Order)
        -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Overwrites a stored order; [`DbError::NotFound`] if the SN is unknown.
    fn update(&self, order: &Order)
        -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Orders of a shop, newest `create_time` first.
    fn list_by_shop(
        &self,
        shop_id: &str,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Order>, DbError>> + Send;
}
