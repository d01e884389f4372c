//! Repository modules for database access
//!
//! Each entity has a trait describing its operations and a SQL implementation on top of
//! [`DbClient`]. [`ShopeeRepositories`] bundles them for the Shopee service.

pub mod auth_request;
pub mod auth_request_sql;
pub mod order;
pub mod order_sql;
pub mod partner;
pub mod partner_sql;
pub mod shop_auth;
pub mod shop_auth_sql;
pub mod shop_details;
pub mod shop_details_sql;
mod row;

pub use auth_request::AuthRequestRepository;
pub use auth_request_sql::SqlAuthRequestRepository;
pub use order::OrderRepository;
pub use order_sql::SqlOrderRepository;
pub use partner::PartnerRepository;
pub use partner_sql::SqlPartnerRepository;
pub use shop_auth::ShopAuthRepository;
pub use shop_auth_sql::SqlShopAuthRepository;
pub use shop_details::ShopDetailsRepository;
pub use shop_details_sql::SqlShopDetailsRepository;

use crate::error::DbError;
use crate::DbClient;
use tracing::info;

/// All repositories backing the marketplace integration, sharing one pool.
#[derive(Debug, Clone)]
pub struct ShopeeRepositories {
    pub partners: SqlPartnerRepository,
    pub shop_auth: SqlShopAuthRepository,
    pub auth_requests: SqlAuthRequestRepository,
    pub shop_details: SqlShopDetailsRepository,
    pub orders: SqlOrderRepository,
}

impl ShopeeRepositories {
    pub fn new(db_client: DbClient) -> Self {
        Self {
            partners: SqlPartnerRepository::new(db_client.clone()),
            shop_auth: SqlShopAuthRepository::new(db_client.clone()),
            auth_requests: SqlAuthRequestRepository::new(db_client.clone()),
            shop_details: SqlShopDetailsRepository::new(db_client.clone()),
            orders: SqlOrderRepository::new(db_client),
        }
    }

    /// Creates every table and unique index. Safe to run on each start.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        self.partners.init_schema().await?;
        self.shop_auth.init_schema().await?;
        self.auth_requests.init_schema().await?;
        self.shop_details.init_schema().await?;
        self.orders.init_schema().await?;
        info!("Shopee schema initialized");
        Ok(())
    }
}
