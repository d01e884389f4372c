//! Database integration for sellerhub
//!
//! This crate owns every table the marketplace integration persists:
//!
//! - the credential store: partners, per-shop OAuth credentials and the
//!   authorization-link audit log
//! - the synced provider data: shop details and orders
//!
//! It uses SQLx's `Any` driver so the same repositories run on SQLite (default),
//! PostgreSQL or MySQL, selected through feature flags.
//!
//! # Example
//!
//! ```rust,no_run
//! use sellerhub_db::{DbClient, ShopeeRepositories};
//!
//! async fn setup_db() -> Result<ShopeeRepositories, Box<dyn std::error::Error>> {
//!     let db_client = DbClient::from_url("sqlite://data/sellerhub.db").await?;
//!     let repositories = ShopeeRepositories::new(db_client);
//!     repositories.init_schema().await?;
//!     Ok(repositories)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;

pub use repositories::{
    AuthRequestRepository, OrderRepository, PartnerRepository, ShopAuthRepository,
    ShopDetailsRepository, ShopeeRepositories, SqlAuthRequestRepository, SqlOrderRepository,
    SqlPartnerRepository, SqlShopAuthRepository, SqlShopDetailsRepository,
};
