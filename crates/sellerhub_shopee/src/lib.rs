// --- File: crates/sellerhub_shopee/src/lib.rs ---
//! Shopee partner API integration.
//!
//! [`ShopeeService`] is the entry point: it signs requests ([`signer`]), keeps shop access
//! tokens fresh ([`token`]) and syncs shops and orders into storage ([`sync`]).

pub mod client;
pub mod doc;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod mapping;
pub mod models;
pub mod routes;
pub mod service;
pub mod signer;
pub mod sync;
pub mod token;

// Re-export for main backend
pub use client::ShopeeClient;
pub use error::ShopeeError;
pub use models::{IngestReport, OrderBatch, OrderListQuery, OrderPage, ShopListing, TimeRangeField};
pub use routes::routes;
pub use service::{run_cancellable, ShopeeService};
pub use signer::{Endpoint, SignParams, SignScope, SignatureError, SignedRequest, Signer};
pub use token::{Freshness, TokenManager};
