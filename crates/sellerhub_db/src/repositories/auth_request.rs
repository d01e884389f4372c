//! Repository for the authorization-link audit log
//!
//! Append only: rows are never updated or deleted.

use crate::error::DbError;

pub use sellerhub_common::models::AuthorizationRequest;

pub trait AuthRequestRepository {
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Appends a row and returns it with its generated id.
    fn record(
        &self,
        request: AuthorizationRequest,
    ) -> impl std::future::Future<Output = Result<AuthorizationRequest, DbError>> + Send;

    /// All requests issued for a partner, oldest first.
    fn list_by_partner(
        &self,
        partner_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<AuthorizationRequest>, DbError>> + Send;
}
