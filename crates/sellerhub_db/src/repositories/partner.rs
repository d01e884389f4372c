//! Repository for partner credentials
//!
//! One row per onboarded partner, keyed by the marketplace-issued `partner_id`.

use crate::error::DbError;

pub use sellerhub_common::models::PartnerCredential;

/// Storage for [`PartnerCredential`]s.
pub trait PartnerRepository {
    /// Creates the `shopee_partners` table and its unique index on `partner_id`.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Inserts a new partner.
    ///
    /// Returns [`DbError::Conflict`] if the partner id is already registered.
    fn create_partner(
        &self,
        partner: PartnerCredential,
    ) -> impl std::future::Future<Output = Result<PartnerCredential, DbError>> + Send;

    fn get_partner_by_id(
        &self,
        partner_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<PartnerCredential>, DbError>> + Send;

    fn list_partners(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<PartnerCredential>, DbError>> + Send;

    /// Replaces name and secret of an existing partner.
    ///
    /// Returns [`DbError::NotFound`] when no row matches.
    fn update_partner(
        &self,
        partner: PartnerCredential,
    ) -> impl std::future::Future<Output = Result<PartnerCredential, DbError>> + Send;

    /// Returns `true` if a row was deleted.
    fn delete_partner(
        &self,
        partner_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}
