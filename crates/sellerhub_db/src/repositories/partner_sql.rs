//! SQL implementation of the partner repository

use crate::error::DbError;
use crate::repositories::partner::{PartnerCredential, PartnerRepository};
use crate::repositories::row::{get_string, get_timestamp};
use crate::DbClient;
use sqlx::any::AnyRow;
use tracing::{debug, info};

/// SQL implementation of the partner repository
#[derive(Debug, Clone)]
pub struct SqlPartnerRepository {
    db_client: DbClient,
}

impl SqlPartnerRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn partner_from_row(row: &AnyRow) -> Result<PartnerCredential, DbError> {
    Ok(PartnerCredential {
        partner_id: get_string(row, "partner_id")?,
        partner_name: get_string(row, "partner_name")?,
        secret_key: get_string(row, "secret_key")?,
        created_at: get_timestamp(row, "created_at")?,
        created_by: get_string(row, "created_by")?,
        updated_at: get_timestamp(row, "updated_at")?,
        updated_by: get_string(row, "updated_by")?,
    })
}

impl PartnerRepository for SqlPartnerRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing partner schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS shopee_partners (
                partner_id TEXT NOT NULL,
                partner_name TEXT NOT NULL,
                secret_key TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                created_by TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                updated_by TEXT NOT NULL
            )
        "#,
            )
            .await?;
        self.db_client
            .execute(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_shopee_partners_partner_id ON shopee_partners (partner_id)",
            )
            .await?;

        info!("Partner schema initialized successfully");
        Ok(())
    }

    async fn create_partner(&self, partner: PartnerCredential) -> Result<PartnerCredential, DbError> {
        debug!("Creating partner: {}", partner.partner_id);

        let query = r#"
            INSERT INTO shopee_partners
                (partner_id, partner_name, secret_key, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#;

        sqlx::query(query)
            .bind(&partner.partner_id)
            .bind(&partner.partner_name)
            .bind(&partner.secret_key)
            .bind(partner.created_at.timestamp())
            .bind(&partner.created_by)
            .bind(partner.updated_at.timestamp())
            .bind(&partner.updated_by)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("insert partner", e))?;

        info!("Partner {} created", partner.partner_id);
        Ok(partner)
    }

    async fn get_partner_by_id(&self, partner_id: &str) -> Result<Option<PartnerCredential>, DbError> {
        let query = r#"
            SELECT partner_id, partner_name, secret_key, created_at, created_by, updated_at, updated_by
            FROM shopee_partners
            WHERE partner_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(partner_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("select partner", e))?;

        row.as_ref().map(partner_from_row).transpose()
    }

    async fn list_partners(&self) -> Result<Vec<PartnerCredential>, DbError> {
        let query = r#"
            SELECT partner_id, partner_name, secret_key, created_at, created_by, updated_at, updated_by
            FROM shopee_partners
            ORDER BY partner_id
        "#;

        let rows = sqlx::query(query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("list partners", e))?;

        rows.iter().map(partner_from_row).collect()
    }

    async fn update_partner(&self, partner: PartnerCredential) -> Result<PartnerCredential, DbError> {
        debug!("Updating partner: {}", partner.partner_id);

        let query = r#"
            UPDATE shopee_partners
            SET partner_name = $1, secret_key = $2, updated_at = $3, updated_by = $4
            WHERE partner_id = $5
        "#;

        let result = sqlx::query(query)
            .bind(&partner.partner_name)
            .bind(&partner.secret_key)
            .bind(partner.updated_at.timestamp())
            .bind(&partner.updated_by)
            .bind(&partner.partner_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("update partner", e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("partner {}", partner.partner_id)));
        }
        self.get_partner_by_id(&partner.partner_id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("partner {}", partner.partner_id)))
    }

    async fn delete_partner(&self, partner_id: &str) -> Result<bool, DbError> {
        debug!("Deleting partner: {}", partner_id);

        let result = sqlx::query("DELETE FROM shopee_partners WHERE partner_id = $1")
            .bind(partner_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("delete partner", e))?;

        Ok(result.rows_affected() > 0)
    }
}
