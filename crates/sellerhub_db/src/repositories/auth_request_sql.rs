//! SQL implementation of the authorization request repository

use crate::error::DbError;
use crate::repositories::auth_request::{AuthRequestRepository, AuthorizationRequest};
use crate::repositories::row::{get_i64, get_string, get_timestamp};
use crate::DbClient;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SqlAuthRequestRepository {
    db_client: DbClient,
}

impl SqlAuthRequestRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl AuthRequestRepository for SqlAuthRequestRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing authorization request schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS shopee_auth_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                partner_id TEXT NOT NULL,
                partner_name TEXT NOT NULL,
                secret_key_used TEXT NOT NULL,
                generated_url TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                created_by TEXT NOT NULL
            )
        "#,
            )
            .await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_shopee_auth_requests_partner_id ON shopee_auth_requests (partner_id)",
            )
            .await?;

        info!("Authorization request schema initialized successfully");
        Ok(())
    }

    async fn record(&self, request: AuthorizationRequest) -> Result<AuthorizationRequest, DbError> {
        debug!("Recording authorization request for partner {}", request.partner_id);

        let query = r#"
            INSERT INTO shopee_auth_requests
                (partner_id, partner_name, secret_key_used, generated_url, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#;

        let result = sqlx::query(query)
            .bind(&request.partner_id)
            .bind(&request.partner_name)
            .bind(&request.secret_key_used)
            .bind(&request.generated_url)
            .bind(request.created_at.timestamp())
            .bind(&request.created_by)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("insert authorization request", e))?;

        Ok(AuthorizationRequest {
            id: result.last_insert_id(),
            ..request
        })
    }

    async fn list_by_partner(&self, partner_id: &str) -> Result<Vec<AuthorizationRequest>, DbError> {
        let query = r#"
            SELECT id, partner_id, partner_name, secret_key_used, generated_url, created_at, created_by
            FROM shopee_auth_requests
            WHERE partner_id = $1
            ORDER BY id
        "#;

        let rows = sqlx::query(query)
            .bind(partner_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("list authorization requests", e))?;

        rows.iter()
            .map(|row| {
                Ok(AuthorizationRequest {
                    id: Some(get_i64(row, "id")?),
                    partner_id: get_string(row, "partner_id")?,
                    partner_name: get_string(row, "partner_name")?,
                    secret_key_used: get_string(row, "secret_key_used")?,
                    generated_url: get_string(row, "generated_url")?,
                    created_at: get_timestamp(row, "created_at")?,
                    created_by: get_string(row, "created_by")?,
                })
            })
            .collect()
    }
}
