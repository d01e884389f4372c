//! SQL implementation of the shop auth repository

use crate::error::DbError;
use crate::repositories::row::{get_string, get_timestamp};
use crate::repositories::shop_auth::{ShopAuth, ShopAuthRepository, ShopAuthUpsert};
use crate::DbClient;
use chrono::Utc;
use sellerhub_common::models::SYSTEM_ACTOR;
use sqlx::any::AnyRow;
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "partner_id, shop_id, authorization_code, access_token, refresh_token, \
     expires_at, created_at, created_by, updated_at, updated_by";

/// SQL implementation of the shop auth repository
#[derive(Debug, Clone)]
pub struct SqlShopAuthRepository {
    db_client: DbClient,
}

impl SqlShopAuthRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn shop_auth_from_row(row: &AnyRow) -> Result<ShopAuth, DbError> {
    Ok(ShopAuth {
        partner_id: get_string(row, "partner_id")?,
        shop_id: get_string(row, "shop_id")?,
        authorization_code: get_string(row, "authorization_code")?,
        access_token: get_string(row, "access_token")?,
        refresh_token: get_string(row, "refresh_token")?,
        expires_at: get_timestamp(row, "expires_at")?,
        created_at: get_timestamp(row, "created_at")?,
        created_by: get_string(row, "created_by")?,
        updated_at: get_timestamp(row, "updated_at")?,
        updated_by: get_string(row, "updated_by")?,
    })
}

impl ShopAuthRepository for SqlShopAuthRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing shop auth schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS shopee_shop_auth (
                partner_id TEXT NOT NULL,
                shop_id TEXT NOT NULL,
                authorization_code TEXT NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
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
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_shopee_shop_auth_shop_id ON shopee_shop_auth (shop_id)",
            )
            .await?;

        info!("Shop auth schema initialized successfully");
        Ok(())
    }

    async fn get_shop_auth(&self, shop_id: &str) -> Result<Option<ShopAuth>, DbError> {
        let query = format!("SELECT {} FROM shopee_shop_auth WHERE shop_id = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(shop_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("select shop auth", e))?;

        row.as_ref().map(shop_auth_from_row).transpose()
    }

    async fn upsert_shop_auth(&self, upsert: ShopAuthUpsert<'_>) -> Result<ShopAuth, DbError> {
        debug!(
            "Upserting credentials for shop {} (partner {})",
            upsert.shop_id, upsert.partner_id
        );
        let now = Utc::now().timestamp();

        let query = r#"
            INSERT INTO shopee_shop_auth
                (partner_id, shop_id, authorization_code, access_token, refresh_token,
                 expires_at, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (shop_id) DO UPDATE SET
                partner_id = excluded.partner_id,
                authorization_code = excluded.authorization_code,
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
        "#;

        sqlx::query(query)
            .bind(upsert.partner_id)
            .bind(upsert.shop_id)
            .bind(upsert.authorization_code)
            .bind(upsert.access_token)
            .bind(upsert.refresh_token)
            .bind(upsert.expires_at.timestamp())
            .bind(now)
            .bind(upsert.actor)
            .bind(now)
            .bind(upsert.actor)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("upsert shop auth", e))?;

        self.get_shop_auth(upsert.shop_id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("shop auth {}", upsert.shop_id)))
    }

    async fn insert_placeholder(&self, partner_id: &str, shop_id: &str) -> Result<bool, DbError> {
        let placeholder = ShopAuth::placeholder(partner_id, shop_id);

        let query = r#"
            INSERT INTO shopee_shop_auth
                (partner_id, shop_id, authorization_code, access_token, refresh_token,
                 expires_at, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (shop_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(&placeholder.partner_id)
            .bind(&placeholder.shop_id)
            .bind(&placeholder.authorization_code)
            .bind(&placeholder.access_token)
            .bind(&placeholder.refresh_token)
            .bind(placeholder.expires_at.timestamp())
            .bind(placeholder.created_at.timestamp())
            .bind(SYSTEM_ACTOR)
            .bind(placeholder.updated_at.timestamp())
            .bind(SYSTEM_ACTOR)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("insert shop auth placeholder", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_partner(&self, partner_id: &str) -> Result<Vec<ShopAuth>, DbError> {
        let query = format!(
            "SELECT {} FROM shopee_shop_auth WHERE partner_id = $1 ORDER BY shop_id",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(partner_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("list shop auth", e))?;

        rows.iter().map(shop_auth_from_row).collect()
    }
}
