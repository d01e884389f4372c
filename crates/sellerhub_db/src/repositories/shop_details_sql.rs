//! SQL implementation of the shop details repository
//!
//! The searchable fields get their own columns; the full entity is kept as a JSON document.

use crate::error::DbError;
use crate::repositories::row::{get_json, to_json};
use crate::repositories::shop_details::{ShopDetails, ShopDetailsRepository};
use crate::DbClient;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SqlShopDetailsRepository {
    db_client: DbClient,
}

impl SqlShopDetailsRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl ShopDetailsRepository for SqlShopDetailsRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing shop details schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS shopee_shop_details (
                shop_id TEXT NOT NULL,
                shop_name TEXT NOT NULL,
                region TEXT NOT NULL,
                status TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
        "#,
            )
            .await?;
        self.db_client
            .execute(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_shopee_shop_details_shop_id ON shopee_shop_details (shop_id)",
            )
            .await?;

        info!("Shop details schema initialized successfully");
        Ok(())
    }

    async fn find_by_shop_id(&self, shop_id: &str) -> Result<Option<ShopDetails>, DbError> {
        let row = sqlx::query("SELECT payload FROM shopee_shop_details WHERE shop_id = $1")
            .bind(shop_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("select shop details", e))?;

        row.as_ref().map(|row| get_json(row, "payload")).transpose()
    }

    async fn insert(&self, details: &ShopDetails) -> Result<(), DbError> {
        debug!("Caching details for shop {}", details.shop_id);
        let payload = to_json(details, "shop details")?;

        let query = r#"
            INSERT INTO shopee_shop_details
                (shop_id, shop_name, region, status, payload, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#;

        sqlx::query(query)
            .bind(&details.shop_id)
            .bind(&details.shop_name)
            .bind(&details.region)
            .bind(&details.status)
            .bind(payload)
            .bind(details.created_at.timestamp())
            .bind(details.updated_at.timestamp())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("insert shop details", e))?;

        Ok(())
    }
}
