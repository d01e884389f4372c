//! SQL implementation of the order repository
//!
//! Identity, status and the two provider timestamps are columns; the embedded
//! [`OrderDetails`](sellerhub_common::models::OrderDetails) component is a JSON document.

use crate::error::DbError;
use crate::repositories::order::{Order, OrderRepository};
use crate::repositories::row::{get_json, get_opt_timestamp, get_string, get_timestamp, to_json};
use crate::DbClient;
use sqlx::any::AnyRow;
use tracing::{debug, info};

const SELECT_COLUMNS: &str =
    "shop_id, order_sn, booking_sn, order_status, create_time, update_time, details, synced_at";

#[derive(Debug, Clone)]
pub struct SqlOrderRepository {
    db_client: DbClient,
}

impl SqlOrderRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn order_from_row(row: &AnyRow) -> Result<Order, DbError> {
    Ok(Order {
        shop_id: get_string(row, "shop_id")?,
        order_sn: get_string(row, "order_sn")?,
        booking_sn: get_string(row, "booking_sn")?,
        order_status: get_string(row, "order_status")?,
        create_time: get_opt_timestamp(row, "create_time")?,
        update_time: get_opt_timestamp(row, "update_time")?,
        details: get_json(row, "details")?,
        synced_at: get_timestamp(row, "synced_at")?,
    })
}

impl OrderRepository for SqlOrderRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing order schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS shopee_orders (
                shop_id TEXT NOT NULL,
                order_sn TEXT NOT NULL,
                booking_sn TEXT NOT NULL,
                order_status TEXT NOT NULL,
                create_time INTEGER,
                update_time INTEGER,
                details TEXT NOT NULL,
                synced_at INTEGER NOT NULL
            )
        "#,
            )
            .await?;
        self.db_client
            .execute(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_shopee_orders_order_sn ON shopee_orders (order_sn)",
            )
            .await?;
        self.db_client
            .execute("CREATE INDEX IF NOT EXISTS idx_shopee_orders_shop_id ON shopee_orders (shop_id)")
            .await?;

        info!("Order schema initialized successfully");
        Ok(())
    }

    async fn find_by_order_sn(&self, order_sn: &str) -> Result<Option<Order>, DbError> {
        let query = format!("SELECT {} FROM shopee_orders WHERE order_sn = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(order_sn)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("select order", e))?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn insert(&self, order: &Order) -> Result<(), DbError> {
        debug!("Inserting order {} for shop {}", order.order_sn, order.shop_id);
        let details = to_json(&order.details, "order details")?;

        let query = r#"
            INSERT INTO shopee_orders
                (shop_id, order_sn, booking_sn, order_status, create_time, update_time, details, synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#;

        sqlx::query(query)
            .bind(&order.shop_id)
            .bind(&order.order_sn)
            .bind(&order.booking_sn)
            .bind(&order.order_status)
            .bind(order.create_time.map(|t| t.timestamp()))
            .bind(order.update_time.map(|t| t.timestamp()))
            .bind(details)
            .bind(order.synced_at.timestamp())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("insert order", e))?;

        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), DbError> {
        debug!("Updating order {}", order.order_sn);
        let details = to_json(&order.details, "order details")?;

        let query = r#"
            UPDATE shopee_orders
            SET shop_id = $1, booking_sn = $2, order_status = $3, create_time = $4,
                update_time = $5, details = $6, synced_at = $7
            WHERE order_sn = $8
        "#;

        let result = sqlx::query(query)
            .bind(&order.shop_id)
            .bind(&order.booking_sn)
            .bind(&order.order_status)
            .bind(order.create_time.map(|t| t.timestamp()))
            .bind(order.update_time.map(|t| t.timestamp()))
            .bind(details)
            .bind(order.synced_at.timestamp())
            .bind(&order.order_sn)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("update order", e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("order {}", order.order_sn)));
        }
        Ok(())
    }

    async fn list_by_shop(&self, shop_id: &str, limit: i64) -> Result<Vec<Order>, DbError> {
        let query = format!(
            "SELECT {} FROM shopee_orders WHERE shop_id = $1 ORDER BY create_time DESC, order_sn LIMIT $2",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(shop_id)
            .bind(limit)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::from_query("list orders", e))?;

        rows.iter().map(order_from_row).collect()
    }
}
