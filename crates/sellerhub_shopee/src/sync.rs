// --- File: crates/sellerhub_shopee/src/sync.rs ---
//! Shop and order synchronisation.
//!
//! Every call resolves usable credentials first, so an expiring token is refreshed before
//! the provider ever sees it. Fetched records are mapped and persisted; one bad record is
//! logged and counted, never fatal for the batch.

use crate::dto::{OrderRef, WireOrderDetail};
use crate::error::ShopeeError;
use crate::mapping::{authorized_shop_from_wire, order_from_wire, shop_details_from_wire};
use crate::models::{
    IngestReport, OrderBatch, OrderListQuery, OrderPage, ShopListing, DEFAULT_ORDER_DETAIL_FIELDS,
    MAX_ORDER_SN_BATCH,
};
use crate::service::ShopeeService;
use chrono::Utc;
use sellerhub_common::models::{Order, ShopDetails};
use sellerhub_config::OrderWritePolicy;
use sellerhub_db::{DbError, OrderRepository, ShopAuthRepository, ShopDetailsRepository};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Page size used when walking the partner's authorized shops.
const SHOP_PAGE_SIZE: u32 = 100;
/// Upper bound on shop pages fetched in one listing.
const MAX_SHOP_PAGES: u32 = 50;

impl ShopeeService {
    /// Lists the shops that authorized `partner_id` and makes sure each has a credential row.
    ///
    /// Shops seen for the first time get a placeholder row that stays "not authorized" until
    /// their code exchange completes.
    #[instrument(skip(self))]
    pub async fn list_shops_for_partner(&self, partner_id: &str) -> Result<ShopListing, ShopeeError> {
        let partner = self.get_partner(partner_id).await?;

        let mut shops = Vec::new();
        let mut more = false;
        for page_no in 1..=MAX_SHOP_PAGES {
            let page = self
                .client
                .get_shops_by_partner(&partner, page_no, SHOP_PAGE_SIZE)
                .await?;
            more = page.more;

            for wire in &page.authed_shop_list {
                let mut shop = match authorized_shop_from_wire(wire) {
                    Ok(shop) => shop,
                    Err(e) => {
                        warn!(partner_id = %partner_id, "Skipping authorized shop: {}", e);
                        continue;
                    }
                };
                match self
                    .repos
                    .shop_auth
                    .insert_placeholder(&partner.partner_id, &shop.shop_id)
                    .await
                {
                    Ok(created) => shop.placeholder_created = created,
                    Err(e) => warn!(shop_id = %shop.shop_id, "Could not register shop: {}", e),
                }
                shops.push(shop);
            }

            if !more || page.authed_shop_list.is_empty() {
                break;
            }
        }

        info!(partner_id = %partner_id, count = shops.len(), "Listed authorized Shopee shops");
        Ok(ShopListing {
            partner_id: partner.partner_id,
            shops,
            more,
        })
    }

    /// Read-through shop details: served from storage when cached, otherwise fetched
    /// (profile and info concurrently), merged and stored.
    #[instrument(skip(self))]
    pub async fn get_shop_details(&self, shop_id: &str) -> Result<ShopDetails, ShopeeError> {
        if let Some(cached) = self.repos.shop_details.find_by_shop_id(shop_id).await? {
            debug!(shop_id = %shop_id, "Shop details served from cache");
            return Ok(cached);
        }

        let (partner, auth) = self.tokens.usable_credentials(shop_id).await?;
        let (profile, info) = tokio::try_join!(
            self.client.get_shop_profile(&partner, &auth),
            self.client.get_shop_info(&partner, &auth),
        )?;
        let details = shop_details_from_wire(shop_id, profile, info, Utc::now())?;

        match self.repos.shop_details.insert(&details).await {
            Ok(()) => Ok(details),
            // a concurrent caller stored it first
            Err(DbError::Conflict(_)) => self
                .repos
                .shop_details
                .find_by_shop_id(shop_id)
                .await?
                .ok_or_else(|| ShopeeError::NotFound(format!("shop details for {}", shop_id))),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetches one page of the order list, joins it with order details and persists the result.
    #[instrument(skip(self, query))]
    pub async fn list_orders(
        &self,
        shop_id: &str,
        query: OrderListQuery,
    ) -> Result<OrderPage, ShopeeError> {
        let params = query.resolve(self.time_zone, Utc::now(), self.config.default_page_size)?;
        let (partner, auth) = self.tokens.usable_credentials(shop_id).await?;

        let page = self.client.get_order_list(&partner, &auth, &params).await?;
        let mut report = IngestReport::default();
        let mut warnings = Vec::new();
        let mut orders = Vec::with_capacity(page.order_list.len());

        for chunk in page.order_list.chunks(MAX_ORDER_SN_BATCH) {
            let order_sns: Vec<String> = chunk.iter().map(|entry| entry.order_sn.clone()).collect();
            let detail = self
                .client
                .get_order_detail(
                    &partner,
                    &auth,
                    &order_sns,
                    DEFAULT_ORDER_DETAIL_FIELDS,
                    params.request_order_status_pending,
                )
                .await?;
            warnings.extend(detail.warning);

            let mut details: HashMap<String, WireOrderDetail> = detail
                .response
                .order_list
                .into_iter()
                .map(|detail| (detail.order_sn.clone(), detail))
                .collect();

            for summary in chunk {
                let Some(detail) = details.remove(&summary.order_sn) else {
                    warn!(order_sn = %summary.order_sn, "Order missing from detail response");
                    report.failed += 1;
                    continue;
                };
                if let Some(order) = self.ingest(shop_id, Some(summary), detail, &mut report).await {
                    orders.push(order);
                }
            }
        }

        info!(
            shop_id = %shop_id,
            inserted = report.inserted,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "Synced Shopee order page"
        );
        Ok(OrderPage {
            orders,
            more: page.more,
            next_cursor: page.next_cursor,
            report,
            warnings,
        })
    }

    /// Fetches and persists the full records of explicit order SNs (1 to 50).
    #[instrument(skip(self, order_sns), fields(count = order_sns.len()))]
    pub async fn get_order_details(
        &self,
        shop_id: &str,
        order_sns: &[String],
        request_order_status_pending: bool,
    ) -> Result<OrderBatch, ShopeeError> {
        if order_sns.is_empty() || order_sns.len() > MAX_ORDER_SN_BATCH {
            return Err(ShopeeError::InvalidInput(format!(
                "order_sn_list must hold 1 to {} entries, got {}",
                MAX_ORDER_SN_BATCH,
                order_sns.len()
            )));
        }
        let (partner, auth) = self.tokens.usable_credentials(shop_id).await?;

        let detail = self
            .client
            .get_order_detail(
                &partner,
                &auth,
                order_sns,
                DEFAULT_ORDER_DETAIL_FIELDS,
                request_order_status_pending,
            )
            .await?;

        let mut report = IngestReport::default();
        let returned: HashSet<&str> = detail
            .response
            .order_list
            .iter()
            .map(|wire| wire.order_sn.as_str())
            .collect();
        let requested: HashSet<&str> = order_sns.iter().map(String::as_str).collect();
        for missing in requested.difference(&returned) {
            warn!(order_sn = %missing, "Order missing from detail response");
            report.failed += 1;
        }

        let mut orders = Vec::with_capacity(detail.response.order_list.len());
        for wire in detail.response.order_list {
            if let Some(order) = self.ingest(shop_id, None, wire, &mut report).await {
                orders.push(order);
            }
        }

        Ok(OrderBatch {
            orders,
            report,
            warnings: detail.warning,
        })
    }

    /// Orders already stored for `shop_id`, newest first. Never calls the provider.
    pub async fn stored_orders(&self, shop_id: &str, limit: i64) -> Result<Vec<Order>, ShopeeError> {
        if self.repos.shop_auth.get_shop_auth(shop_id).await?.is_none() {
            return Err(ShopeeError::NotFound(format!("no credentials for shop {}", shop_id)));
        }
        Ok(self.repos.orders.list_by_shop(shop_id, limit.clamp(1, 500)).await?)
    }

    /// Maps and stores one order under the configured write policy.
    ///
    /// Returns the order as it now stands in storage, or `None` if it was counted as failed.
    async fn ingest(
        &self,
        shop_id: &str,
        summary: Option<&OrderRef>,
        detail: WireOrderDetail,
        report: &mut IngestReport,
    ) -> Option<Order> {
        let order = match order_from_wire(shop_id, summary, detail, Utc::now()) {
            Ok(order) => order,
            Err(e) => {
                warn!(shop_id = %shop_id, "Skipping unmappable order: {}", e);
                report.failed += 1;
                return None;
            }
        };

        let existing = match self.repos.orders.find_by_order_sn(&order.order_sn).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!(order_sn = %order.order_sn, "Order lookup failed: {}", e);
                report.failed += 1;
                return None;
            }
        };

        match (existing, self.config.order_write_policy) {
            (Some(stored), OrderWritePolicy::Skip) => {
                report.skipped += 1;
                Some(stored)
            }
            (Some(_), OrderWritePolicy::Update) => self.update_order(order, report).await,
            (None, _) => self.insert_order(order, report).await,
        }
    }

    /// Inserts an order the lookup did not find.
    ///
    /// A unique-key conflict means a concurrent sync stored it in between; it is handled
    /// like an order that was already there.
    async fn insert_order(&self, order: Order, report: &mut IngestReport) -> Option<Order> {
        match self.repos.orders.insert(&order).await {
            Ok(()) => {
                report.inserted += 1;
                Some(order)
            }
            Err(DbError::Conflict(_)) => match self.config.order_write_policy {
                OrderWritePolicy::Update => self.update_order(order, report).await,
                OrderWritePolicy::Skip => {
                    debug!(order_sn = %order.order_sn, "Order already synced");
                    report.skipped += 1;
                    match self.repos.orders.find_by_order_sn(&order.order_sn).await {
                        Ok(Some(stored)) => Some(stored),
                        Ok(None) => Some(order),
                        Err(e) => {
                            warn!(order_sn = %order.order_sn, "Re-reading stored order failed: {}", e);
                            Some(order)
                        }
                    }
                }
            },
            Err(e) => {
                warn!(order_sn = %order.order_sn, "Order insert failed: {}", e);
                report.failed += 1;
                None
            }
        }
    }

    async fn update_order(&self, order: Order, report: &mut IngestReport) -> Option<Order> {
        match self.repos.orders.update(&order).await {
            Ok(()) => {
                report.updated += 1;
                Some(order)
            }
            Err(e) => {
                warn!(order_sn = %order.order_sn, "Order update failed: {}", e);
                report.failed += 1;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sellerhub_common::models::OrderDetails;
    use sellerhub_config::ShopeeConfig;
    use sellerhub_db::{DbClient, ShopeeRepositories};

    async fn service(policy: OrderWritePolicy) -> ShopeeService {
        let db = DbClient::from_url("sqlite::memory:").await.unwrap();
        let repos = ShopeeRepositories::new(db);
        repos.init_schema().await.unwrap();
        let mut config = ShopeeConfig::with_base_url("http://127.0.0.1:9", "http://127.0.0.1:9/cb");
        config.order_write_policy = policy;
        ShopeeService::new(config, repos).unwrap()
    }

    fn order(status: &str, total_amount: f64) -> Order {
        Order {
            shop_id: "5501".into(),
            order_sn: "RACE1".into(),
            booking_sn: String::new(),
            order_status: status.into(),
            create_time: None,
            update_time: None,
            details: OrderDetails {
                total_amount,
                ..OrderDetails::default()
            },
            synced_at: Utc::now(),
        }
    }

    // The row appears between the lookup and the insert, as with two concurrent syncs.
    #[tokio::test]
    async fn insert_conflict_under_skip_returns_the_stored_row() {
        let service = service(OrderWritePolicy::Skip).await;
        service.repos.orders.insert(&order("READY_TO_SHIP", 10.0)).await.unwrap();

        let mut report = IngestReport::default();
        let result = service
            .insert_order(order("SHIPPED", 99.0), &mut report)
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.inserted + report.failed, 0);
        assert_eq!(result.order_status, "READY_TO_SHIP");
        assert_eq!(result.details.total_amount, 10.0);
    }

    #[tokio::test]
    async fn insert_conflict_under_update_overwrites() {
        let service = service(OrderWritePolicy::Update).await;
        service.repos.orders.insert(&order("READY_TO_SHIP", 10.0)).await.unwrap();

        let mut report = IngestReport::default();
        let result = service
            .insert_order(order("SHIPPED", 99.0), &mut report)
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(result.order_status, "SHIPPED");
        let stored = service.repos.orders.find_by_order_sn("RACE1").await.unwrap().unwrap();
        assert_eq!(stored.order_status, "SHIPPED");
    }
}
