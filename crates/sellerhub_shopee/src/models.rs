// --- File: crates/sellerhub_shopee/src/models.rs ---
use crate::error::ShopeeError;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use sellerhub_common::models::{LinkedShop, Order};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest page the provider accepts for `/order/get_order_list`.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Largest `time_from..time_to` span the provider accepts.
pub const MAX_TIME_SPAN_SECS: i64 = 15 * 24 * 60 * 60;
/// Largest `order_sn_list` the provider accepts for `/order/get_order_detail`.
pub const MAX_ORDER_SN_BATCH: usize = 50;

pub const ORDER_STATUSES: [&str; 8] = [
    "UNPAID",
    "READY_TO_SHIP",
    "PROCESSED",
    "SHIPPED",
    "COMPLETED",
    "IN_CANCEL",
    "CANCELLED",
    "INVOICE_PENDING",
];

/// Default `response_optional_fields` for order detail calls.
pub const DEFAULT_ORDER_DETAIL_FIELDS: &str = "total_amount,pending_terms,buyer_username,recipient_address,dropshipper,dropshipper_phone,item_list,package_list,note";

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRangeField {
    #[default]
    CreateTime,
    UpdateTime,
}

impl TimeRangeField {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRangeField::CreateTime => "create_time",
            TimeRangeField::UpdateTime => "update_time",
        }
    }
}

impl FromStr for TimeRangeField {
    type Err = ShopeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_time" => Ok(TimeRangeField::CreateTime),
            "update_time" => Ok(TimeRangeField::UpdateTime),
            other => Err(ShopeeError::InvalidInput(format!(
                "time_range_field must be create_time or update_time, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TimeRangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-facing order list filter. Unset fields fall back to service defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderListQuery {
    pub time_range_field: TimeRangeField,
    pub time_from: Option<i64>,
    pub time_to: Option<i64>,
    pub page_size: Option<u32>,
    pub cursor: Option<String>,
    pub order_status: Option<String>,
    pub response_optional_fields: Option<String>,
    pub request_order_status_pending: bool,
    pub logistics_channel_id: Option<i64>,
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<Option<T>, ShopeeError> {
    non_empty(raw)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ShopeeError::InvalidInput(format!("{} is not a number: {}", name, value)))
        })
        .transpose()
}

impl OrderListQuery {
    /// Builds a query from untyped string inputs, where empty means "use the default".
    pub fn from_raw(
        time_range_field: &str,
        time_from: &str,
        time_to: &str,
        order_status: &str,
        cursor: &str,
        page_size: &str,
    ) -> Result<Self, ShopeeError> {
        let time_range_field = match non_empty(time_range_field) {
            Some(field) => field.parse()?,
            None => TimeRangeField::default(),
        };
        let order_status = match non_empty(order_status) {
            Some(status) => {
                let status = status.to_ascii_uppercase();
                if !ORDER_STATUSES.contains(&status.as_str()) {
                    return Err(ShopeeError::InvalidInput(format!(
                        "unknown order_status: {}",
                        status
                    )));
                }
                Some(status)
            }
            None => None,
        };

        Ok(Self {
            time_range_field,
            time_from: parse_number("time_from", time_from)?,
            time_to: parse_number("time_to", time_to)?,
            page_size: parse_number("page_size", page_size)?,
            cursor: non_empty(cursor).map(str::to_string),
            order_status,
            ..Self::default()
        })
    }

    /// Fills defaults and checks the provider's limits.
    ///
    /// A missing window becomes the current day (00:00:00 to 23:59:59) in `time_zone`.
    pub fn resolve(
        &self,
        time_zone: Tz,
        now: DateTime<Utc>,
        default_page_size: u32,
    ) -> Result<OrderListParams, ShopeeError> {
        let (day_start, day_end) = day_window(time_zone, now)?;
        let time_from = self.time_from.unwrap_or(day_start);
        let time_to = self.time_to.unwrap_or(day_end);

        if time_from > time_to {
            return Err(ShopeeError::InvalidInput(format!(
                "time_from {} is after time_to {}",
                time_from, time_to
            )));
        }
        if time_to - time_from > MAX_TIME_SPAN_SECS {
            return Err(ShopeeError::InvalidInput(
                "time window must not exceed 15 days".to_string(),
            ));
        }

        let page_size = self.page_size.unwrap_or(default_page_size);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ShopeeError::InvalidInput(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }

        Ok(OrderListParams {
            time_range_field: self.time_range_field,
            time_from,
            time_to,
            page_size,
            cursor: self.cursor.clone().unwrap_or_default(),
            order_status: self.order_status.clone().unwrap_or_default(),
            response_optional_fields: self.response_optional_fields.clone().unwrap_or_default(),
            request_order_status_pending: self.request_order_status_pending,
            logistics_channel_id: self.logistics_channel_id,
        })
    }
}

/// A fully resolved order list request, ready to be put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderListParams {
    pub time_range_field: TimeRangeField,
    pub time_from: i64,
    pub time_to: i64,
    pub page_size: u32,
    pub cursor: String,
    pub order_status: String,
    pub response_optional_fields: String,
    pub request_order_status_pending: bool,
    pub logistics_channel_id: Option<i64>,
}

impl OrderListParams {
    /// Query pairs in wire form. Empty values are dropped by the client.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("time_range_field", self.time_range_field.as_str().to_string()),
            ("time_from", self.time_from.to_string()),
            ("time_to", self.time_to.to_string()),
            ("page_size", self.page_size.to_string()),
            ("cursor", self.cursor.clone()),
            ("order_status", self.order_status.clone()),
            ("response_optional_fields", self.response_optional_fields.clone()),
            (
                "request_order_status_pending",
                if self.request_order_status_pending {
                    "true".to_string()
                } else {
                    String::new()
                },
            ),
            (
                "logistics_channel_id",
                self.logistics_channel_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}

/// Start and end of the calendar day containing `now` in `time_zone`, as unix seconds.
pub fn day_window(time_zone: Tz, now: DateTime<Utc>) -> Result<(i64, i64), ShopeeError> {
    let date = now.with_timezone(&time_zone).date_naive();
    let start = date
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| time_zone.from_local_datetime(&midnight).earliest());
    let end = date
        .and_hms_opt(23, 59, 59)
        .and_then(|last_second| time_zone.from_local_datetime(&last_second).latest());

    match (start, end) {
        (Some(start), Some(end)) => Ok((start.timestamp(), end.timestamp())),
        _ => Err(ShopeeError::Config(format!(
            "cannot resolve day boundaries for {} in {}",
            date, time_zone
        ))),
    }
}

/// Outcome counts of persisting a batch of orders.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub updated: usize,
    /// Already stored and left untouched.
    pub skipped: usize,
    /// Could not be mapped or written; logged and left out of the result.
    pub failed: usize,
}

/// One page of the order list, joined with details and persisted.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub more: bool,
    pub next_cursor: String,
    pub report: IngestReport,
    pub warnings: Vec<String>,
}

/// Result of fetching details for explicit order SNs.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBatch {
    pub orders: Vec<Order>,
    pub report: IngestReport,
    pub warnings: Vec<String>,
}

/// A shop that granted access to a partner.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedShop {
    pub shop_id: String,
    pub region: String,
    pub auth_time: Option<DateTime<Utc>>,
    pub expire_time: Option<DateTime<Utc>>,
    pub sip_affiliated_shops: Vec<LinkedShop>,
    /// `true` if this call created the shop's credential row.
    pub placeholder_created: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopListing {
    pub partner_id: String,
    pub shops: Vec<AuthorizedShop>,
    pub more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn from_raw_treats_empty_as_default() {
        let query = OrderListQuery::from_raw("", "", "", "", "", "").unwrap();
        assert_eq!(query, OrderListQuery::default());
        assert_eq!(query.time_range_field, TimeRangeField::CreateTime);
    }

    #[test]
    fn from_raw_parses_values() {
        let query =
            OrderListQuery::from_raw("update_time", "100", "200", "ready_to_ship", "c1", "50")
                .unwrap();
        assert_eq!(query.time_range_field, TimeRangeField::UpdateTime);
        assert_eq!(query.time_from, Some(100));
        assert_eq!(query.time_to, Some(200));
        assert_eq!(query.order_status.as_deref(), Some("READY_TO_SHIP"));
        assert_eq!(query.cursor.as_deref(), Some("c1"));
        assert_eq!(query.page_size, Some(50));
    }

    #[test]
    fn from_raw_rejects_garbage() {
        assert!(matches!(
            OrderListQuery::from_raw("ship_time", "", "", "", "", ""),
            Err(ShopeeError::InvalidInput(_))
        ));
        assert!(matches!(
            OrderListQuery::from_raw("", "yesterday", "", "", "", ""),
            Err(ShopeeError::InvalidInput(_))
        ));
        assert!(matches!(
            OrderListQuery::from_raw("", "", "", "LOST", "", ""),
            Err(ShopeeError::InvalidInput(_))
        ));
    }

    #[test]
    fn default_window_is_the_local_day() {
        // 2024-03-10 02:30:00 UTC is 09:30 in Bangkok (UTC+7)
        let now = at(1_710_037_800);
        let (start, end) = day_window(chrono_tz::Asia::Bangkok, now).unwrap();
        // 2024-03-10 00:00:00 +07:00 and 23:59:59 +07:00
        assert_eq!(start, 1_710_003_600);
        assert_eq!(end, 1_710_089_999);
    }

    #[test]
    fn resolve_fills_defaults() {
        let now = at(1_710_037_800);
        let params = OrderListQuery::default()
            .resolve(chrono_tz::UTC, now, 20)
            .unwrap();
        assert_eq!(params.time_from, 1_710_028_800);
        assert_eq!(params.time_to, 1_710_115_199);
        assert_eq!(params.page_size, 20);
        assert!(params.cursor.is_empty());
    }

    #[test]
    fn resolve_enforces_provider_limits() {
        let now = at(1_710_037_800);
        let too_big = OrderListQuery {
            page_size: Some(101),
            ..Default::default()
        };
        assert!(too_big.resolve(chrono_tz::UTC, now, 20).is_err());

        let inverted = OrderListQuery {
            time_from: Some(200),
            time_to: Some(100),
            ..Default::default()
        };
        assert!(inverted.resolve(chrono_tz::UTC, now, 20).is_err());

        let too_long = OrderListQuery {
            time_from: Some(0),
            time_to: Some(MAX_TIME_SPAN_SECS + 1),
            ..Default::default()
        };
        assert!(too_long.resolve(chrono_tz::UTC, now, 20).is_err());
    }

    #[test]
    fn query_pairs_carry_resolved_values() {
        let params = OrderListQuery {
            time_from: Some(10),
            time_to: Some(20),
            ..Default::default()
        }
        .resolve(chrono_tz::UTC, at(15), 20)
        .unwrap();
        let pairs = params.query_pairs();
        assert!(pairs.contains(&("time_range_field", "create_time".to_string())));
        assert!(pairs.contains(&("time_from", "10".to_string())));
        assert!(pairs.contains(&("page_size", "20".to_string())));
        assert!(pairs.contains(&("request_order_status_pending", String::new())));
    }
}
