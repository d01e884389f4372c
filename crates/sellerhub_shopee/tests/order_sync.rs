mod fixtures;

use fixtures::{
    envelope, error_envelope, order_detail, seed_shop_auth, setup, setup_with, SignedWith, SHOP_ID,
};
use chrono::Utc;
use sellerhub_common::models::{Order, OrderDetails};
use sellerhub_config::OrderWritePolicy;
use sellerhub_db::OrderRepository;
use sellerhub_shopee::{OrderListQuery, ShopeeError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/api/v2/order/get_order_list";
const DETAIL_PATH: &str = "/api/v2/order/get_order_detail";
const T0: i64 = 1_710_028_800;
const T1: i64 = 1_710_115_199;

fn window() -> OrderListQuery {
    OrderListQuery::from_raw("create_time", &T0.to_string(), &T1.to_string(), "", "", "20").unwrap()
}

async fn mount_order_list(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("time_range_field", "create_time"))
        .and(query_param("time_from", T0.to_string()))
        .and(query_param("time_to", T1.to_string()))
        .and(query_param("page_size", "20"))
        .and(SignedWith::shop("A0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "response": {
                "more": false,
                "next_cursor": "",
                "order_list": [
                    { "order_sn": "A1", "booking_sn": "" },
                    { "order_sn": "B2", "booking_sn": "BK-B2" }
                ]
            }
        }))))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_order_detail(server: &MockServer, status: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .and(query_param("order_sn_list", "A1,B2"))
        .and(SignedWith::shop("A0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "warning": [],
            "response": {
                "order_list": [
                    order_detail("A1", status, T0 + 100),
                    order_detail("B2", status, T0 + 200)
                ]
            }
        }))))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn order_page_is_joined_with_details_and_stored() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;
    mount_order_list(&env.server, 1).await;
    mount_order_detail(&env.server, "READY_TO_SHIP", 1).await;

    let page = env.service.list_orders(SHOP_ID, window()).await.unwrap();

    assert_eq!(page.orders.len(), 2);
    assert_eq!(page.report.inserted, 2);
    assert_eq!(page.report.failed, 0);
    assert!(!page.more);

    let b2 = env.repos.orders.find_by_order_sn("B2").await.unwrap().unwrap();
    assert_eq!(b2.shop_id, SHOP_ID);
    assert_eq!(b2.booking_sn, "BK-B2");
    assert_eq!(b2.order_status, "READY_TO_SHIP");
    assert_eq!(b2.create_time.unwrap().timestamp(), T0 + 200);
    assert_eq!(b2.details.items[0].item_id, "100200");
    assert_eq!(b2.details.packages[0].logistics_channel_id, "18025");
    assert!(env.repos.orders.find_by_order_sn("A1").await.unwrap().is_some());
}

#[tokio::test]
async fn repeated_sync_skips_stored_orders() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;
    mount_order_list(&env.server, 2).await;
    mount_order_detail(&env.server, "READY_TO_SHIP", 2).await;

    env.service.list_orders(SHOP_ID, window()).await.unwrap();
    let second = env.service.list_orders(SHOP_ID, window()).await.unwrap();

    assert_eq!(second.report.inserted, 0);
    assert_eq!(second.report.skipped, 2);
    assert_eq!(second.orders.len(), 2);
    assert_eq!(env.repos.orders.list_by_shop(SHOP_ID, 10).await.unwrap().len(), 2);
}

fn stored_order(order_sn: &str, status: &str) -> Order {
    Order {
        shop_id: SHOP_ID.to_string(),
        order_sn: order_sn.to_string(),
        booking_sn: String::new(),
        order_status: status.to_string(),
        create_time: None,
        update_time: None,
        details: OrderDetails::default(),
        synced_at: Utc::now(),
    }
}

#[tokio::test]
async fn update_policy_overwrites_stored_orders() {
    let env = setup_with(|config| config.order_write_policy = OrderWritePolicy::Update).await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;
    env.repos
        .orders
        .insert(&stored_order("A1", "READY_TO_SHIP"))
        .await
        .unwrap();
    mount_order_list(&env.server, 1).await;
    mount_order_detail(&env.server, "SHIPPED", 1).await;

    let page = env.service.list_orders(SHOP_ID, window()).await.unwrap();

    assert_eq!(page.report.updated, 1);
    assert_eq!(page.report.inserted, 1);
    let a1 = env.repos.orders.find_by_order_sn("A1").await.unwrap().unwrap();
    assert_eq!(a1.order_status, "SHIPPED");
    assert_eq!(a1.details.total_amount, 42.5);
}

#[tokio::test]
async fn skip_policy_keeps_stored_snapshot() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;
    env.repos
        .orders
        .insert(&stored_order("A1", "READY_TO_SHIP"))
        .await
        .unwrap();
    mount_order_list(&env.server, 1).await;
    mount_order_detail(&env.server, "SHIPPED", 1).await;

    let page = env.service.list_orders(SHOP_ID, window()).await.unwrap();

    assert_eq!(page.report.skipped, 1);
    assert_eq!(page.report.inserted, 1);
    let a1 = env.repos.orders.find_by_order_sn("A1").await.unwrap().unwrap();
    assert_eq!(a1.order_status, "READY_TO_SHIP");
}

#[tokio::test]
async fn provider_error_on_http_200_aborts_the_sync() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(error_envelope("error_param", "time_to is invalid.")),
        )
        .expect(1)
        .mount(&env.server)
        .await;
    mount_order_detail(&env.server, "READY_TO_SHIP", 0).await;

    let err = env.service.list_orders(SHOP_ID, window()).await.unwrap_err();
    match err {
        ShopeeError::Provider { error, request_id, .. } => {
            assert_eq!(error, "error_param");
            assert_eq!(request_id, "req-err");
        }
        other => panic!("expected provider error, got {:?}", other),
    }
    assert!(env.repos.orders.list_by_shop(SHOP_ID, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_page_makes_no_detail_call() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "response": { "more": false, "next_cursor": "", "order_list": [] }
        }))))
        .mount(&env.server)
        .await;
    mount_order_detail(&env.server, "READY_TO_SHIP", 0).await;

    let page = env.service.list_orders(SHOP_ID, window()).await.unwrap();
    assert!(page.orders.is_empty());
    assert_eq!(page.report, Default::default());
}

#[tokio::test]
async fn order_missing_from_details_is_counted_not_fatal() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;
    mount_order_list(&env.server, 1).await;

    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "warning": ["B2 not found"],
            "response": { "order_list": [order_detail("A1", "UNPAID", T0 + 1)] }
        }))))
        .expect(1)
        .mount(&env.server)
        .await;

    let page = env.service.list_orders(SHOP_ID, window()).await.unwrap();

    assert_eq!(page.orders.len(), 1);
    assert_eq!(page.report.inserted, 1);
    assert_eq!(page.report.failed, 1);
    assert_eq!(page.warnings, vec!["B2 not found".to_string()]);
}

#[tokio::test]
async fn pagination_cursor_is_forwarded_and_returned() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "20"))
        .and(query_param("order_status", "UNPAID"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "response": { "more": true, "next_cursor": "40", "order_list": [] }
        }))))
        .expect(1)
        .mount(&env.server)
        .await;

    let query = OrderListQuery::from_raw("", &T0.to_string(), &T1.to_string(), "unpaid", "20", "")
        .unwrap();
    let page = env.service.list_orders(SHOP_ID, query).await.unwrap();

    assert!(page.more);
    assert_eq!(page.next_cursor, "40");
}

#[tokio::test]
async fn explicit_order_details_are_synced() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;
    mount_order_detail(&env.server, "COMPLETED", 1).await;

    let batch = env
        .service
        .get_order_details(SHOP_ID, &["A1".to_string(), "B2".to_string()], false)
        .await
        .unwrap();

    assert_eq!(batch.orders.len(), 2);
    assert_eq!(batch.report.inserted, 2);
    assert_eq!(batch.orders[0].order_status, "COMPLETED");
}

#[tokio::test]
async fn explicit_order_missing_from_details_is_counted() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;

    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .and(query_param("order_sn_list", "A1,B2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "warning": ["B2 not found"],
            "response": { "order_list": [order_detail("A1", "UNPAID", T0 + 1)] }
        }))))
        .expect(1)
        .mount(&env.server)
        .await;

    let batch = env
        .service
        .get_order_details(SHOP_ID, &["A1".to_string(), "B2".to_string()], false)
        .await
        .unwrap();

    assert_eq!(batch.orders.len(), 1);
    assert_eq!(batch.report.inserted, 1);
    assert_eq!(batch.report.failed, 1);
    assert!(env.repos.orders.find_by_order_sn("B2").await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_syncs_store_each_order_once() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;
    mount_order_list(&env.server, 2).await;

    // both syncs are parked on the detail call, so both lookups run before either insert
    Mock::given(method("GET"))
        .and(path(DETAIL_PATH))
        .and(query_param("order_sn_list", "A1,B2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({
                    "warning": [],
                    "response": {
                        "order_list": [
                            order_detail("A1", "READY_TO_SHIP", T0 + 100),
                            order_detail("B2", "READY_TO_SHIP", T0 + 200)
                        ]
                    }
                })))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(2)
        .mount(&env.server)
        .await;

    let (first, second) = tokio::join!(
        env.service.list_orders(SHOP_ID, window()),
        env.service.list_orders(SHOP_ID, window()),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    for page in [&first, &second] {
        assert_eq!(page.report.inserted + page.report.skipped, 2);
        assert_eq!(page.report.failed, 0);
        assert_eq!(page.orders.len(), 2);
    }
    assert_eq!(first.report.inserted + second.report.inserted, 2);
    assert_eq!(env.repos.orders.list_by_shop(SHOP_ID, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn oversized_detail_batch_is_rejected_before_any_call() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;
    let order_sns: Vec<String> = (0..51).map(|i| format!("SN{}", i)).collect();

    let err = env
        .service
        .get_order_details(SHOP_ID, &order_sns, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopeeError::InvalidInput(_)));

    let err = env.service.get_order_details(SHOP_ID, &[], false).await.unwrap_err();
    assert!(matches!(err, ShopeeError::InvalidInput(_)));
}

#[tokio::test]
async fn order_sync_requires_credentials() {
    let env = setup().await;
    let err = env.service.list_orders(SHOP_ID, window()).await.unwrap_err();
    assert!(matches!(err, ShopeeError::NotFound(_)));
}
