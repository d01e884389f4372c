mod fixtures;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use fixtures::{envelope, seed_shop_auth, setup, PARTNER_ID, SHOP_ID};
use sellerhub_shopee::routes;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn partner_crud_round_trip() {
    let env = setup().await;
    let router = routes(env.service.clone());

    let (status, body) = send(
        router.clone(),
        json_request(
            "POST",
            "/shopee/partners",
            json!({ "partner_id": "3003", "partner_name": "Second", "secret_key": "s3" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["partner_id"], "3003");
    assert!(body.get("secret_key").is_none());

    let (status, _) = send(
        router.clone(),
        json_request(
            "POST",
            "/shopee/partners",
            json!({ "partner_id": "3003", "partner_name": "Again", "secret_key": "s3" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        router.clone(),
        json_request("PUT", "/shopee/partners/3003", json!({ "partner_name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["partner_name"], "Renamed");

    let (_, body) = send(router.clone(), get("/shopee/partners")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let delete = Request::builder()
        .method("DELETE")
        .uri("/shopee/partners/3003")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router.clone(), delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(router, get("/shopee/partners/3003")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);
}

#[tokio::test]
async fn unknown_shop_token_is_404() {
    let env = setup().await;
    let (status, body) = send(routes(env.service.clone()), get("/shopee/shops/777/token")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].as_str().unwrap().contains("777"));
}

#[tokio::test]
async fn token_endpoint_hides_refresh_token() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;

    let uri = format!("/shopee/shops/{}/token", SHOP_ID);
    let (status, body) = send(routes(env.service.clone()), get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "A0");
    assert!(body.get("refresh_token").is_none());
}

#[tokio::test]
async fn auth_callback_exchanges_code() {
    let env = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/auth/token/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "access_token": "A-cb",
            "refresh_token": "R-cb",
            "expire_in": 14400
        }))))
        .expect(1)
        .mount(&env.server)
        .await;

    let uri = format!(
        "/shopee/webhook/auth_partner/{}?code=abc123&shop_id={}",
        PARTNER_ID, SHOP_ID
    );
    let (status, body) = send(routes(env.service.clone()), get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shop_id"], SHOP_ID);
    assert_eq!(body["access_token"], "A-cb");
}

#[tokio::test]
async fn invalid_order_filter_is_400() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;

    let uri = format!("/shopee/shops/{}/orders?time_range_field=ship_time", SHOP_ID);
    let (status, _) = send(routes(env.service.clone()), get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/shopee/shops/{}/orders?page_size=500", SHOP_ID);
    let (status, _) = send(routes(env.service.clone()), get(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_failure_is_502() {
    let env = setup().await;
    seed_shop_auth(&env.repos, "A0", "R1", 3 * 3600).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/order/get_order_detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "r-9",
            "error": "error_auth",
            "message": "Invalid access_token."
        })))
        .mount(&env.server)
        .await;

    let uri = format!("/shopee/shops/{}/orders/detail?order_sn_list=A1,B2", SHOP_ID);
    let (status, body) = send(routes(env.service.clone()), get(&uri)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]["message"].as_str().unwrap().contains("error_auth"));
}
