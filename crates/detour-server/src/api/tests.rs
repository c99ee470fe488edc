use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, state::AppState};

fn setup_app() -> (Router, Arc<AppState>) {
    let config = Config {
        osrm_mirrors: Vec::new(),
        nominatim_url: "http://127.0.0.1:9".to_string(),
        geocode_timeout_s: 2,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config).expect("build state"));
    let app = api::routes().with_state(state.clone());
    (app, state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn plan_body(ignore_obstacles: bool) -> Value {
    json!({
        "start": {"lat": 19.10, "lon": 72.85, "name": "Start"},
        "end": {"lat": 19.12, "lon": 72.90, "name": "End"},
        "ignore_obstacles": ignore_obstacles
    })
}

#[tokio::test]
async fn health_reports_state() {
    let (app, _state) = setup_app();
    let res = app.oneshot(empty("GET", "/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["blockages"], 0);
    assert_eq!(body["mirrors"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn blockage_crud_round_trip() {
    let (app, state) = setup_app();

    let create_res = app
        .clone()
        .oneshot(post_json(
            "/v1/blockages",
            json!({"lat": 19.11, "lon": 72.875, "radius": 1000, "description": "Flooding"}),
        ))
        .await
        .unwrap();
    assert_eq!(create_res.status(), StatusCode::CREATED);
    let created = read_json(create_res).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["radius_m"], 1000.0);
    assert_eq!(created["description"], "Flooding");

    let list = read_json(app.clone().oneshot(empty("GET", "/v1/blockages")).await.unwrap()).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let get_res = app
        .clone()
        .oneshot(empty("GET", &format!("/v1/blockages/{id}")))
        .await
        .unwrap();
    assert_eq!(get_res.status(), StatusCode::OK);

    let delete_res = app
        .clone()
        .oneshot(empty("DELETE", &format!("/v1/blockages/{id}")))
        .await
        .unwrap();
    assert_eq!(delete_res.status(), StatusCode::NO_CONTENT);
    assert!(state.list_blockages().is_empty());

    let missing = app
        .oneshot(empty("GET", &format!("/v1/blockages/{id}")))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_blockage_is_rejected() {
    let (app, state) = setup_app();

    let res = app
        .clone()
        .oneshot(post_json("/v1/blockages", json!({"lat": 19.11, "lon": 72.875, "radius_m": 0})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["error"], "Invalid blockage");

    let res = app
        .oneshot(post_json("/v1/blockages", json!({"lat": 95.0, "lon": 72.875, "radius_m": 100})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(state.list_blockages().is_empty());
}

#[tokio::test]
async fn clear_removes_everything() {
    let (app, state) = setup_app();
    for lat in [19.1, 19.2] {
        let res = app
            .clone()
            .oneshot(post_json("/v1/blockages", json!({"lat": lat, "lon": 72.8, "radius_m": 300})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = app.oneshot(empty("DELETE", "/v1/blockages")).await.unwrap();
    assert_eq!(read_json(res).await["removed"], 2);
    assert!(state.list_blockages().is_empty());
}

#[tokio::test]
async fn conflict_check_uses_stored_blockages() {
    let (app, state) = setup_app();
    state.add_blockage(detour_core::Blockage::new(19.11, 72.875, 1000.0, "Works").unwrap());

    let crossing = json!({"points": [
        {"lat": 19.10, "lon": 72.85},
        {"lat": 19.11, "lon": 72.875},
        {"lat": 19.12, "lon": 72.90}
    ]});
    let res = app
        .clone()
        .oneshot(post_json("/v1/conflicts/check", crossing))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report = read_json(res).await;
    assert_eq!(report["has_conflicts"], true);
    assert!(report["conflict_percentage"].as_f64().unwrap() > 0.0);

    let far = json!({"points": [{"lat": 19.30, "lon": 72.60}, {"lat": 19.31, "lon": 72.61}]});
    let report = read_json(app.oneshot(post_json("/v1/conflicts/check", far)).await.unwrap()).await;
    assert_eq!(report["has_conflicts"], false);
    assert_eq!(report["conflict_percentage"], 0.0);
}

#[tokio::test]
async fn plan_without_blockages_is_direct() {
    let (app, _state) = setup_app();
    let res = app
        .oneshot(post_json("/v1/routes/plan", plan_body(false)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["outcome"], "direct");
    assert_eq!(body["service_name"], "Offline");
    assert_eq!(body["efficiency_score"], 100.0);
    assert_eq!(body["start"]["name"], "Start");
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn plan_avoids_blockage_on_the_direct_route() {
    let (app, state) = setup_app();
    state.add_blockage(detour_core::Blockage::new(19.11, 72.875, 1000.0, "Works").unwrap());

    let res = app
        .clone()
        .oneshot(post_json("/v1/routes/plan", plan_body(false)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["outcome"], "perfect_avoidance");
    assert_eq!(body["avoidance_success"], true);
    assert_eq!(body["waypoints_used"].as_array().unwrap().len(), 1);
    assert!(body["candidates_tested"].as_u64().unwrap() > 0);

    let ignored = read_json(
        app.oneshot(post_json("/v1/routes/plan", plan_body(true)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(ignored["outcome"], "direct_obstacles_ignored");
}

#[tokio::test]
async fn degenerate_plan_reports_failure() {
    let (app, _state) = setup_app();
    let body = json!({
        "start": {"lat": 19.10, "lon": 72.85},
        "end": {"lat": 19.10, "lon": 72.85}
    });
    let res = app.oneshot(post_json("/v1/routes/plan", body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json(res).await;
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Could not calculate direct route"));
}

#[tokio::test]
async fn unresolvable_place_name_is_a_bad_request() {
    let (app, _state) = setup_app();
    let body = json!({
        "start": "Somewhere that cannot be geocoded",
        "end": {"lat": 19.12, "lon": 72.90}
    });
    let res = app.oneshot(post_json("/v1/routes/plan", body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["error"], "Invalid start location");
}

#[tokio::test]
async fn direct_route_endpoint_returns_geometry() {
    let (app, _state) = setup_app();
    let body = json!({
        "start": {"lat": 19.10, "lon": 72.85},
        "end": {"lat": 19.12, "lon": 72.90}
    });
    let res = app.oneshot(post_json("/v1/routes/direct", body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(res).await;
    assert_eq!(body["service_name"], "Offline");
    assert!(body["points"].as_array().unwrap().len() >= 9);
    assert!(body["distance_km"].as_f64().unwrap() > 5.0);
}

#[tokio::test]
async fn empty_geocode_query_is_rejected() {
    let (app, _state) = setup_app();
    let res = app
        .oneshot(empty("GET", "/v1/geocode?q=%20"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
