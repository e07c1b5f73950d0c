//! Tests for the management plane: health, metrics dump, route listing.

use actix_web::{test, web, App};
use chrono::DateTime;
use infra_gate::models::route::RouteDefinition;
use infra_gate::routes::management::configure_management;
use infra_gate::services::metrics::{MetricsRegistry, NO_ROUTE_ID};
use infra_gate::services::route_table::RouteTable;
use std::sync::Arc;
use std::time::Duration;

struct ManagementFixture {
    table: Arc<RouteTable>,
    metrics: Arc<MetricsRegistry>,
}

fn fixture() -> ManagementFixture {
    let metrics = Arc::new(MetricsRegistry::new());
    let table = Arc::new(RouteTable::new(Arc::clone(&metrics)));
    ManagementFixture { table, metrics }
}

macro_rules! management_app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from(Arc::clone(&$fixture.table)))
                .app_data(web::Data::from(Arc::clone(&$fixture.metrics)))
                .configure(configure_management),
        )
        .await
    };
}

#[actix_web::test]
async fn health_reports_unavailable_with_no_routes() {
    let fixture = fixture();
    let app = management_app!(fixture);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 503);
    let body = test::read_body(resp).await;
    assert_eq!(body, web::Bytes::from_static(b"no routes configured"));
}

#[actix_web::test]
async fn health_reports_healthy_with_routes() {
    let fixture = fixture();
    fixture
        .table
        .add(RouteDefinition::new("console", "", "/", "http://127.0.0.1:9000"))
        .unwrap();
    let app = management_app!(fixture);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(content_type, "application/json; charset=utf-8");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[actix_web::test]
async fn metrics_dump_exposes_all_three_maps() {
    let fixture = fixture();
    fixture.metrics.record_request("console", Duration::from_millis(2));
    fixture.metrics.record_request("console", Duration::from_millis(1));
    fixture.metrics.record_error(NO_ROUTE_ID);
    let app = management_app!(fixture);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["request_count"]["console"], 2);
    assert_eq!(body["error_count"]["no-route"], 1);
    assert_eq!(body["response_times"]["console"], 3_000_000);
    assert!(DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[actix_web::test]
async fn metrics_dump_is_empty_maps_on_a_fresh_gate() {
    let fixture = fixture();
    let app = management_app!(fixture);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["request_count"], serde_json::json!({}));
    assert_eq!(body["error_count"], serde_json::json!({}));
    assert_eq!(body["response_times"], serde_json::json!({}));
}

#[actix_web::test]
async fn route_listing_returns_count_and_fields() {
    let fixture = fixture();
    fixture
        .table
        .add(RouteDefinition::new("api", "api.example.com", "/v1", "http://127.0.0.1:8081"))
        .unwrap();
    fixture
        .table
        .add(RouteDefinition::new("console", "", "/", "http://127.0.0.1:9000"))
        .unwrap();
    let app = management_app!(fixture);

    let req = test::TestRequest::get().uri("/routes").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 2);

    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 2);
    // list() orders by identifier.
    assert_eq!(routes[0]["id"], "api");
    assert_eq!(routes[0]["host"], "api.example.com");
    assert_eq!(routes[0]["path_prefix"], "/v1");
    assert_eq!(routes[0]["upstream"], "http://127.0.0.1:8081");
    assert!(DateTime::parse_from_rfc3339(routes[0]["created_at"].as_str().unwrap()).is_ok());
    assert!(DateTime::parse_from_rfc3339(routes[0]["updated_at"].as_str().unwrap()).is_ok());
    assert_eq!(routes[1]["id"], "console");
}

#[actix_web::test]
async fn non_get_methods_answer_405() {
    let fixture = fixture();
    let app = management_app!(fixture);

    for path in ["/health", "/metrics", "/routes"] {
        let req = test::TestRequest::post().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 405, "POST {path}");

        let req = test::TestRequest::delete().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 405, "DELETE {path}");
    }
}
