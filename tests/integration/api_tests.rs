//! API integration tests
//!
//! Tests the API endpoints with real HTTP requests against a test router.

use serde_json::json;

use crate::common::{HostFactory, HostFixtures, TestApp};

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_detailed_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/detailed").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["components"]["database"]["status"], "healthy");
    assert_eq!(json["components"]["folder_pool"]["status"], "healthy");
}

#[tokio::test]
async fn test_list_hosts() {
    let app = TestApp::new().await;
    app.insert_host(&HostFixtures::web()).await;
    app.insert_host(&HostFixtures::db()).await;

    let response = app.get("/api/v1/hosts").await;
    response.assert_ok();

    let json: Vec<serde_json::Value> = response.json();
    assert_eq!(json.len(), 2);
    assert_eq!(json[0]["hostname"], "db01.example.com");
}

#[tokio::test]
async fn test_debug_host_checkmk() {
    let app = TestApp::new().await;
    app.insert_host(&HostFixtures::web()).await;

    let response = app
        .get("/api/v1/hosts/web01.example.com/debug/checkmk")
        .await;
    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["integration"], "checkmk");
    assert_eq!(json["attributes"]["all"]["location"], "Berlin-dc");
    assert_eq!(json["attributes"]["filtered"]["os"], "linux");
    assert!(json["attributes"]["filtered"].get("nic").is_none());

    let export = &json["outcome"]["export"];
    assert_eq!(export["move_folder"], "/berlin/pool/a");
    assert_eq!(export["custom_attributes"][0]["name"], "monitored");
    assert_eq!(export["remove_attributes"][0], "legacy");
    assert!(export.get("parents").is_none());

    // Debug evaluation never consumes a real seat
    let pools: Vec<serde_json::Value> = app.get("/api/v1/folder-pools").await.json();
    assert!(pools.iter().all(|p| p["taken_seats"] == 0));
}

#[tokio::test]
async fn test_debug_host_ignored_by_filter() {
    let app = TestApp::new().await;
    app.insert_host(&HostFixtures::lab()).await;

    let response = app
        .get("/api/v1/hosts/lab01.example.com/debug/checkmk")
        .await;
    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["attributes"]["ignore_host"], true);
    assert!(json.get("outcome").is_none());
}

#[tokio::test]
async fn test_debug_host_netbox_interfaces() {
    let app = TestApp::new().await;
    app.insert_host(&HostFixtures::web()).await;

    let response = app.get("/api/v1/hosts/web01.example.com/debug/netbox").await;
    response.assert_ok();

    let json: serde_json::Value = response.json();
    let interfaces = json["outcome"]["interfaces"]["interfaces"]
        .as_array()
        .expect("interfaces list");
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0]["fields"]["name"]["value"], "eth0");
    assert_eq!(interfaces[0]["fields"]["mtu"]["value"], 1500);
}

#[tokio::test]
async fn test_debug_unknown_host_returns_404() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/hosts/missing.example.com/debug/checkmk").await;
    response.assert_not_found();
}

#[tokio::test]
async fn test_debug_unknown_integration_returns_400() {
    let app = TestApp::new().await;
    let host = HostFactory::new().create().build();
    app.insert_host(&host).await;

    let response = app
        .get(&format!("/api/v1/hosts/{}/debug/ldap", host.hostname))
        .await;
    response.assert_bad_request();
}

#[tokio::test]
async fn test_list_folder_pools() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/folder-pools").await;
    response.assert_ok();

    let json: Vec<serde_json::Value> = response.json();
    assert_eq!(json.len(), 2);
    assert_eq!(json[0]["folder_path"], "/pool/a");
    assert_eq!(json[0]["total_seats"], 1);
}

#[tokio::test]
async fn test_upsert_folder_pool() {
    let app = TestApp::new().await;
    let response = app
        .put_json(
            "/api/v1/folder-pools",
            json!({"folder_path": "/pool/c", "total_seats": 5}),
        )
        .await;
    response.assert_ok();

    let pools: Vec<serde_json::Value> = app.get("/api/v1/folder-pools").await.json();
    assert_eq!(pools.len(), 3);

    let response = app
        .put_json(
            "/api/v1/folder-pools",
            json!({"folder_path": "pool/c", "total_seats": 5}),
        )
        .await;
    response.assert_unprocessable();
}

#[tokio::test]
async fn test_delete_folder_pool() {
    let app = TestApp::new().await;
    app.delete("/api/v1/folder-pools/pool/b").await.assert_ok();

    let response = app.get("/api/v1/folder-pools/pool/b").await;
    response.assert_not_found();
}

#[tokio::test]
async fn test_delete_referenced_folder_pool_returns_422() {
    let app = TestApp::new().await;
    let host = HostFactory::new().create().locked_to("/pool/a").build();
    app.insert_host(&host).await;

    let response = app.delete("/api/v1/folder-pools/pool/a").await;
    response.assert_unprocessable();

    let json: serde_json::Value = response.json();
    assert!(json["message"].as_str().unwrap().contains("/pool/a"));
}

#[tokio::test]
async fn test_failed_pool_write_leaves_pool_unchanged() {
    let app = TestApp::new().await;
    app.state.db.close().await;

    let response = app
        .put_json(
            "/api/v1/folder-pools",
            json!({"folder_path": "/pool/c", "total_seats": 5}),
        )
        .await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .put_json(
            "/api/v1/folder-pools",
            json!({"folder_path": "/pool/b", "total_seats": 7, "enabled": false}),
        )
        .await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    let pools = app.state.pool.snapshot();
    assert_eq!(pools.len(), 2);
    assert_eq!(pools[1].total_seats, 2);
    assert!(pools[1].enabled);
}
