//! HTTP API tests against an in-memory store
//!
//! No printer bridge is configured, so print requests are accepted without a
//! job id and nothing leaves the process.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bundle_server::api::build_router;
use bundle_server::{BundleStorage, Config, ServerState};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    _dir: tempfile::TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_rendering(true)
    }

    fn with_rendering(label_rendering: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_work_dir(dir.path().to_string_lossy().to_string());
        config.label_rendering = label_rendering;

        let storage = BundleStorage::open_in_memory().unwrap();
        let (state, queue) = ServerState::with_storage(&config, storage).unwrap();
        assert!(queue.is_none());

        Self {
            router: build_router(state),
            _dir: dir,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn seed_variant(&self) {
        let (status, _) = self
            .json(
                "PUT",
                "/api/variant",
                Some(json!({
                    "s_no": "ISA-50",
                    "name": "Equal Angle",
                    "series": "S-200",
                    "print_series": "200 SERIES",
                    "breadth": "50",
                    "thickness": "n/a",
                    "range": "{\"start\":20,\"end\":30}"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn create_bundle(&self) -> Value {
        let (status, body) = self
            .json(
                "POST",
                "/api/bundle/create",
                Some(json!({
                    "cutlength": "12",
                    "quantity": 10,
                    "weight": "250.5",
                    "location": 1,
                    "cast_id": "C-1",
                    "vs_no": "ISA-50",
                    "po_no": "po-7"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }
}

#[tokio::test]
async fn test_ping_and_health() {
    let app = TestApp::new();

    let (status, body) = app.json("GET", "/api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": 200}));

    app.create_bundle().await;
    let (status, body) = app.json("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["bundles"], 1);
    assert_eq!(body["label_rendering"], true);
    assert_eq!(body["printer_bridge"], false);
}

#[tokio::test]
async fn test_create_allocates_serials_and_advances_counter() {
    let app = TestApp::new();

    let (_, body) = app.json("GET", "/api/bundle/current-number", None).await;
    assert_eq!(body, json!({"currentNumber": "1"}));

    let first = app.create_bundle().await;
    let sr_no = first["sr_no"].as_str().unwrap();
    assert!(sr_no.ends_with('1'));
    assert_eq!(sr_no.len(), 4);
    assert_eq!(first["status"], "ACTIVE");
    assert_eq!(first["po_no"], "PO-7");
    assert_eq!(first["length"], 12.0);

    let (status, body) = app
        .json("POST", "/api/bundle/set-number", Some(json!({"number": " 005 "})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "newNumber": "5"}));

    let second = app.create_bundle().await;
    assert!(second["sr_no"].as_str().unwrap().ends_with('5'));
    assert_ne!(first["uid"], second["uid"]);

    let (_, body) = app.json("GET", "/api/bundle/current-number", None).await;
    assert_eq!(body["currentNumber"], "6");

    let (_, body) = app.json("GET", "/api/bundle/recents", None).await;
    let recents = body["recentBundles"].as_array().unwrap();
    assert_eq!(recents.len(), 2);
    assert_eq!(recents[0]["uid"], second["uid"]);
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            "POST",
            "/api/bundle/create",
            Some(json!({"cutlength": "abc", "quantity": 1, "weight": 1, "vs_no": "X", "cast_id": "C"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    let (status, _) = app
        .json("POST", "/api/bundle/set-number", Some(json!({"number": "x12"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // failed requests never move the counter
    let (_, body) = app.json("GET", "/api/bundle/current-number", None).await;
    assert_eq!(body["currentNumber"], "1");
}

#[tokio::test]
async fn test_detail_modify_and_variants() {
    let app = TestApp::new();
    app.seed_variant().await;
    let bundle = app.create_bundle().await;
    let uid = bundle["uid"].as_str().unwrap();

    let (status, detail) = app.json("GET", &format!("/api/bundle/{uid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["sr_no"], bundle["sr_no"]);
    assert_eq!(detail["section"]["print_series"], "200 SERIES");
    assert_eq!(detail["section"]["breadth"], 50.0);
    assert_eq!(detail["section"]["thickness"], Value::Null);

    let (status, modified) = app
        .json(
            "PUT",
            &format!("/api/bundle/modify/{uid}"),
            Some(json!({
                "cutlength": 20, "quantity": 4, "weight": 100, "location": 2,
                "cast_id": "C-2", "vs_no": "ISA-50", "po_no": "x"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(modified["sr_no"], bundle["sr_no"]);
    assert_eq!(modified["quantity"], 4);
    assert_eq!(modified["po_no"], "X");

    let (status, _) = app.json("GET", "/api/bundle/missing-uid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.json("GET", "/api/variant/all", None).await;
    assert_eq!(
        body,
        json!({"variants": [{"s_no": "ISA-50", "series": "S-200", "range": "{\"start\":20,\"end\":30}"}]})
    );
    let (status, _) = app.json("GET", "/api/variant/NOPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scanned_uppercase_uid_resolves() {
    let app = TestApp::new();
    app.seed_variant().await;
    let bundle = app.create_bundle().await;
    let uid = bundle["uid"].as_str().unwrap();

    // 标签二维码里的 uid 是大写
    let (status, detail) = app
        .json("GET", &format!("/api/bundle/{}", uid.to_uppercase()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["uid"], uid);
    assert_eq!(detail["sr_no"], bundle["sr_no"]);
}

#[tokio::test]
async fn test_move_archives_bundles() {
    let app = TestApp::new();
    let bundle = app.create_bundle().await;
    let sr_no = bundle["sr_no"].as_str().unwrap();
    let uid = bundle["uid"].as_str().unwrap();

    let (status, body) = app
        .json("POST", "/api/move", Some(json!({"moveData": format!("{sr_no}, 99Z9"), "ref": "INV-1"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["done"], true);
    assert_eq!(body["results"][0]["outcome"], "moved");
    assert_eq!(body["results"][1]["outcome"], "unknown");
    assert!(body.get("message").is_none());

    let (status, _) = app.json("GET", &format!("/api/bundle/{uid}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // second move is a no-op
    let (_, body) = app
        .json("POST", "/api/move", Some(json!({"moveData": sr_no, "ref": "INV-2"})))
        .await;
    assert_eq!(body["results"][0]["outcome"], "already_sold");

    let (_, body) = app.json("GET", "/health", None).await;
    assert_eq!(body["bundles"], 0);
    assert_eq!(body["sold_bundles"], 1);
}

#[tokio::test]
async fn test_move_leaves_returned_bundle_in_place() {
    let app = TestApp::new();
    let bundle = app.create_bundle().await;
    let sr_no = bundle["sr_no"].as_str().unwrap();
    let uid = bundle["uid"].as_str().unwrap();

    let (status, _) = app
        .json("POST", "/api/die-mutation/tasks", Some(json!({"bundles": [sr_no]})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .json("POST", "/api/move", Some(json!({"moveData": sr_no, "ref": "INV-9"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["outcome"], "quarantined");
    assert_eq!(body["message"], "1 of 1 bundles could not be moved");

    let (_, detail) = app.json("GET", &format!("/api/bundle/{uid}"), None).await;
    assert_eq!(detail["status"], "RETURNED");
    let (_, body) = app.json("GET", "/health", None).await;
    assert_eq!(body["sold_bundles"], 0);
}

#[tokio::test]
async fn test_move_validation() {
    let app = TestApp::new();

    let (status, _) = app
        .json("POST", "/api/move", Some(json!({"moveData": " , ", "ref": "INV-1"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json("POST", "/api/move", Some(json!({"moveData": "25A1"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_die_mutation_flow() {
    let app = TestApp::new();
    app.seed_variant().await;
    let bundle = app.create_bundle().await;
    let sr_no = bundle["sr_no"].as_str().unwrap();
    let uid = bundle["uid"].as_str().unwrap();

    // ACTIVE bundles are guarded against deletion
    let (status, body) = app
        .json("DELETE", &format!("/api/die-mutation/tasks/{uid}"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["currentStatus"], "ACTIVE");

    let (status, body) = app
        .json(
            "POST",
            "/api/die-mutation/tasks",
            Some(json!({"bundles": [sr_no, "99Z9"], "reason": "lost"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["processed"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["sr_no"], "99Z9");

    let (_, page) = app
        .json("GET", "/api/die-mutation/tasks?limit=abc&offset=0", None)
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["limit"], 100);
    assert_eq!(page["bundles"][0]["status"], "RETURNED");
    assert_eq!(page["bundles"][0]["section"]["name"], "Equal Angle");

    let (status, body) = app
        .json("DELETE", &format!("/api/die-mutation/tasks/{uid}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted"]["sr_no"], sr_no);

    let (status, _) = app
        .json("DELETE", &format!("/api/die-mutation/tasks/{uid}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_die_mutation_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .json("POST", "/api/die-mutation/tasks", Some(json!({"bundles": []})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request: 'bundles' must be a non-empty array");

    let (status, _) = app
        .json(
            "POST",
            "/api/die-mutation/tasks",
            Some(json!({"bundles": ["25A1"], "reason": "Lost"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_label_and_print() {
    let app = TestApp::new();
    app.seed_variant().await;
    let bundle = app.create_bundle().await;
    let uid = bundle["uid"].as_str().unwrap();

    let (status, png) = app
        .send("GET", &format!("/api/bundle/{uid}/label/0"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    for layout in [0, 1] {
        let (status, body) = app
            .json("GET", &format!("/api/bundle/print/{layout}/{uid}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"print": 1}));
    }

    let (_, body) = app
        .json("GET", "/api/bundle/print/0/unknown-uid", None)
        .await;
    assert_eq!(body, json!({"print": 0}));

    let (status, _) = app
        .json("GET", &format!("/api/bundle/print/7/{uid}"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.json("GET", "/api/bundle/print/jobs/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disabled_rendering_is_unavailable() {
    let app = TestApp::with_rendering(false);
    app.seed_variant().await;
    let bundle = app.create_bundle().await;
    let uid = bundle["uid"].as_str().unwrap();

    let (status, body) = app
        .json("GET", &format!("/api/bundle/{uid}/label/0"), None)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "E9004");

    let (_, body) = app.json("GET", "/health", None).await;
    assert_eq!(body["label_rendering"], false);
}
