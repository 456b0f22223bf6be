use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use schemaway::{config::Config, create_app};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

async fn app(guest_mode: bool) -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = Config::with_data_dir(dir.path());
    config.auth.guest_mode = guest_mode;
    config.auth.guest_user_id = "guest".to_string();
    let app = create_app(config).await.expect("app");
    (dir, app)
}

/// Send a request and return status plus parsed JSON body (Null when empty or not JSON)
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn shop_project() -> Value {
    json!({
        "name": "Shop",
        "engine": "mysql",
        "tables": [
            {
                "id": "t-users",
                "name": "users",
                "position": { "x": 0, "y": 0 },
                "columns": [
                    { "id": "c-id", "name": "id", "type": "INT", "primaryKey": true, "nullable": false }
                ]
            },
            {
                "id": "t-orders",
                "name": "orders",
                "position": { "x": 400, "y": 0 },
                "columns": [
                    { "id": "o-id", "name": "id", "type": "INT", "primaryKey": true, "nullable": false },
                    { "id": "o-user", "name": "user_id", "type": "INT" }
                ]
            }
        ],
        "relations": [
            {
                "id": "r1",
                "sourceTableId": "t-orders",
                "sourceColumnId": "o-user",
                "targetTableId": "t-users",
                "targetColumnId": "c-id",
                "cardinality": "many-to-one",
                "onDelete": "SET NULL"
            }
        ],
        "notes": [
            { "id": "n1", "content": "todo", "color": "#fff", "position": { "x": 0, "y": 300 }, "width": 100, "height": 50 }
        ]
    })
}

const ALICE: (&str, &str) = ("x-user-id", "alice");
const BOB: (&str, &str) = ("x-user-id", "bob");

#[tokio::test]
async fn health_check_is_public() {
    let (_dir, app) = app(false).await;
    let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn requests_without_identity_are_rejected() {
    let (_dir, app) = app(false).await;
    let (status, body) = send(&app, "GET", "/api/projects", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn project_crud_over_http() {
    let (_dir, app) = app(false).await;

    let (status, created) = send(&app, "POST", "/api/projects", &[ALICE], Some(shop_project())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userId"], "alice");
    assert_eq!(created["engine"], "mysql");
    assert_eq!(created["tables"][1]["columns"][1]["nullable"], true);
    let id = created["id"].as_str().expect("id").to_string();

    let (status, listed) = send(&app, "GET", "/api/projects", &[ALICE], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["projects"][0]["id"], id.as_str());
    assert_eq!(listed["projects"][0]["tableCount"], 2);

    let uri = format!("/api/projects/{id}");
    let (status, updated) = send(&app, "PUT", &uri, &[ALICE], Some(json!({ "name": "Shop v2" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Shop v2");
    assert_eq!(updated["relations"][0]["onDelete"], "SET NULL");

    let (status, fetched) = send(&app, "GET", &uri, &[ALICE], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Shop v2");

    let (status, _) = send(&app, "GET", &uri, &[BOB], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, &[ALICE], None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "GET", &uri, &[ALICE], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn invalid_documents_return_issue_paths() {
    let (_dir, app) = app(false).await;
    let mut project = shop_project();
    project["relations"][0]["targetColumnId"] = json!("missing");
    project["tables"][0]["columns"][0]["type"] = json!("JSONB");

    let (status, body) = send(&app, "POST", "/api/projects", &[ALICE], Some(project)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_schema");
    let paths: Vec<&str> = body["issues"]
        .as_array()
        .expect("issues")
        .iter()
        .filter_map(|issue| issue["path"].as_str())
        .collect();
    assert!(paths.contains(&"tables[0].columns[0].type"));
    assert!(paths.contains(&"relations[0].targetColumnId"));

    let (status, _) = send(&app, "POST", "/api/projects", &[ALICE], Some(json!({ "name": "x" }))).await;
    assert!(status.is_client_error());

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects",
        &[ALICE],
        Some(json!({ "name": " ", "engine": "sqlite" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn canvas_positions_and_duplicate() {
    let (_dir, app) = app(false).await;
    let (_, created) = send(&app, "POST", "/api/projects", &[ALICE], Some(shop_project())).await;
    let id = created["id"].as_str().expect("id").to_string();

    let (status, canvas) = send(&app, "GET", &format!("/api/projects/{id}/canvas"), &[ALICE], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(canvas["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(canvas["nodes"][2]["type"], "note");
    assert_eq!(canvas["edges"][0]["sourceHandle"], "o-user-source");
    assert_eq!(canvas["edges"][0]["label"], "N:1");
    assert_eq!(canvas["bounds"]["x"], 0.0);

    let moves = json!({ "moves": [
        { "id": "t-orders", "kind": "table", "position": { "x": 500, "y": 40 } }
    ]});
    let (status, moved) = send(&app, "PUT", &format!("/api/projects/{id}/positions"), &[ALICE], Some(moves)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["tables"][1]["position"]["x"], 500.0);

    let bad_moves = json!({ "moves": [
        { "id": "nope", "kind": "group", "position": { "x": 0, "y": 0 } }
    ]});
    let (status, _) = send(&app, "PUT", &format!("/api/projects/{id}/positions"), &[ALICE], Some(bad_moves)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, copy) = send(&app, "POST", &format!("/api/projects/{id}/duplicate"), &[ALICE], None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["name"], "Shop (copy)");
    assert_eq!(copy["tables"][1]["position"]["x"], 500.0);
}

#[tokio::test]
async fn stateless_schema_endpoints() {
    let (_dir, app) = app(false).await;

    let (status, engines) = send(&app, "GET", "/api/engines", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(engines[0]["id"], "postgresql");
    assert_eq!(engines[2]["defaultIdType"], "INTEGER");

    let mut document = shop_project();
    document.as_object_mut().expect("object").remove("name");
    let (status, report) = send(&app, "POST", "/api/schema/validate", &[], Some(document.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], true);

    document["tables"][1]["columns"][1]["nullable"] = json!(false);
    let (_, report) = send(&app, "POST", "/api/schema/validate", &[], Some(document.clone())).await;
    assert_eq!(report["valid"], false);
    assert_eq!(report["issues"][0]["path"], "relations[0].onDelete");

    let (status, canvas) = send(&app, "POST", "/api/schema/canvas", &[], Some(document)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(canvas["edges"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn workspace_projects_are_shared_with_members_only() {
    let (_dir, app) = app(false).await;

    let (status, workspace) = send(&app, "POST", "/api/workspaces", &[ALICE], Some(json!({ "name": "Data team" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(workspace["role"], "owner");
    let ws = workspace["id"].as_str().expect("id").to_string();
    let in_ws = ("x-workspace-id", ws.as_str());

    let (status, created) = send(&app, "POST", "/api/projects", &[ALICE, in_ws], Some(shop_project())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["workspaceId"], ws.as_str());
    assert!(created.get("userId").is_none());

    // Not in alice's personal scope
    let (_, personal) = send(&app, "GET", "/api/projects", &[ALICE], None).await;
    assert_eq!(personal["projects"].as_array().map(Vec::len), Some(0));

    // Bob is not a member yet
    let (status, _) = send(&app, "GET", "/api/projects", &[BOB, in_ws], None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let members_uri = format!("/api/workspaces/{ws}/members");
    let (status, members) = send(&app, "POST", &members_uri, &[ALICE], Some(json!({ "userId": "bob" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members["members"].as_array().map(Vec::len), Some(2));

    let (status, listed) = send(&app, "GET", "/api/projects", &[BOB, in_ws], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["projects"][0]["name"], "Shop");

    // Members cannot manage membership
    let (status, _) = send(&app, "POST", &members_uri, &[BOB], Some(json!({ "userId": "carol" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The last owner stays
    let (status, _) = send(&app, "DELETE", &format!("{members_uri}/alice"), &[ALICE], None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, details) = send(&app, "GET", &format!("/api/workspaces/{ws}"), &[BOB], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["role"], "member");
    assert_eq!(details["name"], "Data team");

    // Members cannot remove others but may leave
    let (status, _) = send(&app, "DELETE", &format!("{members_uri}/alice"), &[BOB], None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &format!("{members_uri}/bob"), &[BOB], None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/projects", &[BOB, in_ws], None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/projects", &[ALICE, ("x-workspace-id", "unknown")], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn guest_mode_uses_the_synthetic_user() {
    let (_dir, app) = app(true).await;

    let (status, me) = send(&app, "GET", "/api/me", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["userId"], "guest");
    assert_eq!(me["guest"], true);

    // The header is ignored in guest mode
    let (_, created) = send(&app, "POST", "/api/projects", &[ALICE], Some(shop_project())).await;
    assert_eq!(created["userId"], "guest");
    let (_, listed) = send(&app, "GET", "/api/projects", &[], None).await;
    assert_eq!(listed["projects"].as_array().map(Vec::len), Some(1));
}
