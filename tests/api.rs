use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use recetario::{
    app::build_app,
    config::{AppConfig, GuardPolicy},
    state::AppState,
    store::FileStore,
};

fn test_app(dir: &tempfile::TempDir, guard: GuardPolicy, bootstrap_admin: bool) -> Router {
    let config = AppConfig {
        database_url: None,
        data_file: dir.path().join("recetas.json"),
        guard,
        session_ttl: Duration::from_secs(3600),
        bootstrap_admin,
        admin_password: bootstrap_admin.then(|| "s3cret-password".to_string()),
    };
    let store = Arc::new(FileStore::open(&config.data_file));
    build_app(AppState::from_parts(store, Arc::new(config)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(res: Response<Body>) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Runs the login form flow, returning the session cookie pair.
async fn login(app: &Router, username: &str, password: &str) -> Option<String> {
    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()?
        .to_string();
    Some(cookie)
}

#[tokio::test]
async fn crud_scenario_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, GuardPolicy::Open, false);

    // Create with the default diet flag.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "Ensalada", "calories": 120}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await,
        json!({"message": "saved", "status": "ok"})
    );

    let res = app.clone().oneshot(get("/api/recipes")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await,
        json!([{"id": 1, "name": "Ensalada", "calories": 120, "suitable_for_diet": true}])
    );

    // Newest first.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "Pizza", "calories": 800, "suitable_for_diet": false}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(get("/api/recipes")).await.unwrap();
    let listed = body_json(res).await;
    assert_eq!(listed[0]["name"], "Pizza");
    assert_eq!(listed[0]["suitable_for_diet"], json!(false));
    assert_eq!(listed[1]["id"], 1);

    // Full-replace update: the omitted flag resets to true.
    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/recipes/1",
            json!({"name": "Ensalada Grande", "calories": 150}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({"message": "updated"}));

    let res = app.clone().oneshot(get("/api/recipes")).await.unwrap();
    let listed = body_json(res).await;
    assert_eq!(
        listed[1],
        json!({"id": 1, "name": "Ensalada Grande", "calories": 150, "suitable_for_diet": true})
    );

    // Delete, then the id is gone; deleting again still succeeds.
    let res = app
        .clone()
        .oneshot(json_request("DELETE", "/api/recipes/1", json!({}), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({"message": "deleted"}));

    let res = app.clone().oneshot(get("/api/recipes")).await.unwrap();
    let listed = body_json(res).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "Pizza");

    let res = app
        .clone()
        .oneshot(json_request("DELETE", "/api/recipes/1", json!({}), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn update_of_absent_id_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, GuardPolicy::Open, false);

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/recipes/42",
            json!({"name": "Nada", "calories": 1}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await, json!({"message": "recipe not found"}));
}

#[tokio::test]
async fn missing_fields_are_a_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, GuardPolicy::Open, false);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "Pizza"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "", "calories": 10}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mutations_policy_guards_writes_but_not_reads() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, GuardPolicy::Mutations, true);

    let res = app.clone().oneshot(get("/api/recipes")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "Ensalada", "calories": 120}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(res).await,
        json!({"message": "authentication required"})
    );

    // Seed the admin, log in, and the same mutation goes through.
    let res = app.clone().oneshot(get("/crear-admin")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = login(&app, "admin", "s3cret-password").await.unwrap();
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "Ensalada", "calories": 120}),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_credentials_never_establish_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, GuardPolicy::Mutations, true);

    app.clone().oneshot(get("/crear-admin")).await.unwrap();

    // Wrong password and unknown username are rejected the same way.
    assert!(login(&app, "admin", "wrong").await.is_none());
    assert!(login(&app, "nobody", "s3cret-password").await.is_none());
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, GuardPolicy::Mutations, true);

    app.clone().oneshot(get("/crear-admin")).await.unwrap();
    let cookie = login(&app, "admin", "s3cret-password").await.unwrap();

    let req = Request::builder()
        .uri("/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "Ensalada", "calories": 120}),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_policy_guards_reads_and_pages() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, GuardPolicy::Full, false);

    // API paths get the 401 body, page paths get sent to the login form.
    let res = app.clone().oneshot(get("/api/recipes")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn bootstrap_route_is_idempotent_and_gated() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir, GuardPolicy::Open, true);

    let res = app.clone().oneshot(get("/crear-admin")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"admin user created\n");

    let res = app.clone().oneshot(get("/crear-admin")).await.unwrap();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"admin user already exists\n");

    // Without the flag the route does not exist at all.
    let dir2 = tempfile::tempdir().unwrap();
    let app2 = test_app(&dir2, GuardPolicy::Open, false);
    let res = app2.clone().oneshot(get("/crear-admin")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn corrupt_data_file_serves_an_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("recetas.json"), "{{{corrupt").unwrap();
    let app = test_app(&dir, GuardPolicy::Open, false);

    let res = app.clone().oneshot(get("/api/recipes")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!([]));

    // Creating afterwards rebuilds a valid file.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "Sopa", "calories": 90}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(get("/api/recipes")).await.unwrap();
    assert_eq!(
        body_json(res).await,
        json!([{"id": 1, "name": "Sopa", "calories": 90, "suitable_for_diet": true}])
    );
}
