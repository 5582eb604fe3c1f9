use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::common::{TestApp, setup_test_app, setup_test_app_no_auth, setup_test_app_with_storage};

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn admin_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, TestApp::session_cookie())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, TestApp::session_cookie())
        .body(Body::empty())
        .unwrap()
}

fn public_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create(app: &TestApp, path: &str, body: Value) -> String {
    let response = send(&app.router, admin_json("POST", path, body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    json["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let response = send(&app.router, Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = send(
        &app.router,
        Request::get("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/api/admin/projects"].is_object());
}

// ---------------------------------------------------------------------------
// Display resources
// ---------------------------------------------------------------------------

#[tokio::test]
async fn projects_are_listed_publicly_in_display_order() {
    let app = setup_test_app().await;

    for (title, order) in [("Third", 3), ("First", 1), ("Second", 2)] {
        create(
            &app,
            "/api/admin/projects",
            json!({ "title": title, "displayOrder": order, "category": "web" }),
        )
        .await;
    }

    let response = send(
        &app.router,
        Request::get("/api/admin/projects")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let titles: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["First", "Second", "Third"]);
    assert_eq!(json[0]["displayOrder"], 1);
    assert!(json[0]["imageUrl"].is_null());
    assert!(json[0]["createdAt"].is_string());
}

#[tokio::test]
async fn project_description_is_sanitized() {
    let app = setup_test_app().await;

    create(
        &app,
        "/api/admin/projects",
        json!({
            "title": "<b>Bold</b> title",
            "description": "<p>Hello<script>alert(1)</script> <strong>world</strong></p>",
        }),
    )
    .await;

    let json = body_json(send(&app.router, admin_get("/api/admin/projects")).await).await;
    assert_eq!(json[0]["title"], "Bold title");
    let description = json[0]["description"].as_str().unwrap();
    assert!(description.contains("<strong>world</strong>"));
    assert!(!description.contains("script"));
    assert!(!description.contains("alert"));
}

#[tokio::test]
async fn markup_only_titles_are_rejected() {
    let app = setup_test_app().await;

    for (path, body) in [
        ("/api/admin/projects", json!({ "title": "<img src=x onerror=alert(1)>" })),
        ("/api/admin/ticker", json!({ "text": "<img src=x onerror=alert(1)>" })),
    ] {
        let response = send(&app.router, admin_json("POST", path, body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
    }

    let json = body_json(send(&app.router, admin_get("/api/admin/projects")).await).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn session_cookie_is_percent_decoded() {
    let app = setup_test_app().await;
    let encoded = TestApp::session_cookie().replace('-', "%2D");

    let response = send(
        &app.router,
        Request::get("/api/admin/contact")
            .header(header::COOKIE, format!("theme=dark; {encoded}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_without_session_returns_401() {
    let app = setup_test_app().await;

    let response = send(
        &app.router,
        public_json("POST", "/api/admin/ticker", json!({ "text": "Hello" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Unauthorized");
}

#[tokio::test]
async fn unauthenticated_update_leaves_record_unchanged() {
    let app = setup_test_app().await;
    let id = create(&app, "/api/admin/ticker", json!({ "text": "Original" })).await;

    let response = send(
        &app.router,
        public_json("PUT", &format!("/api/admin/ticker/{id}"), json!({ "text": "Hacked" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong_cookie = Request::builder()
        .method("PUT")
        .uri(format!("/api/admin/ticker/{id}"))
        .header(header::COOKIE, "admin_session=guess")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "text": "Hacked" }).to_string()))
        .unwrap();
    assert_eq!(
        send(&app.router, wrong_cookie).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let json = body_json(send(&app.router, admin_get("/api/admin/ticker")).await).await;
    assert_eq!(json[0]["text"], "Original");
}

#[tokio::test]
async fn partial_update_changes_only_given_fields() {
    let app = setup_test_app().await;
    let id = create(
        &app,
        "/api/admin/statistics",
        json!({ "label": "Clients", "value": "120", "suffix": "+", "displayOrder": 2 }),
    )
    .await;

    let response = send(
        &app.router,
        admin_json(
            "PUT",
            &format!("/api/admin/statistics/{id}"),
            json!({ "value": "150", "id": id }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let json = body_json(send(&app.router, admin_get("/api/admin/statistics")).await).await;
    assert_eq!(json[0]["value"], "150");
    assert_eq!(json[0]["label"], "Clients");
    assert_eq!(json[0]["suffix"], "+");
    assert_eq!(json[0]["displayOrder"], 2);
}

#[tokio::test]
async fn update_with_unknown_field_returns_400() {
    let app = setup_test_app().await;
    let id = create(&app, "/api/admin/ticker", json!({ "text": "News" })).await;

    let response = send(
        &app.router,
        admin_json(
            "PUT",
            &format!("/api/admin/ticker/{id}"),
            json!({ "text": "Changed", "table": "admin_users" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(send(&app.router, admin_get("/api/admin/ticker")).await).await;
    assert_eq!(json[0]["text"], "News");
}

#[tokio::test]
async fn update_missing_record_returns_404() {
    let app = setup_test_app().await;

    let response = send(
        &app.router,
        admin_json(
            "PUT",
            "/api/admin/team/00000000-0000-0000-0000-000000000000",
            json!({ "position": "CTO" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_missing_required_field_returns_400() {
    let app = setup_test_app().await;

    let response = send(
        &app.router,
        admin_json("POST", "/api/admin/services", json!({ "description": "No title" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "`title` is required");
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let app = setup_test_app().await;

    let request = Request::post("/api/admin/services-list")
        .header(header::COOKIE, TestApp::session_cookie())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    assert_eq!(
        send(&app.router, request).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn delete_removes_record_and_is_idempotent() {
    let app = setup_test_app().await;
    let id = create(&app, "/api/admin/team", json!({ "name": "Ada", "position": "CEO" })).await;

    for _ in 0..2 {
        let request = Request::delete(format!("/api/admin/team/{id}"))
            .header(header::COOKIE, TestApp::session_cookie())
            .body(Body::empty())
            .unwrap();
        let response = send(&app.router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let json = body_json(send(&app.router, admin_get("/api/admin/team")).await).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn shop_category_takes_default_name_and_cannot_be_edited() {
    let app = setup_test_app().await;
    let id = create(&app, "/api/admin/shop-categories", json!({})).await;

    let json = body_json(send(&app.router, admin_get("/api/admin/shop-categories")).await).await;
    assert_eq!(json[0]["name"], "New Category");
    assert_eq!(json[0]["text"], "");

    let response = send(
        &app.router,
        admin_json(
            "PUT",
            &format!("/api/admin/shop-categories/{id}"),
            json!({ "name": "Renamed" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

fn contact_body() -> Value {
    json!({
        "name": "Grace",
        "email": "grace@example.com",
        "contactNo": "+39 055 123456",
        "message": "I would like a quote",
    })
}

#[tokio::test]
async fn contact_with_empty_field_returns_400() {
    let app = setup_test_app().await;

    for field in ["name", "email", "contactNo", "message"] {
        let mut body = contact_body();
        body[field] = json!("   ");

        let response = send(&app.router, public_json("POST", "/api/contact", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "field {field}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "All fields are required");
    }

    let response = send(
        &app.router,
        public_json("POST", "/api/contact", json!({ "name": "Only name" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contact_submission_lands_in_admin_inbox() {
    let app = setup_test_app().await;

    let response = send(&app.router, public_json("POST", "/api/contact", contact_body())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["success"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let json = body_json(send(&app.router, admin_get("/api/admin/contact")).await).await;
    assert_eq!(json[0]["id"], id.as_str());
    assert_eq!(json[0]["status"], "new");
    assert_eq!(json[0]["contactNo"], "+39 055 123456");

    let response = send(
        &app.router,
        admin_json(
            "PUT",
            &format!("/api/admin/contact/{id}"),
            json!({ "status": "replied" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(send(&app.router, admin_get("/api/admin/contact?status=new")).await).await;
    assert!(json.as_array().unwrap().is_empty());
    let json =
        body_json(send(&app.router, admin_get("/api/admin/contact?status=replied")).await).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn contact_inbox_requires_session_and_valid_status() {
    let app = setup_test_app().await;

    let response = send(
        &app.router,
        Request::get("/api/admin/contact").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app.router, admin_get("/api/admin/contact?status=spam")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app.router,
        admin_json(
            "PUT",
            "/api/admin/contact/00000000-0000-0000-0000-000000000000",
            json!({ "status": "read" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Users & session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_creation_is_disabled() {
    let app = setup_test_app().await;

    let response = send(
        &app.router,
        public_json(
            "POST",
            "/api/users",
            json!({ "username": "mallory", "email": "m@example.com", "password": "x" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "User creation is disabled");
}

#[tokio::test]
async fn user_list_requires_session_and_hides_password() {
    let app = setup_test_app().await;
    sqlx::query(
        "INSERT INTO admin_users (username, email, password_hash) VALUES ('root', 'root@example.com', 'argon2-hash')",
    )
    .execute(app.db.pool())
    .await
    .unwrap();

    let response = send(
        &app.router,
        Request::get("/api/users").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app.router, admin_get("/api/users")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json[0]["username"], "root");
    assert!(json[0].get("passwordHash").is_none());
    assert!(json[0].get("password_hash").is_none());
    assert!(!json.to_string().contains("argon2-hash"));
}

#[tokio::test]
async fn logout_expires_session_cookie() {
    let app = setup_test_app().await;

    let response = send(
        &app.router,
        Request::post("/api/admin/auth/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("admin_session=;"), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn no_session_token_configured_returns_403() {
    let app = setup_test_app_no_auth().await;

    let response = send(
        &app.router,
        Request::get("/api/admin/contact")
            .header(header::COOKIE, "admin_session=anything")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app.router,
        public_json("POST", "/api/admin/projects", json!({ "title": "x" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Admin access is disabled");
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blob_availability_reflects_storage_settings() {
    let app = setup_test_app().await;
    let json = body_json(send(&app.router, admin_get("/api/admin/blob-available")).await).await;
    assert_eq!(json["available"], false);
    assert_eq!(json["singleVideoUploadOnly"], false);

    let app = setup_test_app_with_storage().await;
    let json = body_json(send(&app.router, admin_get("/api/admin/blob-available")).await).await;
    assert_eq!(json["available"], true);
    assert_eq!(json["singleVideoUploadOnly"], true);
}

#[tokio::test]
async fn inline_image_is_served_with_content_type() {
    let app = setup_test_app().await;

    // "PNG!" base64-encoded, sent as a data URL
    let id = create(
        &app,
        "/api/admin/images",
        json!({
            "filename": "logo.png",
            "mimeType": "image/png",
            "data": "data:image/png;base64,UE5HIQ==",
        }),
    )
    .await;

    let response = send(
        &app.router,
        Request::get(format!("/api/images/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(response.headers()[header::CONTENT_SECURITY_POLICY], "sandbox");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"PNG!");

    let json = body_json(send(&app.router, admin_get("/api/admin/images")).await).await;
    assert_eq!(json[0]["filename"], "logo.png");
    assert_eq!(json[0]["size"], 4);
    assert!(json[0].get("data").is_none());
}

#[tokio::test]
async fn url_image_redirects_to_blob_storage() {
    let app = setup_test_app().await;

    let id = create(
        &app,
        "/api/admin/images",
        json!({
            "filename": "intro.mp4",
            "mimeType": "video/mp4",
            "url": "https://blob.example.com/intro.mp4",
            "size": 1048576,
        }),
    )
    .await;

    let response = send(
        &app.router,
        Request::get(format!("/api/images/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://blob.example.com/intro.mp4"
    );

    let request = Request::delete(format!("/api/admin/images/{id}"))
        .header(header::COOKIE, TestApp::session_cookie())
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app.router, request).await.status(), StatusCode::OK);

    let response = send(
        &app.router,
        Request::get(format!("/api/images/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn image_upload_rejects_bad_payloads() {
    let app = setup_test_app().await;

    let cases = [
        json!({ "filename": "a.pdf", "mimeType": "application/pdf", "data": "UE5HIQ==" }),
        json!({ "filename": "a.png", "mimeType": "image/png" }),
        json!({ "filename": "a.png", "mimeType": "image/png", "data": "UE5HIQ==", "url": "https://x.example/a.png" }),
        json!({ "filename": "a.png", "mimeType": "image/png", "data": "%%%" }),
        json!({ "filename": "a.svg", "mimeType": "image/svg+xml", "data": "PHN2Zy8+" }),
        json!({ "filename": "<img src=x onerror=alert(1)>", "mimeType": "image/png", "data": "UE5HIQ==" }),
    ];

    for body in cases {
        let response = send(&app.router, admin_json("POST", "/api/admin/images", body.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
    }
}
