use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;

use server::routes::{self, ServerState};
use server::startup::build_state;
use service::auth::repository::mock::MockUserRepository;
use service::cache::MemoryCacheMirror;
use service::domain::repository::mock::MockDomainRepository;
use service::upload::{ImagePipeline, LocalFileStore};

const BOUNDARY: &str = "----cmsboundary";

struct TestApp {
    app: Router,
    state: ServerState,
    _dir: tempfile::TempDir,
}

fn build_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    let uploads = ImagePipeline::new(dir.path(), cfg.upload.max_file_size, Arc::new(LocalFileStore));
    let state = build_state(
        &cfg,
        Arc::new(MockDomainRepository::default()),
        Arc::new(MockUserRepository::default()),
        Arc::new(MemoryCacheMirror::new()),
        uploads,
    );
    let app = routes::build_router(state.clone(), tower_http::cors::CorsLayer::very_permissive());
    TestApp { app, state, _dir: dir }
}

impl TestApp {
    fn bearer(&self) -> String {
        format!("Bearer {}", self.state.auth.issue_token(999).expect("token"))
    }

    async fn send(&self, req: Request<Body>) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let resp = self.app.clone().call(req).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, headers, body))
    }

    async fn json(&self, method: &str, uri: &str, body: Value) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, self.bearer())
            .body(Body::from(serde_json::to_vec(&body)?))?;
        self.send(req).await
    }

    async fn get(&self, uri: &str) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let req = Request::builder().uri(uri).header(header::AUTHORIZATION, self.bearer()).body(Body::empty())?;
        self.send(req).await
    }

    async fn post_domain(&self, fields: &[(&str, &str)], files: &[(&str, &str, &str, Vec<u8>)]) -> anyhow::Result<(StatusCode, Value)> {
        let req = Request::builder()
            .method("POST")
            .uri("/api/domain/post")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .header(header::AUTHORIZATION, self.bearer())
            .body(Body::from(multipart_body(fields, files)))?;
        let (status, _, body) = self.send(req).await?;
        Ok((status, body))
    }

    async fn create_domain(&self, name: &str) -> anyhow::Result<i64> {
        let (status, body) = self.post_domain(&[("name", name), ("meta_title", "Title"), ("modul", "blog,gallery")], &[]).await?;
        assert_eq!(status, StatusCode::OK, "{body}");
        Ok(body["data"]["id"].as_i64().expect("id"))
    }
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &str, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in fields {
        out.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes());
    }
    for (name, file_name, content_type, bytes) in files {
        out.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n")
                .as_bytes(),
        );
        out.extend_from_slice(bytes);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png).expect("encode png");
    buf
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let t = build_app();
    let (status, _, body) = t.send(Request::builder().uri("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> anyhow::Result<()> {
    let t = build_app();
    let (status, _, body) = t.send(Request::builder().uri("/api/domain").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"message": "Unauthenticated"}));

    let req = Request::builder()
        .uri("/api/domain")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())?;
    let (status, _, _) = t.send(req).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder().uri("/api/domain").header(header::COOKIE, "jwt=forged").body(Body::empty())?;
    let (status, _, _) = t.send(req).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn create_register_login_and_browse_with_cookie() -> anyhow::Result<()> {
    let t = build_app();

    let (status, body) = t
        .post_domain(
            &[("name", "example.com"), ("meta_title", "Example"), ("modul", "blog,gallery"), ("status", "active")],
            &[("logo", "logo.png", "image/png", png(200, 100))],
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Successfully saved data");
    let id = body["data"]["id"].as_i64().expect("id");

    let (status, _, body) = t
        .json("POST", "/api/register", json!({
            "first_name": "Ana", "last_name": "Putri", "email": "ana@example.com",
            "phone": "0812", "password": "secret1", "domains_id": [id], "access_right": "admin"
        }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Account created successfully");
    assert!(body["user"].get("password").is_none());

    let req = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": "ana@example.com", "password": "secret1"}))?))?;
    let (status, headers, body) = t.send(req).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "You have successfully Login");
    assert_eq!(body["user"]["domain"][0]["name"], "example.com");
    assert_eq!(body["user"]["domain"][0]["modul"][0]["blog"]["name"], "Blog");
    let logo = body["user"]["domain"][0]["logo"].as_str().expect("logo");
    assert!(logo.starts_with("logo_") && logo.ends_with(".png"), "{logo}");

    let set_cookie = headers.get(header::SET_COOKIE).expect("set-cookie").to_str()?.to_string();
    assert!(set_cookie.starts_with("jwt="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=86400"));
    let pair = set_cookie.split(';').next().unwrap_or_default().to_string();

    let req = Request::builder().uri(format!("/api/domain/{id}")).header(header::COOKIE, pair).body(Body::empty())?;
    let (status, _, body) = t.send(req).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "example.com");
    Ok(())
}

#[tokio::test]
async fn login_failures_have_distinct_statuses() -> anyhow::Result<()> {
    let t = build_app();
    let login = |email: &str, password: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json!({"email": email, "password": password})).unwrap_or_default()))
    };

    let (status, _, body) = t.send(login("nobody@example.com", "secret1")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Email address doesn't exist");

    // registered against a domain id that was never cached
    let (status, _, _) = t
        .json("POST", "/api/register", json!({"first_name": "Budi", "email": "budi@example.com", "password": "secret1", "domains_id": "42"}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = t.send(login("budi@example.com", "wrong-pass")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Incorrect Password");

    let (status, headers, _) = t.send(login("budi@example.com", "secret1")?).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(headers.get(header::SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn register_reports_validation_and_duplicates() -> anyhow::Result<()> {
    let t = build_app();
    let (status, _, body) = t
        .json("POST", "/api/register", json!({"first_name": "", "email": "not-an-email", "password": "123"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "validation field");
    let fields: Vec<&str> = body["errors"].as_array().expect("errors").iter().filter_map(|e| e["field"].as_str()).collect();
    assert!(fields.contains(&"first_name"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"email"));

    let input = json!({"first_name": "Ana", "email": "ana@example.com", "password": "secret1"});
    assert_eq!(t.json("POST", "/api/register", input.clone()).await?.0, StatusCode::OK);
    let (status, _, body) = t.json("POST", "/api/register", input).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already exists");
    Ok(())
}

#[tokio::test]
async fn rejected_upload_creates_nothing() -> anyhow::Result<()> {
    let t = build_app();
    let (status, body) = t
        .post_domain(
            &[("name", "example.com"), ("meta_title", "Example")],
            &[("logo", "notes.txt", "text/plain", b"hello".to_vec())],
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "validation field");
    assert!(!body["errors"].as_array().expect("errors").is_empty());

    let (_, _, list) = t.get("/api/domain").await?;
    assert_eq!(list["meta"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn duplicate_domain_name_is_rejected() -> anyhow::Result<()> {
    let t = build_app();
    t.create_domain("example.com").await?;
    let (status, body) = t.post_domain(&[("name", "example.com"), ("meta_title", "Again")], &[]).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Domain already exists");
    Ok(())
}

#[tokio::test]
async fn update_dispatches_on_action() -> anyhow::Result<()> {
    let t = build_app();
    let a = t.create_domain("a.example.com").await?;
    t.create_domain("b.example.com").await?;

    let (status, _, body) = t.json("PUT", "/api/domain/update", json!({"id": a})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Action (aksi) is required");

    let (status, _, body) = t.json("PUT", "/api/domain/update", json!({"aksi": "dropAll"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid action specified: dropAll");

    let (status, _, body) = t
        .json("PUT", "/api/domain/update", json!({"aksi": "updateAll", "id": a.to_string(), "name": "a.example.com", "meta_title": "New"}))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Successfully updated domain");

    let (status, _, body) = t
        .json("PUT", "/api/domain/update", json!({"aksi": "updateAll", "id": a, "name": "b.example.com", "meta_title": "New"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Domain name already exists");

    let (status, _, body) = t
        .json("PUT", "/api/domain/update", json!({"aksi": "updateAll", "id": 777, "name": "c.example.com", "meta_title": "New"}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "domain with id 777 not found");

    let (status, _, body) = t.json("PUT", "/api/domain/update", json!({"aksi": "updateAll", "id": -3})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid ID format");

    let (status, _, body) = t.json("PUT", "/api/domain/update", json!(["updateAll"])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request payload");
    Ok(())
}

#[tokio::test]
async fn status_batch_maps_outcome_to_status_code() -> anyhow::Result<()> {
    let t = build_app();
    let a = t.create_domain("a.example.com").await?;

    let (status, _, body) = t
        .json("PUT", "/api/domain/update", json!({"aksi": "updateStatus", "data": [{"id": a, "status": "inactive"}]}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);
    assert!(body.get("errors").is_none());

    let (status, _, body) = t
        .json("PUT", "/api/domain/update", json!({"aksi": "updateStatus", "data": [
            {"id": a, "status": "active"}, {"id": "", "status": "active"}, {"id": 404, "status": "active"}
        ]}))
        .await?;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["updated"], 1);
    let indices: Vec<i64> = body["errors"].as_array().expect("errors").iter().filter_map(|e| e["index"].as_i64()).collect();
    assert_eq!(indices, vec![1, 2]);

    let (status, _, body) = t
        .json("PUT", "/api/domain/update", json!({"aksi": "updateStatus", "data": [{"id": 404, "status": "active"}]}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["updated"], 0);

    let (status, _, body) = t.json("PUT", "/api/domain/update", json!({"aksi": "updateStatus", "data": []})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No data provided");

    let (status, _, body) = t
        .json("PUT", "/api/domain/update", json!({"aksi": "updateStatus", "data": [{"id": a, "status": "draft"}, "oops"]}))
        .await?;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["errors"][0]["index"], 1);
    assert_eq!(body["errors"][0]["message"], "invalid data format");
    Ok(())
}

#[tokio::test]
async fn list_pages_newest_first_with_lenient_query() -> anyhow::Result<()> {
    let t = build_app();
    for i in 0..7 {
        t.create_domain(&format!("site{i}.example.com")).await?;
    }

    let (status, _, body) = t.get("/api/domain?page=abc&limit=").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("data").len(), 5);
    assert_eq!(body["data"][0]["name"], "site6.example.com");
    assert_eq!(body["meta"], json!({"total": 7, "page": 1, "limit": 5, "last_page": 2, "from": 1, "to": 5}));

    let (_, _, body) = t.get("/api/domain?page=2&limit=5").await?;
    assert_eq!(body["data"].as_array().expect("data").len(), 2);
    assert_eq!(body["meta"]["from"], 6);
    assert_eq!(body["meta"]["to"], 7);
    Ok(())
}

#[tokio::test]
async fn get_and_dashboard_report_missing_domains() -> anyhow::Result<()> {
    let t = build_app();
    let id = t.create_domain("example.com").await?;

    let (status, _, body) = t.get(&format!("/api/dashboard/{id}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Page ready to action"}));

    let (status, _, body) = t.get("/api/dashboard/9999").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Page not Found");

    let (status, _, _) = t.get("/api/domain/9999").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, body) = t.get("/api/domain/abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid ID format");
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> anyhow::Result<()> {
    let t = build_app();
    let req = Request::builder().method("POST").uri("/api/logout").header(header::COOKIE, "jwt=abc").body(Body::empty())?;
    let (status, headers, _) = t.send(req).await?;
    assert_eq!(status, StatusCode::OK);
    let set_cookie = headers.get(header::SET_COOKIE).expect("set-cookie").to_str()?;
    assert!(set_cookie.starts_with("jwt="));
    assert!(set_cookie.contains("Max-Age=0"));
    Ok(())
}
