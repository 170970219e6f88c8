use std::net::SocketAddr;
use std::sync::Arc;

use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, ServerState};
use server::startup::build_state;
use service::auth::repo::seaorm::SeaOrmUserRepository;
use service::cache::MemoryCacheMirror;
use service::domain::repo::seaorm::SeaOrmDomainRepository;
use service::upload::{ImagePipeline, LocalFileStore};

struct TestApp {
    base_url: String,
    state: ServerState,
    _dir: tempfile::TempDir,
}

async fn start_server() -> anyhow::Result<TestApp> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip e2e tests. Provide .env.test or env var.");
        return Err(anyhow::anyhow!("missing DATABASE_URL"));
    }

    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await { eprintln!("migrations notice: {}", e); }

    let dir = tempfile::tempdir()?;
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    let state = build_state(
        &cfg,
        Arc::new(SeaOrmDomainRepository { db: db.clone() }),
        Arc::new(SeaOrmUserRepository { db }),
        Arc::new(MemoryCacheMirror::new()),
        ImagePipeline::new(dir.path(), cfg.upload.max_file_size, Arc::new(LocalFileStore)),
    );

    let app = routes::build_router(state.clone(), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, state, _dir: dir })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_domain_then_login_uses_cookie_session() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let http = client();
    let admin = app.state.auth.issue_token(1)?;
    let suffix = Uuid::new_v4().simple().to_string();
    let domain_name = format!("e2e-{}.example.com", &suffix[..12]);

    let form = reqwest::multipart::Form::new()
        .text("name", domain_name.clone())
        .text("meta_title", "E2E")
        .text("modul", "blog");
    let res = http
        .post(format!("{}/api/domain/post", app.base_url))
        .bearer_auth(&admin)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    let id = body["data"]["id"].as_i64().expect("id");

    let email = format!("user_{}@example.com", &suffix[..12]);
    let res = http
        .post(format!("{}/api/register", app.base_url))
        .bearer_auth(&admin)
        .json(&json!({"first_name": "E2E", "email": email, "password": "secret1", "domains_id": [id]}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = http
        .post(format!("{}/api/login", app.base_url))
        .json(&json!({"email": email, "password": "secret1"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["user"]["domain"][0]["name"], domain_name);

    // the cookie store now carries the jwt
    let res = http.get(format!("{}/api/dashboard/{}", app.base_url, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}
