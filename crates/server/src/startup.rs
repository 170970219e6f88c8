use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::{env::ensure_env, utils::logging::init_logging_from_env};
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use axum::http::{header, HeaderValue, Method};
use service::{
    auth::{
        repo::seaorm::SeaOrmUserRepository,
        repository::UserRepository,
        service::{AuthConfig, AuthService},
        SessionSynchronizer,
    },
    cache::{CacheMirror, MemoryCacheMirror, RedisCacheMirror},
    domain::{repo::seaorm::SeaOrmDomainRepository, repository::DomainRepository, DomainService, DomainSynchronizer},
    upload::ImagePipeline,
};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

/// Wire services over the given stores. The session entry lives as long as
/// the token it belongs to.
pub fn build_state(
    cfg: &AppConfig,
    domains: Arc<dyn DomainRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheMirror>,
    uploads: ImagePipeline,
) -> ServerState {
    let ttl_hours = cfg.auth.token_ttl_hours;
    let mut sessions = SessionSynchronizer::new(cache.clone())
        .with_ttl(Some(Duration::from_secs(ttl_hours.max(0) as u64 * 3600)));
    if cfg.auth.domain_db_fallback {
        sessions = sessions.with_db_fallback(DomainSynchronizer::new(domains.clone(), cache.clone()));
    }

    let auth = AuthService::<dyn UserRepository>::new(users, sessions, AuthConfig::from(&cfg.auth));
    let body_limit = ServerState::upload_body_limit(cfg.upload.max_file_size);
    ServerState {
        auth: Arc::new(auth),
        domains: Arc::new(DomainService::new(domains, cache, uploads)),
        cookie_name: cfg.auth.cookie_name.clone(),
        token_ttl_hours: ttl_hours,
        body_limit,
    }
}

pub fn build_cors(cfg: &configs::CorsConfig) -> CorsLayer {
    if cfg.development {
        return CorsLayer::very_permissive();
    }
    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

/// Redis when configured (and reachable), otherwise the in-process cache.
async fn build_cache(cfg: &configs::RedisConfig) -> Result<Arc<dyn CacheMirror>, StartupError> {
    if !cfg.enabled() {
        info!("redis not configured; using in-process cache mirror");
        return Ok(Arc::new(MemoryCacheMirror::new()));
    }
    let redis = RedisCacheMirror::from_config(cfg).map_err(|e| StartupError::Cache(e.to_string()))?;
    redis.ping().await.map_err(|e| StartupError::Cache(e.to_string()))?;
    info!(pool_size = cfg.pool_size, "redis cache mirror connected");
    Ok(Arc::new(redis))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl_c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env()?;
    ensure_env(&cfg.upload.image_dir).await?;

    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from(&cfg.database)).await?;
    migration::Migrator::up(&db, None).await?;
    info!("migrations applied");

    let cache = build_cache(&cfg.redis).await?;
    let state = build_state(
        &cfg,
        Arc::new(SeaOrmDomainRepository { db: db.clone() }),
        Arc::new(SeaOrmUserRepository { db }),
        cache,
        ImagePipeline::from_config(&cfg.upload),
    );

    let app: Router = routes::build_router(state, build_cors(&cfg.cors));

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
