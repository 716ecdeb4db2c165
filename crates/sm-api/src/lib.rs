use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, State, connect_info::ConnectInfo},
    http::{
        Method, Request,
        header::{CONTENT_TYPE, HeaderName, HeaderValue},
    },
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use clap::Parser;
use dotenvy::dotenv;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware,
    state::keyed::DashMapStateStore,
};
use sm_common::db::{PgStore, create_pool_from_url_checked, run_migrations};
use sm_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use sm_common::matching::{MatchingConfig, MatchingEngine};
use sm_common::store::{MemoryStore, Store};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod error;
pub mod handlers;

use error::ApiError;
use handlers::{candidates, employer, health, matches, postings, statistics};

const SHUTDOWN_DRAIN_GRACE: Duration = Duration::from_millis(200);
const BODY_LIMIT_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "sm-api", about = "Admin HTTP API for the Suryamitra matching service")]
struct Cli {
    /// PostgreSQL connection string. Without it the API runs on an in-memory store.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Comma separated list of allowed CORS origins, or `*`
    #[arg(long, env = "SM_CORS_ORIGINS", default_value = "http://localhost:3000")]
    cors_origins: String,

    /// JSON file with `candidates` and `job_postings` for the in-memory store
    #[arg(long, env = "SM_SEED_PATH")]
    seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub seed_path: Option<PathBuf>,
}

impl AppConfig {
    fn from_cli(cli: Cli) -> Result<Self, ApiError> {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        if let Some(bad) = cors_origins
            .iter()
            .find(|origin| *origin != "*" && origin.parse::<HeaderValue>().is_err())
        {
            return Err(ApiError::Config(format!(
                "SM_CORS_ORIGINS contains an invalid origin: {bad}"
            )));
        }

        let database_url = cli
            .database_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if database_url.is_some() && cli.seed_path.is_some() {
            warn!("SM_SEED_PATH is ignored when DATABASE_URL is set");
        }

        Ok(Self {
            database_url,
            port: cli.port,
            cors_origins,
            seed_path: cli.seed_path,
        })
    }

    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            port: 3001,
            cors_origins: vec!["http://localhost:3000".into()],
            seed_path: None,
        }
    }
}

type IpRateLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock, NoOpMiddleware>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_sec: u64,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_sec: 20,
            burst: 40,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Missing, unparsable and zero values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            per_sec: lookup("SM_RATE_LIMIT_PER_SEC")
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.per_sec),
            burst: lookup("SM_RATE_LIMIT_BURST")
                .and_then(|value| value.trim().parse::<u32>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.burst),
        }
    }

    fn build_limiter(self) -> Arc<IpRateLimiter> {
        let nanos_per_token = 1_000_000_000u64 / self.per_sec.max(1);
        let burst = NonZeroU32::new(self.burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(Duration::from_nanos(nanos_per_token.max(1)))
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        Arc::new(RateLimiter::keyed(quota))
    }
}

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub engine: Arc<MatchingEngine>,
    pub config: AppConfig,
    rate_limiter: Arc<IpRateLimiter>,
    pub readiness: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        engine: MatchingEngine,
        config: AppConfig,
        rate_limits: RateLimitConfig,
    ) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
            config,
            rate_limiter: rate_limits.build_limiter(),
            readiness: Arc::new(AtomicBool::new(true)),
        }
    }
}

pub type SharedState = Arc<AppState>;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn request_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

/// Requests without connection info (in-process tests) are not limited.
async fn rate_limit(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(client_ip) = request_ip(&req) {
        if state.rate_limiter.check_key(&client_ip).is_err() {
            return Err(ApiError::TooManyRequests(format!("rate limit exceeded for {client_ip}")));
        }
    }

    Ok(next.run(req).await)
}

async fn attach_request_id_context(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    error::with_request_id(request_id, next.run(req)).await
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_header = request_id_header.clone();

    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(&trace_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    let api_routes = Router::new()
        .route("/candidates", get(candidates::list_candidates))
        .route("/candidates/:id", get(candidates::get_candidate))
        .route("/candidates/:id/placement", post(candidates::place_candidate))
        .route(
            "/postings",
            get(postings::list_postings).post(postings::create_posting),
        )
        .route(
            "/postings/:id",
            get(postings::get_posting).put(postings::update_posting),
        )
        .route("/postings/:id/status", patch(postings::update_status))
        .route("/postings/:id/matches", get(matches::posting_matches))
        .route("/statistics", get(statistics::statistics))
        .route("/employer/dashboard", get(employer::dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(health::readyz))
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(attach_request_id_context))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(
            request_id_header,
            MakeRequestUuid,
        ))
        .layer(cors)
        .with_state(state)
}

/// State over the given store with default engine settings.
pub fn test_state_with(store: Arc<dyn Store>) -> SharedState {
    Arc::new(AppState::new(
        store,
        MatchingEngine::default(),
        AppConfig::for_tests(),
        RateLimitConfig::default(),
    ))
}

/// State over an empty in-memory store.
pub fn test_state() -> SharedState {
    test_state_with(Arc::new(MemoryStore::new()))
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, ApiError> {
    if let Some(url) = &config.database_url {
        let pool = create_pool_from_url_checked(url).await?;
        run_migrations(&pool).await?;
        info!("using postgres store");
        return Ok(Arc::new(PgStore::new(pool)));
    }

    match &config.seed_path {
        Some(path) => {
            let store = MemoryStore::from_seed_file(path).await?;
            info!(path = %path.display(), "using seeded in-memory store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set; using an empty in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;
    let engine = MatchingEngine::new(MatchingConfig::from_env()?);
    let store = open_store(&config).await?;

    let state = Arc::new(AppState::new(
        store,
        engine,
        config.clone(),
        RateLimitConfig::from_env(),
    ));

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state.clone());

    info!(%addr, persistent = config.database_url.is_some(), "sm-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let service = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown requested; marking not ready");
    state.readiness.store(false, Ordering::SeqCst);

    // Load balancers get a short window to see /readyz fail before
    // new connections are refused.
    tokio::time::sleep(SHUTDOWN_DRAIN_GRACE).await;
}
