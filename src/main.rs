mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{ClassifierConfig, Config, StoreBackend};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::appeals::{routes as appeals_routes, AppealService};
use crate::features::auth::JwtValidator;
use crate::features::moderation::classifiers::ClassifierAdapter;
use crate::features::moderation::{routes as moderation_routes, ModerationService};
use crate::features::notifications::{routes as notifications_routes, NotificationService};
use crate::features::review_queue::{routes as review_queue_routes, ReviewQueueService};
use crate::features::safety_metrics::{routes as safety_metrics_routes, SafetyMetricsService};
use crate::modules::classifier::{
    ClassifierClient, DisabledClassifierClient, TensorZeroClassifierClient,
};
use crate::modules::store::{InMemoryModerationStore, ModerationStore, PgModerationStore};
use crate::shared::keyed_locks::KeyedLocks;
use crate::shared::prompts::PromptEngine;
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

/// Pick the classifier backend; without a gateway every call takes the fallback path
fn build_classifier_client(config: &ClassifierConfig) -> Arc<dyn ClassifierClient> {
    let Some(url) = config.tensorzero_url.as_deref() else {
        tracing::warn!(
            "TENSORZERO_URL not set. Classifier disabled, submissions use the fallback policy."
        );
        return Arc::new(DisabledClassifierClient);
    };

    match TensorZeroClassifierClient::new(url, config) {
        Ok(client) => {
            tracing::info!(
                "Classifier client initialized (TensorZero: {}, model: {})",
                url,
                config.model_name
            );
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(
                "Classifier not available: {}. Submissions use the fallback policy.",
                e
            );
            Arc::new(DisabledClassifierClient)
        }
    }
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Moderation store
    let store: Arc<dyn ModerationStore> = match (config.moderation.store_backend, &config.database)
    {
        (StoreBackend::Postgres, Some(database_config)) => {
            let pool = database::connect_and_migrate(database_config).await?;
            Arc::new(PgModerationStore::new(pool))
        }
        (StoreBackend::Postgres, None) => {
            return Err(anyhow::anyhow!(
                "STORE_BACKEND=postgres requires DATABASE_URL"
            ));
        }
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using in-memory moderation store; state is lost on restart");
            Arc::new(InMemoryModerationStore::new())
        }
    };

    // Initialize auth
    let jwt_validator = Arc::new(JwtValidator::new(&config.auth));
    tracing::info!("Auth configuration initialized");

    // Classifier adapter
    let classifier_client = build_classifier_client(&config.classifier);
    let prompt_engine = Arc::new(PromptEngine::new(
        config.moderation.prompt_template_dir.as_deref(),
    ));
    let classifier_adapter = Arc::new(ClassifierAdapter::new(
        classifier_client,
        prompt_engine,
        &config.classifier,
    ));

    // Moderation services share one lock table so content and user locks
    // are ordered the same way everywhere
    let locks = Arc::new(KeyedLocks::new());
    let notification_service = Arc::new(NotificationService::new(
        config.moderation.notification_buffer,
    ));
    let safety_metrics_service = Arc::new(SafetyMetricsService::new(
        Arc::clone(&store),
        Arc::clone(&locks),
    ));
    let review_queue_service = Arc::new(ReviewQueueService::new(
        Arc::clone(&store),
        Arc::clone(&locks),
        Arc::clone(&notification_service),
        Arc::clone(&safety_metrics_service),
    ));
    let moderation_service = Arc::new(ModerationService::new(
        Arc::clone(&store),
        classifier_adapter,
        Arc::clone(&review_queue_service),
        Arc::clone(&safety_metrics_service),
        locks,
        &config.moderation,
    ));
    let appeal_service = Arc::new(AppealService::new(Arc::clone(&store)));
    tracing::info!(
        "Moderation services initialized (fail_closed_all={}, fail_closed_mode={:?})",
        config.moderation.fail_closed_all,
        config.moderation.fail_closed_mode
    );

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(moderation_routes::routes(moderation_service))
        .merge(review_queue_routes::routes(review_queue_service))
        .merge(notifications_routes::routes(notification_service))
        .merge(safety_metrics_routes::routes(safety_metrics_service))
        .merge(appeals_routes::routes(appeal_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    // SSE subscribers hold connections open; keep idle peers detectable
    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
