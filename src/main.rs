//! paywall-core server binary.
//!
//! Wires configuration, stores and handlers together and serves the HTTP API
//! until interrupted. Without a database or Redis URL every store runs in
//! memory, which suits a single development process.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paywall_core::adapters::circuit_breaker::InMemoryCircuitBreaker;
use paywall_core::adapters::gateway::{HttpGatewayClient, HttpGatewayConfig, SimulatedGatewayClient};
use paywall_core::adapters::http::{router, AppState};
use paywall_core::adapters::memory::{
    InMemorySubscriptionLookup, InMemoryTransactionRepository, InMemoryWebhookEventRepository,
};
use paywall_core::adapters::postgres::{
    PostgresSubscriptionLookup, PostgresTransactionRepository, PostgresWebhookEventRepository,
};
use paywall_core::adapters::rate_limiter::FixedWindowRateLimiter;
use paywall_core::adapters::usage::DailyUsageAccountant;
use paywall_core::adapters::{
    AcceptAllVerifier, HmacWebhookVerifier, InMemoryCacheStore, PrometheusMetrics,
    RedisCacheStore, SystemClock, WebhookReplayer, WebhookWorkerPool,
};
use paywall_core::application::handlers::{
    GetTransactionHandler, IngestWebhookHandler, PaywallDecisionEngine, ProcessPaymentHandler,
    ProcessWebhookEventHandler,
};
use paywall_core::config::{AppConfig, DatabaseConfig};
use paywall_core::ports::{
    CacheStore, Clock, GatewayClient, PaywallMetrics, SubscriptionLookup, TransactionRepository,
    WebhookDispatcher, WebhookEventRepository, WebhookVerifier,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

struct Stores {
    transactions: Arc<dyn TransactionRepository>,
    events: Arc<dyn WebhookEventRepository>,
    subscriptions: Arc<dyn SubscriptionLookup>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting paywall-core"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let prometheus = Arc::new(PrometheusMetrics::new()?);
    let metrics: Arc<dyn PaywallMetrics> = prometheus.clone();

    let cache = connect_cache(&config, clock.clone()).await?;
    let stores = connect_stores(&config.database).await?;
    let gateway = build_gateway(&config)?;

    let breaker = Arc::new(
        InMemoryCircuitBreaker::new(
            "payment_gateway",
            config.payment.circuit_breaker.to_breaker_config(),
            clock.clone(),
        )
        .with_metrics(metrics.clone()),
    );

    let process_payment = ProcessPaymentHandler::new(
        gateway,
        breaker,
        stores.transactions.clone(),
        clock.clone(),
        metrics.clone(),
    )
    .with_gateway_timeout(config.payment.gateway_timeout());
    let get_transaction = GetTransactionHandler::new(stores.transactions.clone(), cache.clone());

    // Webhook reactions run on the pool; ingestion and replay both feed it.
    let process_event = ProcessWebhookEventHandler::new(
        stores.events.clone(),
        stores.transactions.clone(),
        clock.clone(),
        metrics.clone(),
    )
    .with_policy(config.webhook.failure_policy)
    .with_transaction_cache(cache.clone());
    let pool = Arc::new(WebhookWorkerPool::start(
        Arc::new(process_event),
        config.webhook.worker_pool(),
        metrics.clone(),
    ));
    let dispatcher: Arc<dyn WebhookDispatcher> = pool.clone();

    let ingest_webhook = IngestWebhookHandler::new(
        build_verifier(&config, clock.clone()),
        stores.events.clone(),
        dispatcher.clone(),
        clock.clone(),
        metrics.clone(),
    );

    let rate_limiter = Arc::new(FixedWindowRateLimiter::new(
        cache.clone(),
        config.paywall.rate_limit(),
        clock.clone(),
    ));
    let usage = Arc::new(DailyUsageAccountant::new(
        cache.clone(),
        config.paywall.usage(),
        clock.clone(),
    ));
    let paywall = PaywallDecisionEngine::new(
        stores.subscriptions.clone(),
        rate_limiter,
        usage,
        cache.clone(),
        clock.clone(),
        metrics.clone(),
    )
    .with_access_cache_ttl(config.paywall.access_cache_ttl());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let replayer = WebhookReplayer::new(
        stores.events.clone(),
        dispatcher,
        clock.clone(),
        config.webhook.replayer(),
    );
    let replay_task = tokio::spawn(async move { replayer.run(shutdown_rx).await });

    let state = AppState {
        process_payment: Arc::new(process_payment),
        get_transaction: Arc::new(get_transaction),
        ingest_webhook: Arc::new(ingest_webhook),
        paywall: Arc::new(paywall),
        prometheus: Some(prometheus),
        request_timeout: config.server.request_timeout(),
    };

    let addr = config.server.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped, draining webhook queue");
    let _ = shutdown_tx.send(true);
    if let Err(e) = replay_task.await {
        tracing::error!(error = %e, "Webhook replayer task failed");
    }
    pool.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

async fn connect_cache(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn CacheStore>, BoxError> {
    match &config.redis.url {
        Some(url) => {
            let store = RedisCacheStore::connect(url).await?;
            store.health_check().await?;
            tracing::info!("Using Redis cache");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No Redis URL configured, using in-memory cache");
            Ok(Arc::new(InMemoryCacheStore::new(clock)))
        }
    }
}

async fn connect_stores(config: &DatabaseConfig) -> Result<Stores, BoxError> {
    let Some(url) = config.postgres_url() else {
        tracing::warn!("No database URL configured, using in-memory stores");
        return Ok(Stores {
            transactions: Arc::new(InMemoryTransactionRepository::new()),
            events: Arc::new(InMemoryWebhookEventRepository::new()),
            subscriptions: Arc::new(InMemorySubscriptionLookup::new()),
        });
    };

    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(Stores {
        transactions: Arc::new(PostgresTransactionRepository::new(pool.clone())),
        events: Arc::new(PostgresWebhookEventRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionLookup::new(pool)),
    })
}

fn build_gateway(config: &AppConfig) -> Result<Arc<dyn GatewayClient>, BoxError> {
    let payment = &config.payment;
    match (&payment.gateway_url, &payment.api_key) {
        (Some(base_url), Some(api_key)) => {
            let client = HttpGatewayClient::new(HttpGatewayConfig {
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                timeout: payment.gateway_timeout(),
            })?;
            tracing::info!(gateway = %base_url, "Using HTTP payment gateway");
            Ok(Arc::new(client))
        }
        _ => {
            tracing::warn!(
                failure_percent = payment.simulated_failure_percent,
                "No gateway configured, using simulated gateway"
            );
            Ok(Arc::new(SimulatedGatewayClient::new(
                payment.simulated_latency(),
                payment.simulated_failure_percent,
            )))
        }
    }
}

fn build_verifier(config: &AppConfig, clock: Arc<dyn Clock>) -> Arc<dyn WebhookVerifier> {
    match config.payment.webhook_secret() {
        Some(secret) => Arc::new(
            HmacWebhookVerifier::new(secret.clone(), clock)
                .with_tolerance(config.webhook.signature_tolerance()),
        ),
        None => {
            tracing::warn!("No webhook secret configured, accepting unsigned webhooks");
            Arc::new(AcceptAllVerifier)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
