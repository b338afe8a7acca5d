use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use skald::application::ports::{FingerprintCache, JobStore, TranscriptionEngine};
use skald::application::services::{CancellationRegistry, JobScheduler, TranscriptionRunner};
use skald::infrastructure::auth::{RateLimiter, SignatureVerifier};
use skald::infrastructure::engine::{MockTranscriptionEngine, RemoteTranscriptionEngine};
use skald::infrastructure::observability::{TracingConfig, init_tracing};
use skald::infrastructure::persistence::{
    MemoryJobStore, PgJobStore, TtlFingerprintCache, create_pool,
};
use skald::presentation::{
    AppState, Environment, Settings, StorageProvider, WorkerProvider, create_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment)?;

    init_tracing(
        TracingConfig {
            environment: environment.to_string(),
            json_format: settings.logging.enable_json,
            service_level: settings.logging.level.clone(),
        },
        settings.server.port,
    );

    let store: Arc<dyn JobStore> = match settings.storage.provider {
        StorageProvider::Memory => Arc::new(MemoryJobStore::new()),
        StorageProvider::Postgres => {
            let database = settings
                .storage
                .database
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("postgres storage selected without database settings"))?;
            let pool = create_pool(&database.url, database.max_connections).await?;
            sqlx::migrate!().run(&pool).await?;
            Arc::new(PgJobStore::new(pool))
        }
    };

    let cache: Arc<dyn FingerprintCache> = Arc::new(TtlFingerprintCache::new(
        Duration::from_secs(settings.cache.ttl_hours * 3600),
    ));

    let engine: Arc<dyn TranscriptionEngine> = match settings.worker.provider {
        WorkerProvider::Mock => Arc::new(MockTranscriptionEngine::new()),
        WorkerProvider::Remote => {
            let endpoint = settings
                .worker
                .endpoint
                .clone()
                .ok_or_else(|| anyhow::anyhow!("remote worker selected without an endpoint"))?;
            Arc::new(RemoteTranscriptionEngine::new(
                endpoint,
                settings.auth.engine_secret.clone(),
                Duration::from_secs(settings.worker.timeout_secs),
            )?)
        }
    };

    let (sender, receiver) = mpsc::channel(settings.worker.queue_capacity);
    let cancellations = Arc::new(CancellationRegistry::new());

    let runner = TranscriptionRunner::new(
        receiver,
        Arc::clone(&store),
        Arc::clone(&cache),
        engine,
        Arc::clone(&cancellations),
    );
    tokio::spawn(runner.run());

    let scheduler = Arc::new(JobScheduler::new(
        Arc::clone(&store),
        cache,
        sender.clone(),
        cancellations,
        settings.worker.estimated_processing_secs,
    ));

    let credentials: HashMap<String, String> = settings.auth.credentials.clone();

    let state = AppState {
        scheduler,
        store,
        verifier: SignatureVerifier::new(settings.auth.max_skew_ms),
        limiter: Arc::new(RateLimiter::new(
            settings.rate_limit.capacity,
            settings.rate_limit.refill_per_sec,
        )),
        credentials: Arc::new(credentials),
        engine_secret: Arc::from(settings.auth.engine_secret.as_str()),
        queue_sender: sender,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Transcription service listening");

    axum::serve(listener, app).await?;

    Ok(())
}
