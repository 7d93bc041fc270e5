use crate::config::Config;
use crate::domain::ports::{
    BookingRepository, Cache, CategoryRepository, EventBus, EventStream, ReadinessProbe,
    ResourceRepository, TenantRepository, UserRepository, WebhookRepository,
};
use crate::domain::services::admission::AdmissionEngine;
use crate::domain::services::auth::AuthService;
use crate::domain::services::settings::CachedSettings;
use crate::infra::cache::{MemoryCache, RedisCache};
use crate::infra::events::{MemoryStreamFabric, RedisStreamFabric};
use crate::infra::http::{HttpBookingClient, HttpResourceClient, HttpTenantClient, HttpUserClient};
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_category_repo::PostgresCategoryRepo,
    postgres_resource_repo::PostgresResourceRepo, postgres_tenant_repo::PostgresTenantRepo,
    postgres_user_repo::PostgresUserRepo, postgres_webhook_repo::PostgresWebhookRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_category_repo::SqliteCategoryRepo,
    sqlite_resource_repo::SqliteResourceRepo, sqlite_tenant_repo::SqliteTenantRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_webhook_repo::SqliteWebhookRepo,
};
use crate::state::{BookingState, ResourceState, TenantState, UserState};
use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    ConnectOptions, PgPool, SqlitePool,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, log::LevelFilter, warn};

pub enum Db {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

pub async fn connect_database(database_url: &str) -> Db {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");
        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        sqlx::migrate!("./migrations/postgres")
            .run(&pool)
            .await
            .expect("Failed to run Postgres migrations");
        Db::Postgres(pool)
    } else {
        info!("Initializing SQLite connection with WAL mode...");
        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to run SQLite migrations");
        Db::Sqlite(pool)
    }
}

pub struct PgProbe(pub PgPool);

#[async_trait]
impl ReadinessProbe for PgProbe {
    async fn ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.0).await.is_ok()
    }
}

pub struct SqliteProbe(pub SqlitePool);

#[async_trait]
impl ReadinessProbe for SqliteProbe {
    async fn ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.0).await.is_ok()
    }
}

pub async fn connect_cache(config: &Config) -> Arc<dyn Cache> {
    if let Some(url) = &config.redis_url {
        match RedisCache::connect(url).await {
            Ok(cache) => return Arc::new(cache),
            Err(e) => warn!("Redis cache unavailable, using in-process cache: {}", e),
        }
    }
    Arc::new(MemoryCache::new())
}

pub struct Fabric {
    pub bus: Arc<dyn EventBus>,
    pub stream: Arc<dyn EventStream>,
}

pub async fn connect_fabric(config: &Config) -> Fabric {
    if let Some(url) = &config.redis_url {
        match RedisStreamFabric::connect(url).await {
            Ok(fabric) => {
                let fabric = Arc::new(fabric);
                return Fabric {
                    bus: fabric.clone(),
                    stream: fabric,
                };
            }
            Err(e) => warn!("Redis fabric unavailable, events stay process-local: {}", e),
        }
    }
    let fabric = Arc::new(MemoryStreamFabric::new());
    Fabric {
        bus: fabric.clone(),
        stream: fabric,
    }
}

pub async fn bootstrap_tenant_state(config: &Config) -> (Arc<TenantState>, Fabric) {
    let db = connect_database(&config.database_url).await;
    let cache = connect_cache(config).await;
    let fabric = connect_fabric(config).await;
    let auth_service = Arc::new(AuthService::new(config));

    let (tenant_repo, webhook_repo, probe): (
        Arc<dyn TenantRepository>,
        Arc<dyn WebhookRepository>,
        Arc<dyn ReadinessProbe>,
    ) = match db {
        Db::Postgres(pool) => (
            Arc::new(PostgresTenantRepo::new(pool.clone())),
            Arc::new(PostgresWebhookRepo::new(pool.clone())),
            Arc::new(PgProbe(pool)),
        ),
        Db::Sqlite(pool) => (
            Arc::new(SqliteTenantRepo::new(pool.clone())),
            Arc::new(SqliteWebhookRepo::new(pool.clone())),
            Arc::new(SqliteProbe(pool)),
        ),
    };

    let state = Arc::new(TenantState {
        config: config.clone(),
        tenant_repo,
        webhook_repo,
        cache,
        events: fabric.bus.clone(),
        auth_service,
        probe,
    });
    (state, fabric)
}

pub async fn bootstrap_user_state(config: &Config) -> (Arc<UserState>, Fabric) {
    let db = connect_database(&config.database_url).await;
    let fabric = connect_fabric(config).await;
    let auth_service = Arc::new(AuthService::new(config));

    let (user_repo, probe): (Arc<dyn UserRepository>, Arc<dyn ReadinessProbe>) = match db {
        Db::Postgres(pool) => (
            Arc::new(PostgresUserRepo::new(pool.clone())),
            Arc::new(PgProbe(pool)),
        ),
        Db::Sqlite(pool) => (
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteProbe(pool)),
        ),
    };

    let state = Arc::new(UserState {
        config: config.clone(),
        user_repo,
        tenants: Arc::new(HttpTenantClient::new(config.tenant_service_url.clone())),
        events: fabric.bus.clone(),
        auth_service,
        probe,
    });
    (state, fabric)
}

pub async fn bootstrap_resource_state(config: &Config) -> (Arc<ResourceState>, Fabric) {
    let db = connect_database(&config.database_url).await;
    let cache = connect_cache(config).await;
    let fabric = connect_fabric(config).await;
    let auth_service = Arc::new(AuthService::new(config));

    let (category_repo, resource_repo, probe): (
        Arc<dyn CategoryRepository>,
        Arc<dyn ResourceRepository>,
        Arc<dyn ReadinessProbe>,
    ) = match db {
        Db::Postgres(pool) => (
            Arc::new(PostgresCategoryRepo::new(pool.clone())),
            Arc::new(PostgresResourceRepo::new(pool.clone())),
            Arc::new(PgProbe(pool)),
        ),
        Db::Sqlite(pool) => (
            Arc::new(SqliteCategoryRepo::new(pool.clone())),
            Arc::new(SqliteResourceRepo::new(pool.clone())),
            Arc::new(SqliteProbe(pool)),
        ),
    };

    let settings_source = Arc::new(HttpTenantClient::new(config.tenant_service_url.clone()));
    let settings = Arc::new(CachedSettings::new(
        settings_source,
        cache.clone(),
        config.cache_ttl_settings,
    ));

    let state = Arc::new(ResourceState {
        config: config.clone(),
        category_repo,
        resource_repo,
        users: Arc::new(HttpUserClient::new(config.user_service_url.clone())),
        settings,
        bookings: Arc::new(HttpBookingClient::new(config.booking_service_url.clone())),
        cache,
        events: fabric.bus.clone(),
        auth_service,
        probe,
    });
    (state, fabric)
}

pub async fn bootstrap_booking_state(config: &Config) -> (Arc<BookingState>, Fabric) {
    let db = connect_database(&config.database_url).await;
    let cache = connect_cache(config).await;
    let fabric = connect_fabric(config).await;
    let auth_service = Arc::new(AuthService::new(config));

    let (booking_repo, probe): (Arc<dyn BookingRepository>, Arc<dyn ReadinessProbe>) = match db {
        Db::Postgres(pool) => (
            Arc::new(PostgresBookingRepo::new(pool.clone())),
            Arc::new(PgProbe(pool)),
        ),
        Db::Sqlite(pool) => (
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteProbe(pool)),
        ),
    };

    let settings_source = Arc::new(HttpTenantClient::new(config.tenant_service_url.clone()));
    let settings = Arc::new(CachedSettings::new(
        settings_source,
        cache,
        config.cache_ttl_settings,
    ));
    let users = Arc::new(HttpUserClient::new(config.user_service_url.clone()));

    let admission = Arc::new(AdmissionEngine::new(
        settings.clone(),
        Arc::new(HttpResourceClient::new(config.resource_service_url.clone())),
        users.clone(),
        booking_repo.clone(),
        fabric.bus.clone(),
    ));

    let state = Arc::new(BookingState {
        config: config.clone(),
        booking_repo,
        users,
        settings,
        admission,
        auth_service,
        probe,
    });
    (state, fabric)
}
