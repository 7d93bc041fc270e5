#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{DateTime, Datelike, Utc};
use reserva_backend::api::router::{booking_router, resource_router, tenant_router, user_router};
use reserva_backend::config::Config;
use reserva_backend::consumers::booking::BookingCascadeHandler;
use reserva_backend::consumers::groups;
use reserva_backend::consumers::resource::{AvailabilityInvalidationHandler, ResourceCascadeHandler};
use reserva_backend::consumers::user::UserCascadeHandler;
use reserva_backend::domain::models::event::streams;
use reserva_backend::domain::ports::{
    BookingDirectory, BookingRepository, BookingWindow, ResourceDirectory, ResourceRepository,
    ResourceSummary, TenantDirectory, TenantRepository, UserDirectory, UserRepository, UserSummary,
};
use reserva_backend::domain::services::admission::AdmissionEngine;
use reserva_backend::domain::services::auth::AuthService;
use reserva_backend::domain::services::settings::{CachedSettings, RepoSettingsSource};
use reserva_backend::error::AppError;
use reserva_backend::infra::cache::MemoryCache;
use reserva_backend::infra::events::{EventConsumer, MemoryStreamFabric};
use reserva_backend::infra::factory::SqliteProbe;
use reserva_backend::infra::repositories::{
    sqlite_booking_repo::SqliteBookingRepo, sqlite_category_repo::SqliteCategoryRepo,
    sqlite_resource_repo::SqliteResourceRepo, sqlite_tenant_repo::SqliteTenantRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_webhook_repo::SqliteWebhookRepo,
};
use reserva_backend::state::{BookingState, ResourceState, TenantState, UserState};
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// In-process adapters standing in for the HTTP directory clients: the tests
/// run all four services over one SQLite file and one in-memory fabric.
struct LocalTenantDirectory(Arc<dyn TenantRepository>);

#[async_trait]
impl TenantDirectory for LocalTenantDirectory {
    async fn exists(&self, tenant_id: &str) -> Result<bool, AppError> {
        Ok(self.0.find_by_id(tenant_id).await?.is_some())
    }
}

struct LocalResourceDirectory(Arc<dyn ResourceRepository>);

#[async_trait]
impl ResourceDirectory for LocalResourceDirectory {
    async fn fetch(&self, resource_id: &str) -> Result<Option<ResourceSummary>, AppError> {
        Ok(self.0.find_by_id(resource_id).await?.map(|r| ResourceSummary {
            id: r.id,
            tenant_id: r.tenant_id,
            status: r.status,
            availability_schedule: r.availability_schedule,
        }))
    }
}

struct LocalUserDirectory(Arc<dyn UserRepository>);

#[async_trait]
impl UserDirectory for LocalUserDirectory {
    async fn fetch(&self, user_id: &str) -> Result<Option<UserSummary>, AppError> {
        Ok(self.0.find_by_id(user_id).await?.map(|u| UserSummary {
            id: u.id,
            tenant_id: u.tenant_id,
            user_type: u.user_type,
            is_active: u.is_active,
            can_book: u.can_book,
            can_manage_resources: u.can_manage_resources,
            can_view_all_bookings: u.can_view_all_bookings,
        }))
    }
}

struct LocalBookingDirectory(Arc<dyn BookingRepository>);

#[async_trait]
impl BookingDirectory for LocalBookingDirectory {
    async fn active_in_window(
        &self,
        _tenant_id: &str,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BookingWindow>, AppError> {
        let conflicts = self.0.find_conflicts(resource_id, start, end, None).await?;
        Ok(conflicts
            .into_iter()
            .map(|c| BookingWindow {
                start_time: c.start_time,
                end_time: c.end_time,
            })
            .collect())
    }
}

pub struct TestApp {
    pub tenant_router: Router,
    pub user_router: Router,
    pub resource_router: Router,
    pub booking_router: Router,
    pub fabric: Arc<MemoryStreamFabric>,
    pub cache: Arc<MemoryCache>,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    consumers: Vec<EventConsumer>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url,
            port: 0,
            secret_key: "test-secret".to_string(),
            jwt_algorithm: "HS512".to_string(),
            access_token_expire_hours: 24,
            redis_url: None,
            cache_ttl_settings: 300,
            cache_ttl_availability: 300,
            tenant_service_url: "http://localhost:8001".to_string(),
            user_service_url: "http://localhost:8002".to_string(),
            resource_service_url: "http://localhost:8003".to_string(),
            booking_service_url: "http://localhost:8004".to_string(),
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            cors_allow_credentials: false,
        };

        let cache = Arc::new(MemoryCache::new());
        let fabric = Arc::new(MemoryStreamFabric::new());
        let auth_service = Arc::new(AuthService::new(&config));
        let probe = Arc::new(SqliteProbe(pool.clone()));

        let tenant_repo: Arc<dyn TenantRepository> = Arc::new(SqliteTenantRepo::new(pool.clone()));
        let webhook_repo = Arc::new(SqliteWebhookRepo::new(pool.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepo::new(pool.clone()));
        let category_repo = Arc::new(SqliteCategoryRepo::new(pool.clone()));
        let resource_repo: Arc<dyn ResourceRepository> = Arc::new(SqliteResourceRepo::new(pool.clone()));
        let booking_repo: Arc<dyn BookingRepository> = Arc::new(SqliteBookingRepo::new(pool.clone()));

        let settings = Arc::new(CachedSettings::new(
            Arc::new(RepoSettingsSource::new(tenant_repo.clone())),
            cache.clone(),
            config.cache_ttl_settings,
        ));

        let tenant_state = Arc::new(TenantState {
            config: config.clone(),
            tenant_repo: tenant_repo.clone(),
            webhook_repo: webhook_repo.clone(),
            cache: cache.clone(),
            events: fabric.clone(),
            auth_service: auth_service.clone(),
            probe: probe.clone(),
        });

        let user_state = Arc::new(UserState {
            config: config.clone(),
            user_repo: user_repo.clone(),
            tenants: Arc::new(LocalTenantDirectory(tenant_repo.clone())),
            events: fabric.clone(),
            auth_service: auth_service.clone(),
            probe: probe.clone(),
        });

        let resource_state = Arc::new(ResourceState {
            config: config.clone(),
            category_repo: category_repo.clone(),
            resource_repo: resource_repo.clone(),
            users: Arc::new(LocalUserDirectory(user_repo.clone())),
            settings: settings.clone(),
            bookings: Arc::new(LocalBookingDirectory(booking_repo.clone())),
            cache: cache.clone(),
            events: fabric.clone(),
            auth_service: auth_service.clone(),
            probe: probe.clone(),
        });

        let admission = Arc::new(AdmissionEngine::new(
            settings.clone(),
            Arc::new(LocalResourceDirectory(resource_repo.clone())),
            Arc::new(LocalUserDirectory(user_repo.clone())),
            booking_repo.clone(),
            fabric.clone(),
        ));

        let booking_state = Arc::new(BookingState {
            config: config.clone(),
            booking_repo: booking_repo.clone(),
            users: Arc::new(LocalUserDirectory(user_repo.clone())),
            settings,
            admission,
            auth_service,
            probe,
        });

        let consumers = vec![
            EventConsumer::new(
                fabric.clone(),
                Arc::new(BookingCascadeHandler::new(booking_repo.clone(), fabric.clone())),
                streams::DELETION_EVENTS,
                groups::BOOKING_SERVICE,
                "worker-1",
            ),
            EventConsumer::new(
                fabric.clone(),
                Arc::new(ResourceCascadeHandler::new(
                    category_repo.clone(),
                    resource_repo.clone(),
                    cache.clone(),
                )),
                streams::DELETION_EVENTS,
                groups::RESOURCE_SERVICE,
                "worker-1",
            ),
            EventConsumer::new(
                fabric.clone(),
                Arc::new(AvailabilityInvalidationHandler::new(cache.clone())),
                streams::BOOKING_EVENTS,
                groups::RESOURCE_SERVICE,
                "worker-1",
            ),
            EventConsumer::new(
                fabric.clone(),
                Arc::new(UserCascadeHandler::new(user_repo.clone())),
                streams::DELETION_EVENTS,
                groups::USER_SERVICE,
                "worker-1",
            ),
        ];

        Self {
            tenant_router: tenant_router(tenant_state),
            user_router: user_router(user_state),
            resource_router: resource_router(resource_state),
            booking_router: booking_router(booking_state),
            fabric,
            cache,
            pool,
            db_filename,
            consumers,
        }
    }

    /// Runs every consumer group until the streams stop producing work, the
    /// test-time equivalent of the event-processing grace window.
    pub async fn drain_events(&self) {
        loop {
            let mut handled = 0;
            for consumer in &self.consumers {
                handled += consumer.drain_once().await.expect("consumer drain failed");
            }
            if handled == 0 {
                break;
            }
        }
    }

    pub async fn request(
        &self,
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        router.clone().oneshot(request).await.unwrap()
    }

    /// Creates a tenant (Sao Paulo timezone) and returns its id.
    pub async fn create_tenant(&self, name: &str, domain: &str) -> String {
        let response = self
            .request(
                &self.tenant_router,
                "POST",
                "/tenants/",
                None,
                Some(serde_json::json!({
                    "name": name,
                    "domain": domain,
                    "timezone": "America/Sao_Paulo"
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "tenant creation failed");
        parse_body(response).await["id"].as_str().unwrap().to_string()
    }

    /// Signs up an admin for the tenant and logs in. Returns (user_id, token).
    pub async fn signup_admin(&self, tenant_id: &str) -> (String, String) {
        let email = format!("admin-{}@example.com", &Uuid::new_v4().to_string()[..8]);
        let response = self
            .request(
                &self.user_router,
                "POST",
                "/users/",
                None,
                Some(serde_json::json!({
                    "tenant_id": tenant_id,
                    "name": "Admin",
                    "email": email,
                    "user_type": "admin",
                    "password": "senha-secreta"
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "admin signup failed");
        let user_id = parse_body(response).await["id"].as_str().unwrap().to_string();

        let token = self.login(&email, "senha-secreta").await;
        (user_id, token)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/users/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("email={}&password={}", email, password)))
            .unwrap();
        let response = self.user_router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200, "login failed");
        parse_body(response).await["access_token"].as_str().unwrap().to_string()
    }

    /// Category plus a resource open every day 08:00-18:00 local.
    pub async fn create_resource(&self, token: &str) -> String {
        let response = self
            .request(
                &self.resource_router,
                "POST",
                "/categories/",
                Some(token),
                Some(serde_json::json!({ "name": "Salas", "category_type": "fisico" })),
            )
            .await;
        assert_eq!(response.status(), 201, "category creation failed");
        let category_id = parse_body(response).await["id"].as_str().unwrap().to_string();

        let all_day = ["08:00-18:00"];
        let response = self
            .request(
                &self.resource_router,
                "POST",
                "/resources/",
                Some(token),
                Some(serde_json::json!({
                    "category_id": category_id,
                    "name": "Sala 1",
                    "availability_schedule": {
                        "monday": all_day, "tuesday": all_day, "wednesday": all_day,
                        "thursday": all_day, "friday": all_day, "saturday": all_day,
                        "sunday": all_day
                    }
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "resource creation failed");
        parse_body(response).await["id"].as_str().unwrap().to_string()
    }

    pub async fn create_booking(
        &self,
        token: &str,
        resource_id: &str,
        start: &str,
        end: &str,
    ) -> Response<Body> {
        self.request(
            &self.booking_router,
            "POST",
            "/bookings/",
            Some(token),
            Some(serde_json::json!({
                "resource_id": resource_id,
                "start_time": start,
                "end_time": end
            })),
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-shm", &self.db_filename));
        let _ = std::fs::remove_file(format!("{}-wal", &self.db_filename));
    }
}

pub async fn parse_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// A UTC instant `days` ahead at the given UTC hour/minute, as RFC 3339.
/// Sao Paulo sits at UTC-3 year-round, so 14:00Z is 11:00 local.
pub fn future_instant(days: i64, hour: u32, minute: u32) -> String {
    let date = (Utc::now() + chrono::Duration::days(days)).date_naive();
    format!("{}T{:02}:{:02}:00Z", date, hour, minute)
}

/// The next Monday at least `min_days` ahead, as a date string.
pub fn future_monday(min_days: i64) -> chrono::NaiveDate {
    let mut date = (Utc::now() + chrono::Duration::days(min_days)).date_naive();
    while date.weekday() != chrono::Weekday::Mon {
        date = date.succ_opt().unwrap();
    }
    date
}
