use crate::config::Config;
use crate::domain::ports::{
    BookingDirectory, BookingRepository, Cache, CategoryRepository, EventBus, ReadinessProbe,
    ResourceRepository, SettingsSource, TenantDirectory, TenantRepository, UserDirectory,
    UserRepository, WebhookRepository,
};
use crate::domain::services::{admission::AdmissionEngine, auth::AuthService};
use axum::extract::FromRef;
use std::sync::Arc;

/// One state struct per service: each binary wires only its own store plus
/// the ports it is allowed to talk through.

#[derive(Clone)]
pub struct TenantState {
    pub config: Config,
    pub tenant_repo: Arc<dyn TenantRepository>,
    pub webhook_repo: Arc<dyn WebhookRepository>,
    pub cache: Arc<dyn Cache>,
    pub events: Arc<dyn EventBus>,
    pub auth_service: Arc<AuthService>,
    pub probe: Arc<dyn ReadinessProbe>,
}

#[derive(Clone)]
pub struct UserState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub tenants: Arc<dyn TenantDirectory>,
    pub events: Arc<dyn EventBus>,
    pub auth_service: Arc<AuthService>,
    pub probe: Arc<dyn ReadinessProbe>,
}

#[derive(Clone)]
pub struct ResourceState {
    pub config: Config,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub resource_repo: Arc<dyn ResourceRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub settings: Arc<dyn SettingsSource>,
    pub bookings: Arc<dyn BookingDirectory>,
    pub cache: Arc<dyn Cache>,
    pub events: Arc<dyn EventBus>,
    pub auth_service: Arc<AuthService>,
    pub probe: Arc<dyn ReadinessProbe>,
}

#[derive(Clone)]
pub struct BookingState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub settings: Arc<dyn SettingsSource>,
    pub admission: Arc<AdmissionEngine>,
    pub auth_service: Arc<AuthService>,
    pub probe: Arc<dyn ReadinessProbe>,
}

// The bearer extractor only needs the auth service; this newtype lets it
// work against every service router without running afoul of the orphan
// rules (both `Arc` and `FromRef` are foreign to this crate).
#[derive(Clone)]
pub struct AuthServiceRef(pub Arc<AuthService>);

impl FromRef<Arc<TenantState>> for AuthServiceRef {
    fn from_ref(state: &Arc<TenantState>) -> Self {
        AuthServiceRef(state.auth_service.clone())
    }
}

impl FromRef<Arc<UserState>> for AuthServiceRef {
    fn from_ref(state: &Arc<UserState>) -> Self {
        AuthServiceRef(state.auth_service.clone())
    }
}

impl FromRef<Arc<ResourceState>> for AuthServiceRef {
    fn from_ref(state: &Arc<ResourceState>) -> Self {
        AuthServiceRef(state.auth_service.clone())
    }
}

impl FromRef<Arc<BookingState>> for AuthServiceRef {
    fn from_ref(state: &Arc<BookingState>) -> Self {
        AuthServiceRef(state.auth_service.clone())
    }
}
