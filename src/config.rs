use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub secret_key: String,
    pub jwt_algorithm: String,
    pub access_token_expire_hours: i64,
    pub redis_url: Option<String>,
    pub cache_ttl_settings: u64,
    pub cache_ttl_availability: u64,
    pub tenant_service_url: String,
    pub user_service_url: String,
    pub resource_service_url: String,
    pub booking_service_url: String,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub cors_allow_credentials: bool,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        let redis_url = env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty());

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env_or("PORT", "8000").parse().expect("PORT must be a number"),
            secret_key: env_or("SECRET_KEY", "dev-secret-change-me"),
            jwt_algorithm: env_or("JWT_ALGORITHM", "HS512"),
            access_token_expire_hours: env_or("ACCESS_TOKEN_EXPIRE_HOURS", "24")
                .parse()
                .expect("ACCESS_TOKEN_EXPIRE_HOURS must be a number"),
            redis_url,
            cache_ttl_settings: env_or("CACHE_TTL_SETTINGS", "300")
                .parse()
                .expect("CACHE_TTL_SETTINGS must be a number"),
            cache_ttl_availability: env_or("CACHE_TTL_AVAILABILITY", "300")
                .parse()
                .expect("CACHE_TTL_AVAILABILITY must be a number"),
            tenant_service_url: env_or("TENANT_SERVICE_URL", "http://localhost:8001"),
            user_service_url: env_or("USER_SERVICE_URL", "http://localhost:8002"),
            resource_service_url: env_or("RESOURCE_SERVICE_URL", "http://localhost:8003"),
            booking_service_url: env_or("BOOKING_SERVICE_URL", "http://localhost:8004"),
            environment: env_or("ENVIRONMENT", "development"),
            cors_origins: env_or("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            cors_allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", "false")
                .parse()
                .unwrap_or(false),
        }
    }
}
