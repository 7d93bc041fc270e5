use crate::config::Config;
use crate::domain::models::user::User;
use crate::error::AppError;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Bearer-token claims. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub tenant_id: String,
    pub user_type: String,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.user_type == crate::domain::models::user::user_type::ADMIN
    }
}

pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    expire_hours: i64,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        let algorithm = Algorithm::from_str(&config.jwt_algorithm).unwrap_or(Algorithm::HS512);
        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            algorithm,
            expire_hours: config.access_token_expire_hours,
        }
    }

    pub fn mint(&self, user: &User) -> Result<String, AppError> {
        let exp = (Utc::now() + Duration::hours(self.expire_hours)).timestamp() as usize;
        let claims = Claims {
            sub: user.id.clone(),
            tenant_id: user.tenant_id.clone(),
            user_type: user.user_type.clone(),
            exp,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("JWT encoding failed: {}", e);
            AppError::Internal
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(self.algorithm);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AppError::Internal)
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<(), AppError> {
        let parsed = PasswordHash::new(password_hash).map_err(|_| AppError::Internal)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AppError::Unauthorized)
    }
}
