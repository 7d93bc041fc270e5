use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub mod user_type {
    pub const ADMIN: &str = "admin";
    pub const USER: &str = "user";
}

/// Permission flags are stored as flat columns; the API surface regroups
/// them under a `permissions` object (see responses::UserOut).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: String,
    pub department: Option<String>,
    pub is_active: bool,
    pub can_book: bool,
    pub can_manage_resources: bool,
    pub can_manage_users: bool,
    pub can_view_all_bookings: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewUserParams {
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: String,
    pub department: Option<String>,
    pub password_hash: String,
}

impl User {
    pub fn new(params: NewUserParams) -> Self {
        let is_admin = params.user_type == user_type::ADMIN;
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            name: params.name,
            email: params.email,
            phone: params.phone,
            user_type: params.user_type,
            department: params.department,
            is_active: true,
            can_book: true,
            can_manage_resources: is_admin,
            can_manage_users: is_admin,
            can_view_all_bookings: is_admin,
            password_hash: params.password_hash,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == user_type::ADMIN
    }
}
