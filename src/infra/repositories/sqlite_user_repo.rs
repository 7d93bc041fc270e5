use crate::domain::models::user::User;
use crate::domain::ports::{UserFilter, UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::postgres_user_repo::apply_filter;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("INSERT INTO users (id, tenant_id, name, email, phone, user_type, department, is_active, can_book, can_manage_resources, can_manage_users, can_view_all_bookings, password_hash, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *")
            .bind(&user.id).bind(&user.tenant_id).bind(&user.name).bind(&user.email).bind(&user.phone)
            .bind(&user.user_type).bind(&user.department).bind(user.is_active).bind(user.can_book)
            .bind(user.can_manage_resources).bind(user.can_manage_users).bind(user.can_view_all_bookings)
            .bind(&user.password_hash).bind(user.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email(&self, tenant_id: &str, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE tenant_id = ? AND email = ?").bind(tenant_id).bind(email).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email_any(&self, email: &str) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? ORDER BY created_at ASC").bind(email).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, User>("SELECT * FROM users WHERE tenant_id = ? ORDER BY created_at ASC").bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(apply_filter(rows, filter))
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("UPDATE users SET name = ?, email = ?, phone = ?, user_type = ?, department = ?, is_active = ?, can_book = ?, can_manage_resources = ?, can_manage_users = ?, can_view_all_bookings = ?, password_hash = ? WHERE id = ? RETURNING *")
            .bind(&user.name).bind(&user.email).bind(&user.phone).bind(&user.user_type).bind(&user.department)
            .bind(user.is_active).bind(user.can_book).bind(user.can_manage_resources).bind(user.can_manage_users)
            .bind(user.can_view_all_bookings).bind(&user.password_hash).bind(&user.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("User not found".into())); }
        Ok(())
    }

    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE tenant_id = ?").bind(tenant_id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
