use crate::domain::models::user::User;
use crate::domain::ports::{UserFilter, UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("INSERT INTO users (id, tenant_id, name, email, phone, user_type, department, is_active, can_book, can_manage_resources, can_manage_users, can_view_all_bookings, password_hash, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *")
            .bind(&user.id).bind(&user.tenant_id).bind(&user.name).bind(&user.email).bind(&user.phone)
            .bind(&user.user_type).bind(&user.department).bind(user.is_active).bind(user.can_book)
            .bind(user.can_manage_resources).bind(user.can_manage_users).bind(user.can_view_all_bookings)
            .bind(&user.password_hash).bind(user.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email(&self, tenant_id: &str, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE tenant_id = $1 AND email = $2").bind(tenant_id).bind(email).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email_any(&self, email: &str) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 ORDER BY created_at ASC").bind(email).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, User>("SELECT * FROM users WHERE tenant_id = $1 ORDER BY created_at ASC").bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(apply_filter(rows, filter))
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("UPDATE users SET name = $1, email = $2, phone = $3, user_type = $4, department = $5, is_active = $6, can_book = $7, can_manage_resources = $8, can_manage_users = $9, can_view_all_bookings = $10, password_hash = $11 WHERE id = $12 RETURNING *")
            .bind(&user.name).bind(&user.email).bind(&user.phone).bind(&user.user_type).bind(&user.department)
            .bind(user.is_active).bind(user.can_book).bind(user.can_manage_resources).bind(user.can_manage_users)
            .bind(user.can_view_all_bookings).bind(&user.password_hash).bind(&user.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("User not found".into())); }
        Ok(())
    }

    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE tenant_id = $1").bind(tenant_id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}

pub(crate) fn apply_filter(rows: Vec<User>, filter: &UserFilter) -> Vec<User> {
    rows.into_iter()
        .filter(|u| filter.user_type.as_deref().map_or(true, |t| u.user_type == t))
        .filter(|u| filter.is_active.map_or(true, |a| u.is_active == a))
        .filter(|u| {
            filter.search.as_deref().map_or(true, |s| {
                let needle = s.to_lowercase();
                u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
            })
        })
        .collect()
}
