use crate::domain::models::resource::Resource;
use crate::domain::ports::ResourceRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub struct SqliteResourceRepo {
    pool: SqlitePool,
}

impl SqliteResourceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for SqliteResourceRepo {
    async fn create(&self, resource: &Resource) -> Result<Resource, AppError> {
        sqlx::query_as::<_, Resource>("INSERT INTO resources (id, tenant_id, category_id, name, description, status, capacity, location, attributes, availability_schedule, image_url, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *")
            .bind(&resource.id).bind(&resource.tenant_id).bind(&resource.category_id).bind(&resource.name)
            .bind(&resource.description).bind(&resource.status).bind(resource.capacity).bind(&resource.location)
            .bind(&resource.attributes).bind(&resource.availability_schedule).bind(&resource.image_url)
            .bind(resource.created_at).bind(resource.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Resource>, AppError> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str, category_id: Option<&str>) -> Result<Vec<Resource>, AppError> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE tenant_id = ? AND (? IS NULL OR category_id = ?) ORDER BY created_at ASC")
            .bind(tenant_id).bind(category_id).bind(category_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, resource: &Resource) -> Result<Resource, AppError> {
        sqlx::query_as::<_, Resource>("UPDATE resources SET category_id = ?, name = ?, description = ?, status = ?, capacity = ?, location = ?, attributes = ?, availability_schedule = ?, image_url = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(&resource.category_id).bind(&resource.name).bind(&resource.description).bind(&resource.status)
            .bind(resource.capacity).bind(&resource.location).bind(&resource.attributes)
            .bind(&resource.availability_schedule).bind(&resource.image_url).bind(resource.updated_at)
            .bind(&resource.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM resources WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Resource not found".into())); }
        Ok(())
    }

    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("DELETE FROM resources WHERE tenant_id = ? RETURNING id").bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(rows.iter().map(|r| r.get::<String, _>("id")).collect())
    }
}
