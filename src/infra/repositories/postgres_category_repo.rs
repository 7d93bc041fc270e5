use crate::domain::models::resource::Category;
use crate::domain::ports::CategoryRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCategoryRepo {
    pool: PgPool,
}

impl PostgresCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepo {
    async fn create(&self, category: &Category) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (id, tenant_id, name, description, category_type, icon, color, is_active, category_metadata, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *")
            .bind(&category.id).bind(&category.tenant_id).bind(&category.name).bind(&category.description)
            .bind(&category.category_type).bind(&category.icon).bind(&category.color).bind(category.is_active)
            .bind(&category.category_metadata).bind(category.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE tenant_id = $1 AND id = $2").bind(tenant_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE tenant_id = $1 ORDER BY created_at ASC").bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, category: &Category) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("UPDATE categories SET name = $1, description = $2, category_type = $3, icon = $4, color = $5, is_active = $6, category_metadata = $7 WHERE id = $8 AND tenant_id = $9 RETURNING *")
            .bind(&category.name).bind(&category.description).bind(&category.category_type).bind(&category.icon)
            .bind(&category.color).bind(category.is_active).bind(&category.category_metadata)
            .bind(&category.id).bind(&category.tenant_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE tenant_id = $1 AND id = $2").bind(tenant_id).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Category not found".into())); }
        Ok(())
    }

    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE tenant_id = $1").bind(tenant_id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
