use crate::domain::models::resource::Category;
use crate::domain::ports::CategoryRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCategoryRepo {
    pool: SqlitePool,
}

impl SqliteCategoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepo {
    async fn create(&self, category: &Category) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (id, tenant_id, name, description, category_type, icon, color, is_active, category_metadata, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *")
            .bind(&category.id).bind(&category.tenant_id).bind(&category.name).bind(&category.description)
            .bind(&category.category_type).bind(&category.icon).bind(&category.color).bind(category.is_active)
            .bind(&category.category_metadata).bind(category.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE tenant_id = ? AND id = ?").bind(tenant_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE tenant_id = ? ORDER BY created_at ASC").bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, category: &Category) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("UPDATE categories SET name = ?, description = ?, category_type = ?, icon = ?, color = ?, is_active = ?, category_metadata = ? WHERE id = ? AND tenant_id = ? RETURNING *")
            .bind(&category.name).bind(&category.description).bind(&category.category_type).bind(&category.icon)
            .bind(&category.color).bind(category.is_active).bind(&category.category_metadata)
            .bind(&category.id).bind(&category.tenant_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE tenant_id = ? AND id = ?").bind(tenant_id).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Category not found".into())); }
        Ok(())
    }

    async fn delete_by_tenant(&self, tenant_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE tenant_id = ?").bind(tenant_id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
