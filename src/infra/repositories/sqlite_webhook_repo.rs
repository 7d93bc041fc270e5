use crate::domain::models::webhook::Webhook;
use crate::domain::ports::WebhookRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteWebhookRepo {
    pool: SqlitePool,
}

impl SqliteWebhookRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookRepository for SqliteWebhookRepo {
    async fn create(&self, webhook: &Webhook) -> Result<Webhook, AppError> {
        sqlx::query_as::<_, Webhook>("INSERT INTO webhooks (id, tenant_id, url, events, secret, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *")
            .bind(&webhook.id).bind(&webhook.tenant_id).bind(&webhook.url).bind(&webhook.events)
            .bind(&webhook.secret).bind(webhook.is_active).bind(webhook.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Webhook>, AppError> {
        sqlx::query_as::<_, Webhook>("SELECT * FROM webhooks WHERE tenant_id = ? AND id = ?").bind(tenant_id).bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Webhook>, AppError> {
        sqlx::query_as::<_, Webhook>("SELECT * FROM webhooks WHERE tenant_id = ? ORDER BY created_at ASC").bind(tenant_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, webhook: &Webhook) -> Result<Webhook, AppError> {
        sqlx::query_as::<_, Webhook>("UPDATE webhooks SET url = ?, events = ?, secret = ?, is_active = ? WHERE id = ? AND tenant_id = ? RETURNING *")
            .bind(&webhook.url).bind(&webhook.events).bind(&webhook.secret).bind(webhook.is_active)
            .bind(&webhook.id).bind(&webhook.tenant_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM webhooks WHERE tenant_id = ? AND id = ?").bind(tenant_id).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Webhook not found".into())); }
        Ok(())
    }
}
