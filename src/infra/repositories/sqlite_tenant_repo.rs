use crate::domain::models::tenant::{OrganizationSettings, Tenant};
use crate::domain::ports::TenantRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTenantRepo {
    pool: SqlitePool,
}

impl SqliteTenantRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for SqliteTenantRepo {
    async fn create(&self, tenant: &Tenant, settings: &OrganizationSettings) -> Result<Tenant, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let created = sqlx::query_as::<_, Tenant>("INSERT INTO tenants (id, name, domain, logo_url, theme_primary_color, plan, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *")
            .bind(&tenant.id).bind(&tenant.name).bind(&tenant.domain).bind(&tenant.logo_url)
            .bind(&tenant.theme_primary_color).bind(&tenant.plan).bind(tenant.is_active)
            .bind(tenant.created_at).bind(tenant.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("INSERT INTO organization_settings (id, tenant_id, business_type, timezone, working_hours_start, working_hours_end, booking_interval, advance_booking_days, cancellation_hours, custom_labels, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(&settings.id).bind(&settings.tenant_id).bind(&settings.business_type).bind(&settings.timezone)
            .bind(&settings.working_hours_start).bind(&settings.working_hours_end).bind(settings.booking_interval)
            .bind(settings.advance_booking_days).bind(settings.cancellation_hours).bind(&settings.custom_labels)
            .bind(settings.created_at).bind(settings.updated_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE domain = ?").bind(domain).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        sqlx::query_as::<_, Tenant>("UPDATE tenants SET name = ?, domain = ?, logo_url = ?, theme_primary_color = ?, plan = ?, is_active = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(&tenant.name).bind(&tenant.domain).bind(&tenant.logo_url).bind(&tenant.theme_primary_color)
            .bind(&tenant.plan).bind(tenant.is_active).bind(tenant.updated_at).bind(&tenant.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM webhooks WHERE tenant_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM organization_settings WHERE tenant_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM tenants WHERE id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tenant not found".into()));
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn get_settings(&self, tenant_id: &str) -> Result<Option<OrganizationSettings>, AppError> {
        sqlx::query_as::<_, OrganizationSettings>("SELECT * FROM organization_settings WHERE tenant_id = ?").bind(tenant_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_settings(&self, settings: &OrganizationSettings) -> Result<OrganizationSettings, AppError> {
        sqlx::query_as::<_, OrganizationSettings>("UPDATE organization_settings SET business_type = ?, timezone = ?, working_hours_start = ?, working_hours_end = ?, booking_interval = ?, advance_booking_days = ?, cancellation_hours = ?, custom_labels = ?, updated_at = ? WHERE tenant_id = ? RETURNING *")
            .bind(&settings.business_type).bind(&settings.timezone).bind(&settings.working_hours_start)
            .bind(&settings.working_hours_end).bind(settings.booking_interval).bind(settings.advance_booking_days)
            .bind(settings.cancellation_hours).bind(&settings.custom_labels).bind(settings.updated_at)
            .bind(&settings.tenant_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
