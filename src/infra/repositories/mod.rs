pub mod postgres_booking_repo;
pub mod postgres_category_repo;
pub mod postgres_resource_repo;
pub mod postgres_tenant_repo;
pub mod postgres_user_repo;
pub mod postgres_webhook_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_category_repo;
pub mod sqlite_resource_repo;
pub mod sqlite_tenant_repo;
pub mod sqlite_user_repo;
pub mod sqlite_webhook_repo;
