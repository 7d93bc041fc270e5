use crate::api::dtos::requests::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::resource::{category_type, Category};
use crate::error::AppError;
use crate::state::ResourceState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

pub async fn create_category(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let kind = payload.category_type.unwrap_or_else(|| category_type::PHYSICAL.to_string());
    if !category_type::ALL.contains(&kind.as_str()) {
        return Err(AppError::Validation(format!("Invalid category type: {}", kind)));
    }

    let mut category = Category::new(claims.tenant_id.clone(), payload.name, kind);
    category.description = payload.description;
    category.icon = payload.icon;
    category.color = payload.color;
    if let Some(metadata) = payload.category_metadata {
        category.category_metadata = metadata.to_string();
    }

    let created = state.category_repo.create(&category).await?;
    info!(category_id = %created.id, tenant_id = %claims.tenant_id, "category created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_categories(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.category_repo.list_by_tenant(&claims.tenant_id).await?))
}

pub async fn get_category(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let category = state
        .category_repo
        .find_by_id(&claims.tenant_id, &category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Path(category_id): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut category = state
        .category_repo
        .find_by_id(&claims.tenant_id, &category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    if let Some(kind) = payload.category_type {
        if !category_type::ALL.contains(&kind.as_str()) {
            return Err(AppError::Validation(format!("Invalid category type: {}", kind)));
        }
        category.category_type = kind;
    }
    if let Some(name) = payload.name {
        category.name = name;
    }
    if let Some(description) = payload.description {
        category.description = Some(description);
    }
    if let Some(icon) = payload.icon {
        category.icon = Some(icon);
    }
    if let Some(color) = payload.color {
        category.color = Some(color);
    }
    if let Some(is_active) = payload.is_active {
        category.is_active = is_active;
    }
    if let Some(metadata) = payload.category_metadata {
        category.category_metadata = metadata.to_string();
    }

    Ok(Json(state.category_repo.update(&category).await?))
}

pub async fn delete_category(
    State(state): State<Arc<ResourceState>>,
    AuthUser(claims): AuthUser,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let in_use = state
        .resource_repo
        .list_by_tenant(&claims.tenant_id, Some(&category_id))
        .await?;
    if !in_use.is_empty() {
        return Err(AppError::Unprocessable("Category still has resources".into()));
    }

    state.category_repo.delete(&claims.tenant_id, &category_id).await?;
    info!(category_id = %category_id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
