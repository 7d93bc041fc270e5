use crate::api::dtos::requests::{CreateUserRequest, LoginForm, UpdateUserRequest, UserListQuery};
use crate::api::dtos::responses::{TokenResponse, UserOut};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::event::{kinds, streams, EventEnvelope};
use crate::domain::models::user::{user_type, NewUserParams, User};
use crate::domain::ports::{UserFilter, UserSummary};
use crate::domain::services::authz;
use crate::error::AppError;
use crate::state::UserState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Public signup. The tenant must exist; the email must be free within it
/// (the same address may exist under other tenants).
pub async fn create_user(
    State(state): State<Arc<UserState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state.tenants.exists(&payload.tenant_id).await? {
        return Err(AppError::Unprocessable("Tenant not found".into()));
    }

    let requested_type = payload.user_type.unwrap_or_else(|| user_type::USER.to_string());
    if requested_type != user_type::ADMIN && requested_type != user_type::USER {
        return Err(AppError::Validation(format!("Invalid user_type: {}", requested_type)));
    }

    if state
        .user_repo
        .find_by_email(&payload.tenant_id, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Validation("Email already registered for this tenant".into()));
    }

    let password_hash = state.auth_service.hash_password(&payload.password)?;
    let user = User::new(NewUserParams {
        tenant_id: payload.tenant_id,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        user_type: requested_type,
        department: payload.department,
        password_hash,
    });

    let created = state.user_repo.create(&user).await?;
    info!(user_id = %created.id, tenant_id = %created.tenant_id, "user created");
    Ok((StatusCode::CREATED, Json(UserOut::from(created))))
}

/// Form-encoded login. Emails are only unique per tenant, so the password
/// check selects among same-address users across tenants.
pub async fn login(
    State(state): State<Arc<UserState>>,
    Form(payload): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let candidates = state.user_repo.find_by_email_any(&payload.email).await?;

    for user in candidates {
        if !user.is_active {
            continue;
        }
        if state
            .auth_service
            .verify_password(&payload.password, &user.password_hash)
            .is_ok()
        {
            let access_token = state.auth_service.mint(&user)?;
            info!(user_id = %user.id, "user logged in");
            return Ok(Json(TokenResponse {
                access_token,
                token_type: "bearer".to_string(),
            }));
        }
    }
    Err(AppError::Unauthorized)
}

pub async fn me(
    State(state): State<Arc<UserState>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_repo
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(UserOut::from(user)))
}

pub async fn list_users(
    State(state): State<Arc<UserState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, AppError> {
    authz::require_admin_of(&claims, &query.tenant_id)?;

    let filter = UserFilter {
        user_type: query.user_type,
        is_active: query.is_active,
        search: query.search,
    };
    let users = state.user_repo.list_by_tenant(&query.tenant_id, &filter).await?;
    Ok(Json(users.into_iter().map(UserOut::from).collect::<Vec<_>>()))
}

pub async fn get_user(
    State(state): State<Arc<UserState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_repo
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    authz::require_self_or_admin(&claims, &user.tenant_id, &user_id)?;
    Ok(Json(UserOut::from(user)))
}

pub async fn update_user(
    State(state): State<Arc<UserState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = state
        .user_repo
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    authz::require_self_or_admin(&claims, &user.tenant_id, &user_id)?;

    // Role, activation and permission changes are reserved for admins.
    let touches_admin_fields =
        payload.user_type.is_some() || payload.is_active.is_some() || payload.permissions.is_some();
    if touches_admin_fields && !claims.is_admin() {
        return Err(AppError::Forbidden("Administrator role required".into()));
    }

    if let Some(email) = &payload.email {
        if let Some(existing) = state.user_repo.find_by_email(&user.tenant_id, email).await? {
            if existing.id != user_id {
                return Err(AppError::Validation("Email already registered for this tenant".into()));
            }
        }
        user.email = email.clone();
    }
    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(phone) = payload.phone {
        user.phone = Some(phone);
    }
    if let Some(department) = payload.department {
        user.department = Some(department);
    }
    if let Some(password) = payload.password {
        user.password_hash = state.auth_service.hash_password(&password)?;
    }
    if let Some(new_type) = payload.user_type {
        if new_type != user_type::ADMIN && new_type != user_type::USER {
            return Err(AppError::Validation(format!("Invalid user_type: {}", new_type)));
        }
        user.user_type = new_type;
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }
    if let Some(permissions) = payload.permissions {
        if let Some(can_book) = permissions.can_book {
            user.can_book = can_book;
        }
        if let Some(v) = permissions.can_manage_resources {
            user.can_manage_resources = v;
        }
        if let Some(v) = permissions.can_manage_users {
            user.can_manage_users = v;
        }
        if let Some(v) = permissions.can_view_all_bookings {
            user.can_view_all_bookings = v;
        }
    }

    let updated = state.user_repo.update(&user).await?;
    info!(user_id = %user_id, "user updated");
    Ok(Json(UserOut::from(updated)))
}

pub async fn delete_user(
    State(state): State<Arc<UserState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_repo
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    authz::require_self_or_admin(&claims, &user.tenant_id, &user_id)?;

    state.user_repo.delete(&user_id).await?;

    let envelope = EventEnvelope::new(
        kinds::USER_DELETED,
        json!({ "user_id": user_id, "tenant_id": user.tenant_id }),
        &user.tenant_id,
    );
    if let Err(e) = state.events.publish(streams::DELETION_EVENTS, &envelope).await {
        warn!(user_id = %user_id, "user.deleted publish failed: {}", e);
    }

    info!(user_id = %user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Mesh-internal read used by the booking and resource services.
pub async fn internal_get_user(
    State(state): State<Arc<UserState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_repo
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(UserSummary {
        id: user.id,
        tenant_id: user.tenant_id,
        user_type: user.user_type,
        is_active: user.is_active,
        can_book: user.can_book,
        can_manage_resources: user.can_manage_resources,
        can_view_all_bookings: user.can_view_all_bookings,
    }))
}
