use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;

use crate::entities::user_auth::local_user_entity::LocalUser;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::routes::ApiResponse;
use crate::services::user_service::{ProfileUpdateInput, RoleUpdateInput, UserService};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/profile/update", patch(update_profile))
        .route("/api/users/:user_id", get(get_user))
        .route("/api/users/:user_id/role", patch(update_role))
}

#[derive(Debug, Deserialize)]
struct ListUsersQuery {
    role: Option<String>,
}

async fn list_users(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<ListUsersQuery>,
) -> CtxResult<Json<ApiResponse<Vec<LocalUser>>>> {
    let users = UserService::new(&state.db.client, &ctx)
        .list(query.role)
        .await?;
    Ok(Json(ApiResponse::new(users)))
}

async fn get_user(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
) -> CtxResult<Json<ApiResponse<LocalUser>>> {
    let user = UserService::new(&state.db.client, &ctx)
        .get_by_id(&user_id)
        .await?;
    Ok(Json(ApiResponse::new(user)))
}

async fn update_role(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<RoleUpdateInput>,
) -> CtxResult<Json<ApiResponse<LocalUser>>> {
    let user = UserService::new(&state.db.client, &ctx)
        .update_role(&user_id, input)
        .await?;
    Ok(Json(ApiResponse::new(user)))
}

async fn update_profile(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<ProfileUpdateInput>,
) -> CtxResult<Json<ApiResponse<LocalUser>>> {
    let user = UserService::new(&state.db.client, &ctx)
        .update_profile(input)
        .await?;
    Ok(Json(ApiResponse::new(user)))
}
