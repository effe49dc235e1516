use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::market::project_entity::{Project, ProjectView};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::routes::ApiResponse;
use crate::services::project_service::{
    CreateProjectInput, ProjectService, UpdateProjectInput,
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/projects", post(create_project).get(list_projects))
        .route("/api/projects/:project_id", get(get_project).patch(update_project))
        .route("/api/projects/:project_id/status", patch(update_project_status))
}

#[derive(Debug, Deserialize)]
struct ListProjectsQuery {
    status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProjectStatusInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub status: String,
}

async fn create_project(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<CreateProjectInput>,
) -> CtxResult<Json<ApiResponse<Project>>> {
    let project = ProjectService::new(&state.db.client, &ctx)
        .create(input)
        .await?;
    Ok(Json(ApiResponse::new(project)))
}

async fn list_projects(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<ListProjectsQuery>,
) -> CtxResult<Json<ApiResponse<Vec<ProjectView>>>> {
    let projects = ProjectService::new(&state.db.client, &ctx)
        .list(query.status)
        .await?;
    Ok(Json(ApiResponse::new(projects)))
}

async fn get_project(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(project_id): Path<String>,
) -> CtxResult<Json<ApiResponse<ProjectView>>> {
    let project = ProjectService::new(&state.db.client, &ctx)
        .get_by_id(&project_id)
        .await?;
    Ok(Json(ApiResponse::new(project)))
}

async fn update_project(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(project_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<UpdateProjectInput>,
) -> CtxResult<Json<ApiResponse<Project>>> {
    let project = ProjectService::new(&state.db.client, &ctx)
        .update(&project_id, input)
        .await?;
    Ok(Json(ApiResponse::new(project)))
}

async fn update_project_status(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(project_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<ProjectStatusInput>,
) -> CtxResult<Json<ApiResponse<Project>>> {
    let project = ProjectService::new(&state.db.client, &ctx)
        .set_status(&project_id, input.status)
        .await?;
    Ok(Json(ApiResponse::new(project)))
}
