use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::entities::market::task_entity::Task;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::routes::ApiResponse;
use crate::services::task_service::{CreateTaskInput, TaskService, UpdateTaskInput};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/project/:project_id", get(project_tasks))
        .route(
            "/api/tasks/:task_id",
            get(get_task).patch(update_task).delete(delete_task),
        )
}

async fn create_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<CreateTaskInput>,
) -> CtxResult<Json<ApiResponse<Task>>> {
    let task = TaskService::new(&state.db.client, &ctx).create(input).await?;
    Ok(Json(ApiResponse::new(task)))
}

async fn project_tasks(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(project_id): Path<String>,
) -> CtxResult<Json<ApiResponse<Vec<Task>>>> {
    let tasks = TaskService::new(&state.db.client, &ctx)
        .list_by_project(&project_id)
        .await?;
    Ok(Json(ApiResponse::new(tasks)))
}

async fn get_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(task_id): Path<String>,
) -> CtxResult<Json<ApiResponse<Task>>> {
    let task = TaskService::new(&state.db.client, &ctx)
        .get_by_id(&task_id)
        .await?;
    Ok(Json(ApiResponse::new(task)))
}

async fn update_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(task_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<UpdateTaskInput>,
) -> CtxResult<Json<ApiResponse<Task>>> {
    let task = TaskService::new(&state.db.client, &ctx)
        .update(&task_id, input)
        .await?;
    Ok(Json(ApiResponse::new(task)))
}

async fn delete_task(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(task_id): Path<String>,
) -> CtxResult<Json<ApiResponse<()>>> {
    TaskService::new(&state.db.client, &ctx)
        .delete(&task_id)
        .await?;
    Ok(Json(ApiResponse::new(())))
}
