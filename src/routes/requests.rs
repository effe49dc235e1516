use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::entities::market::project_request_entity::{ProjectRequest, ProjectRequestView};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::routes::ApiResponse;
use crate::services::request_service::{CreateRequestInput, RequestService};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/requests", post(create_request))
        .route("/api/requests/my", get(my_requests))
        .route("/api/requests/project/:project_id", get(project_requests))
        .route("/api/requests/:request_id/accept", patch(accept_request))
        .route("/api/requests/:request_id/reject", patch(reject_request))
}

async fn create_request(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<CreateRequestInput>,
) -> CtxResult<Json<ApiResponse<ProjectRequest>>> {
    let request = RequestService::new(&state.db.client, &ctx)
        .submit(input)
        .await?;
    Ok(Json(ApiResponse::new(request)))
}

async fn my_requests(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<ApiResponse<Vec<ProjectRequest>>>> {
    let requests = RequestService::new(&state.db.client, &ctx).list_my().await?;
    Ok(Json(ApiResponse::new(requests)))
}

async fn project_requests(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(project_id): Path<String>,
) -> CtxResult<Json<ApiResponse<Vec<ProjectRequestView>>>> {
    let requests = RequestService::new(&state.db.client, &ctx)
        .list_by_project(&project_id)
        .await?;
    Ok(Json(ApiResponse::new(requests)))
}

async fn accept_request(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(request_id): Path<String>,
) -> CtxResult<Json<ApiResponse<ProjectRequest>>> {
    let request = RequestService::new(&state.db.client, &ctx)
        .accept(&request_id)
        .await?;
    Ok(Json(ApiResponse::new(request)))
}

async fn reject_request(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(request_id): Path<String>,
) -> CtxResult<Json<ApiResponse<ProjectRequest>>> {
    let request = RequestService::new(&state.db.client, &ctx)
        .reject(&request_id)
        .await?;
    Ok(Json(ApiResponse::new(request)))
}
