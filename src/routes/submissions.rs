use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use tempfile::NamedTempFile;

use crate::entities::market::submission_entity::{Submission, SubmissionView};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::routes::ApiResponse;
use crate::services::submission_service::{ReviewSubmissionInput, SubmissionService};
use crate::utils::file::convert::convert_field_file_data;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/submissions", post(create_submission))
        .route("/api/submissions/task/:task_id", get(task_submissions))
        .route(
            "/api/submissions/:submission_id/review",
            patch(review_submission),
        )
        .route(
            "/api/submissions/:submission_id/download",
            get(download_submission),
        )
}

#[derive(TryFromMultipart)]
pub struct SubmissionUploadInput {
    pub task_id: String,
    pub notes: Option<String>,
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

async fn create_submission(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    TypedMultipart(input): TypedMultipart<SubmissionUploadInput>,
) -> CtxResult<Json<ApiResponse<Submission>>> {
    let file = convert_field_file_data(input.file)?;
    let submission = SubmissionService::new(&state.db.client, &ctx, &state.file_storage)
        .create(&input.task_id, input.notes, file)
        .await?;
    Ok(Json(ApiResponse::new(submission)))
}

async fn task_submissions(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(task_id): Path<String>,
) -> CtxResult<Json<ApiResponse<Vec<SubmissionView>>>> {
    let submissions = SubmissionService::new(&state.db.client, &ctx, &state.file_storage)
        .list_by_task(&task_id)
        .await?;
    Ok(Json(ApiResponse::new(submissions)))
}

async fn review_submission(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(submission_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<ReviewSubmissionInput>,
) -> CtxResult<Json<ApiResponse<Submission>>> {
    let submission = SubmissionService::new(&state.db.client, &ctx, &state.file_storage)
        .review(&submission_id, input)
        .await?;
    Ok(Json(ApiResponse::new(submission)))
}

async fn download_submission(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(submission_id): Path<String>,
) -> CtxResult<Response> {
    let (bytes, file_name) = SubmissionService::new(&state.db.client, &ctx, &state.file_storage)
        .download(&submission_id)
        .await?;
    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}
