use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{http::StatusCode, Router};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::database::client::Database;
use crate::entities::market::project_entity::ProjectDbService;
use crate::entities::market::project_request_entity::ProjectRequestDbService;
use crate::entities::market::submission_entity::SubmissionDbService;
use crate::entities::market::task_entity::TaskDbService;
use crate::entities::user_auth::authentication_entity::{AuthType, AuthenticationDbService};
use crate::entities::user_auth::local_user_entity::{
    EmailIdent, LocalUser, LocalUserDbService, UserRole,
};
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, AppResult},
    mw_ctx::CtxState,
};
use crate::routes::{auth, projects, requests, submissions, tasks, users};
use crate::utils::hash::hash_password;

pub async fn run_migrations(database: &Database) -> AppResult<()> {
    let db = database.client.clone();
    let c = Ctx::new(Ok("migrations".to_string()));

    LocalUserDbService { db: &db, ctx: &c }.mutate_db().await?;
    AuthenticationDbService { db: &db, ctx: &c }
        .mutate_db()
        .await?;
    ProjectDbService { db: &db, ctx: &c }.mutate_db().await?;
    ProjectRequestDbService { db: &db, ctx: &c }
        .mutate_db()
        .await?;
    TaskDbService { db: &db, ctx: &c }.mutate_db().await?;
    SubmissionDbService { db: &db, ctx: &c }.mutate_db().await?;
    Ok(())
}

/// Seeds the admin account; registration can never produce one.
pub async fn create_admin_user(ctx_state: &CtxState) -> AppResult<()> {
    let c = Ctx::new(Ok("admin_init".to_string()));
    let users = LocalUserDbService {
        db: &ctx_state.db.client,
        ctx: &c,
    };
    let existing = users
        .exists(EmailIdent(ctx_state.admin_email.clone()).into())
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let hash = hash_password(&ctx_state.admin_password)
        .map_err(|err| AppError::Generic { description: err })?;
    users
        .create(
            LocalUser {
                id: None,
                email: ctx_state.admin_email.to_lowercase(),
                full_name: "Admin".to_string(),
                role: UserRole::Admin,
                bio: None,
                skills: None,
                experience: None,
                portfolio: None,
                r_created: None,
                r_updated: None,
            },
            AuthType::PASSWORD(Some(hash)),
        )
        .await?;
    Ok(())
}

pub async fn main_router(ctx_state: &Arc<CtxState>) -> Router {
    let body_limit = (ctx_state.upload_max_size_mb as usize) * 1024 * 1024;
    Router::new()
        .route("/hc", get(get_hc))
        .merge(auth::routes())
        .merge(users::routes())
        .merge(projects::routes())
        .merge(requests::routes())
        .merge(tasks::routes())
        .merge(submissions::routes())
        .with_state(ctx_state.clone())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn get_hc() -> Response {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    (StatusCode::OK, format!("v{}", VERSION)).into_response()
}
