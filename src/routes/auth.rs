use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};

use crate::entities::user_auth::local_user_entity::{LocalUser, LocalUserDbService};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::{CtxState, JWT_KEY};
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::routes::ApiResponse;
use crate::services::auth_service::{AuthLoginInput, AuthRegisterInput, AuthService};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthData {
    pub token: String,
    pub user: LocalUser,
}

fn set_jwt_cookie(cookies: &Cookies, token: String) {
    cookies.add(
        Cookie::build((JWT_KEY, token))
            // path defaults to the calling path otherwise
            .path("/")
            .http_only(true)
            .into(),
    );
}

async fn register(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    cookies: Cookies,
    JsonOrFormValidated(input): JsonOrFormValidated<AuthRegisterInput>,
) -> CtxResult<Json<ApiResponse<AuthData>>> {
    let auth_service = AuthService::new(&state.db.client, &ctx, &state.jwt);
    let (token, user) = auth_service.register_password(input).await?;
    set_jwt_cookie(&cookies, token.clone());
    Ok(Json(ApiResponse::new(AuthData { token, user })))
}

async fn login(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    cookies: Cookies,
    JsonOrFormValidated(input): JsonOrFormValidated<AuthLoginInput>,
) -> CtxResult<Json<ApiResponse<AuthData>>> {
    let auth_service = AuthService::new(&state.db.client, &ctx, &state.jwt);
    let (token, user) = auth_service.login_password(input).await?;
    set_jwt_cookie(&cookies, token.clone());
    Ok(Json(ApiResponse::new(AuthData { token, user })))
}

async fn me(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<ApiResponse<LocalUser>>> {
    let user = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user()
    .await?;
    Ok(Json(ApiResponse::new(user)))
}
