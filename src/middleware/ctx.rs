use std::sync::Arc;

use super::error::{AppError, AppResult, CtxError, CtxResult};
use crate::middleware::mw_ctx::{CtxState, JWT_KEY};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

#[derive(Clone, Debug)]
pub struct Ctx {
    result_user_id: AppResult<String>,
}

impl Ctx {
    pub fn new(result_user_id: AppResult<String>) -> Self {
        Self { result_user_id }
    }

    pub fn user_id(&self) -> CtxResult<String> {
        self.result_user_id
            .clone()
            .map_err(|error| CtxError { error })
    }

    pub fn to_ctx_error(&self, error: AppError) -> CtxError {
        CtxError { error }
    }
}

#[async_trait]
impl FromRequestParts<Arc<CtxState>> for Ctx {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<CtxState>,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state): State<Arc<CtxState>> = State::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        // Bearer header wins over the jwt cookie.
        let token = match parts.headers.typed_get::<Authorization<Bearer>>() {
            Some(bearer) => Some(bearer.token().to_string()),
            None => CookieJar::from_headers(&parts.headers)
                .get(JWT_KEY)
                .map(|cookie| cookie.value().to_string()),
        };

        let jwt_user_id: AppResult<String> = match token {
            Some(token) => match app_state.jwt.decode(&token) {
                Ok(claims) => Ok(claims.auth),
                Err(source) => Err(AppError::AuthFailJwtInvalid { source }),
            },
            None => Err(AppError::AuthFailNoJwtCookie),
        };

        Ok(Ctx::new(jwt_user_id))
    }
}
