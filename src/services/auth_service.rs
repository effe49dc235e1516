use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    database::client::Db,
    entities::user_auth::{
        authentication_entity::{AuthType, AuthenticationDbService},
        local_user_entity::{EmailIdent, LocalUser, LocalUserDbService, UserRole},
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        utils::db_utils::IdentIdName,
    },
    utils::{
        hash::{hash_password, verify_password},
        jwt::JWT,
    },
};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AuthRegisterInput {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Min 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub full_name: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AuthLoginInput {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Min 6 characters"))]
    pub password: String,
}

pub struct AuthService<'a> {
    ctx: &'a Ctx,
    jwt: &'a JWT,
    user_repository: LocalUserDbService<'a>,
    auth_repository: AuthenticationDbService<'a>,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx, jwt: &'a JWT) -> AuthService<'a> {
        AuthService {
            ctx,
            jwt,
            user_repository: LocalUserDbService { db, ctx },
            auth_repository: AuthenticationDbService { db, ctx },
        }
    }

    pub async fn register_password(
        &self,
        input: AuthRegisterInput,
    ) -> CtxResult<(String, LocalUser)> {
        input.validate()?;

        let existing = self
            .user_repository
            .exists(EmailIdent(input.email.clone()).into())
            .await?;
        if existing.is_some() {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "Email already registered".to_string(),
            }));
        }

        // admin accounts are seeded, never self-registered
        let role = match input.role.as_deref() {
            None => UserRole::Solver,
            Some(role_str) => {
                let role = UserRole::from_str(role_str).map_err(|_| {
                    self.ctx.to_ctx_error(AppError::Validation {
                        description: format!("Invalid role: {role_str}"),
                    })
                })?;
                if role == UserRole::Admin {
                    return Err(self.ctx.to_ctx_error(AppError::Validation {
                        description: "Cannot assign admin role".to_string(),
                    }));
                }
                role
            }
        };

        let hash = hash_password(&input.password).map_err(|err| {
            self.ctx
                .to_ctx_error(AppError::Generic { description: err })
        })?;
        let user = LocalUser {
            id: None,
            email: input.email.to_lowercase(),
            full_name: input.full_name,
            role,
            bio: None,
            skills: None,
            experience: None,
            portfolio: None,
            r_created: None,
            r_updated: None,
        };
        let user_thing = self
            .user_repository
            .create(user, AuthType::PASSWORD(Some(hash)))
            .await?;

        let user = self
            .user_repository
            .get(IdentIdName::Id(user_thing.clone()))
            .await?;
        let token = self.jwt.encode(&user_thing.to_raw()).map_err(|err| {
            self.ctx
                .to_ctx_error(AppError::Generic { description: err })
        })?;
        Ok((token, user))
    }

    pub async fn login_password(&self, input: AuthLoginInput) -> CtxResult<(String, LocalUser)> {
        input.validate()?;

        let user = match self
            .user_repository
            .exists(EmailIdent(input.email.clone()).into())
            .await?
        {
            Some(user_thing) => {
                self.user_repository
                    .get(IdentIdName::Id(user_thing))
                    .await?
            }
            None => return Err(self.ctx.to_ctx_error(AppError::AuthenticationFail)),
        };

        let user_thing = user
            .id
            .clone()
            .ok_or(self.ctx.to_ctx_error(AppError::AuthenticationFail))?;
        let auth = self
            .auth_repository
            .get_by_user(user_thing.clone(), AuthType::PASSWORD(None).as_str())
            .await?
            .ok_or(self.ctx.to_ctx_error(AppError::AuthenticationFail))?;

        let hash = auth
            .token
            .ok_or(self.ctx.to_ctx_error(AppError::AuthenticationFail))?;
        if !verify_password(&hash, &input.password) {
            return Err(self.ctx.to_ctx_error(AppError::AuthenticationFail));
        }

        let token = self.jwt.encode(&user_thing.to_raw()).map_err(|err| {
            self.ctx
                .to_ctx_error(AppError::Generic { description: err })
        })?;
        Ok((token, user))
    }
}
