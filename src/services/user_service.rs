use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    database::client::Db,
    entities::user_auth::local_user_entity::{LocalUser, LocalUserDbService, UserRole},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        utils::{db_utils::IdentIdName, string_utils::get_str_thing},
    },
};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ProfileUpdateInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
    pub portfolio: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RoleUpdateInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub role: String,
}

pub struct UserService<'a> {
    ctx: &'a Ctx,
    user_repository: LocalUserDbService<'a>,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx) -> UserService<'a> {
        UserService {
            ctx,
            user_repository: LocalUserDbService { db, ctx },
        }
    }

    pub async fn get_by_id(&self, user_id: &str) -> CtxResult<LocalUser> {
        let user_thing = get_str_thing(user_id)?;
        self.user_repository.get(IdentIdName::Id(user_thing)).await
    }

    pub async fn list(&self, role: Option<String>) -> CtxResult<Vec<LocalUser>> {
        let role = match role {
            None => None,
            Some(role_str) => Some(UserRole::from_str(&role_str).map_err(|_| {
                self.ctx.to_ctx_error(AppError::Validation {
                    description: format!("Invalid role: {role_str}"),
                })
            })?),
        };
        self.user_repository.list(role).await
    }

    pub async fn update_role(&self, user_id: &str, input: RoleUpdateInput) -> CtxResult<LocalUser> {
        input.validate()?;
        let caller = self.user_repository.get_ctx_user().await?;
        if caller.role != UserRole::Admin {
            return Err(self.ctx.to_ctx_error(AppError::AuthorizationFail {
                required: format!(
                    "User role {} is not authorized to access this route",
                    caller.role
                ),
            }));
        }

        let target = self.get_by_id(user_id).await?;
        let role = UserRole::from_str(&input.role).map_err(|_| {
            self.ctx.to_ctx_error(AppError::Validation {
                description: format!("Invalid role: {}", input.role),
            })
        })?;
        if role == UserRole::Admin {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                description: "Cannot assign admin role".to_string(),
            }));
        }
        if target.role == UserRole::Admin {
            return Err(self.ctx.to_ctx_error(AppError::AuthorizationFail {
                required: "Cannot change admin role".to_string(),
            }));
        }

        let target_thing = target.id.clone().ok_or(self.ctx.to_ctx_error(
            AppError::Generic {
                description: "user record without id".to_string(),
            },
        ))?;
        self.user_repository.set_role(target_thing, role).await
    }

    pub async fn update_profile(&self, input: ProfileUpdateInput) -> CtxResult<LocalUser> {
        input.validate()?;
        let mut user = self.user_repository.get_ctx_user().await?;
        if let Some(full_name) = input.full_name {
            user.full_name = full_name;
        }
        if input.bio.is_some() {
            user.bio = input.bio;
        }
        if input.skills.is_some() {
            user.skills = input.skills;
        }
        if input.experience.is_some() {
            user.experience = input.experience;
        }
        if input.portfolio.is_some() {
            user.portfolio = input.portfolio;
        }
        self.user_repository.update(user).await
    }
}
