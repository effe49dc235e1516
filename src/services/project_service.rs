use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;
use validator::Validate;

use crate::{
    database::client::Db,
    entities::market::project_entity::{
        Project, ProjectDbService, ProjectStatus, ProjectView,
    },
    entities::user_auth::local_user_entity::{LocalUser, LocalUserDbService, UserRole},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        utils::{db_utils::IdentIdName, string_utils::get_str_thing},
    },
};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateProjectInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub title: String,
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub description: String,
    pub requirements: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateProjectInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub description: Option<String>,
    pub requirements: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
}

pub struct ProjectService<'a> {
    ctx: &'a Ctx,
    user_repository: LocalUserDbService<'a>,
    project_repository: ProjectDbService<'a>,
}

pub fn role_forbidden_err(ctx: &Ctx, role: UserRole) -> crate::middleware::error::CtxError {
    ctx.to_ctx_error(AppError::AuthorizationFail {
        required: format!("User role {role} is not authorized to access this route"),
    })
}

impl<'a> ProjectService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx) -> ProjectService<'a> {
        ProjectService {
            ctx,
            user_repository: LocalUserDbService { db, ctx },
            project_repository: ProjectDbService { db, ctx },
        }
    }

    pub async fn create(&self, input: CreateProjectInput) -> CtxResult<Project> {
        input.validate()?;
        let buyer = self.user_repository.get_ctx_user().await?;
        if buyer.role != UserRole::Buyer {
            return Err(role_forbidden_err(self.ctx, buyer.role));
        }
        let buyer_thing = buyer.id.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user record without id".to_string(),
        }))?;
        self.project_repository
            .create(Project {
                id: None,
                title: input.title,
                description: input.description,
                requirements: input.requirements,
                buyer: buyer_thing,
                assigned_solver: None,
                status: ProjectStatus::Open,
                budget: input.budget,
                deadline: input.deadline.map(Datetime::from),
                r_created: None,
                r_updated: None,
            })
            .await
    }

    pub async fn list(&self, status: Option<String>) -> CtxResult<Vec<ProjectView>> {
        let status = self.parse_status_filter(status)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let caller_thing = caller.id.clone().ok_or(self.ctx.to_ctx_error(
            AppError::Generic {
                description: "user record without id".to_string(),
            },
        ))?;
        match caller.role {
            UserRole::Admin => self.project_repository.list_all(status).await,
            UserRole::Buyer => self.project_repository.list_by_buyer(caller_thing, status).await,
            UserRole::Solver => {
                self.project_repository
                    .list_visible_to_solver(caller_thing, status)
                    .await
            }
        }
    }

    pub async fn get_by_id(&self, project_id: &str) -> CtxResult<ProjectView> {
        let project_thing = get_str_thing(project_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let view: ProjectView = self
            .project_repository
            .get_view(IdentIdName::Id(project_thing))
            .await?;
        self.check_view_access(&caller, &view)?;
        Ok(view)
    }

    pub async fn update(&self, project_id: &str, input: UpdateProjectInput) -> CtxResult<Project> {
        input.validate()?;
        let project_thing = get_str_thing(project_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let mut project = self
            .project_repository
            .get(IdentIdName::Id(project_thing))
            .await?;
        self.check_owner_or_admin(&caller, &project)?;

        if let Some(title) = input.title {
            project.title = title;
        }
        if let Some(description) = input.description {
            project.description = description;
        }
        if input.requirements.is_some() {
            project.requirements = input.requirements;
        }
        if input.budget.is_some() {
            project.budget = input.budget;
        }
        if let Some(deadline) = input.deadline {
            project.deadline = Some(Datetime::from(deadline));
        }
        self.project_repository.update(project).await
    }

    pub async fn set_status(&self, project_id: &str, status: String) -> CtxResult<Project> {
        let project_thing = get_str_thing(project_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(project_thing.clone()))
            .await?;
        self.check_owner_or_admin(&caller, &project)?;

        let status = ProjectStatus::from_str(&status).map_err(|_| {
            self.ctx.to_ctx_error(AppError::Validation {
                description: format!("Invalid status: {status}"),
            })
        })?;
        self.project_repository.set_status(project_thing, status).await
    }

    fn parse_status_filter(&self, status: Option<String>) -> CtxResult<Option<ProjectStatus>> {
        match status {
            None => Ok(None),
            Some(status_str) => ProjectStatus::from_str(&status_str)
                .map(Some)
                .map_err(|_| {
                    self.ctx.to_ctx_error(AppError::Validation {
                        description: format!("Invalid status: {status_str}"),
                    })
                }),
        }
    }

    fn check_owner_or_admin(&self, caller: &LocalUser, project: &Project) -> CtxResult<()> {
        if caller.role == UserRole::Admin || caller.id == Some(project.buyer.clone()) {
            return Ok(());
        }
        Err(role_forbidden_err(self.ctx, caller.role))
    }

    // buyers see their own, the assigned solver theirs, any solver an open
    // listing, admins everything
    fn check_view_access(&self, caller: &LocalUser, view: &ProjectView) -> CtxResult<()> {
        if caller.role == UserRole::Admin {
            return Ok(());
        }
        let caller_id = caller.id.clone();
        if caller_id == Some(view.buyer.id.clone()) {
            return Ok(());
        }
        if view
            .assigned_solver
            .as_ref()
            .map(|solver| Some(solver.id.clone()) == caller_id)
            .unwrap_or(false)
        {
            return Ok(());
        }
        if caller.role == UserRole::Solver && view.status == ProjectStatus::Open {
            return Ok(());
        }
        Err(role_forbidden_err(self.ctx, caller.role))
    }
}
