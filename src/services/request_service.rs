use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    database::client::Db,
    entities::market::project_entity::ProjectDbService,
    entities::market::project_request_entity::{
        ProjectRequest, ProjectRequestDbService, ProjectRequestView, RequestStatus,
    },
    entities::user_auth::local_user_entity::{LocalUserDbService, UserRole},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        utils::{db_utils::IdentIdName, string_utils::get_str_thing},
    },
    services::project_service::role_forbidden_err,
};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateRequestInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub project_id: String,
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub message: String,
}

pub struct RequestService<'a> {
    ctx: &'a Ctx,
    user_repository: LocalUserDbService<'a>,
    project_repository: ProjectDbService<'a>,
    request_repository: ProjectRequestDbService<'a>,
}

impl<'a> RequestService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx) -> RequestService<'a> {
        RequestService {
            ctx,
            user_repository: LocalUserDbService { db, ctx },
            project_repository: ProjectDbService { db, ctx },
            request_repository: ProjectRequestDbService { db, ctx },
        }
    }

    pub async fn submit(&self, input: CreateRequestInput) -> CtxResult<ProjectRequest> {
        input.validate()?;
        let solver = self.user_repository.get_ctx_user().await?;
        if solver.role != UserRole::Solver {
            return Err(role_forbidden_err(self.ctx, solver.role));
        }
        let solver_thing = solver.id.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user record without id".to_string(),
        }))?;

        let project_thing = get_str_thing(&input.project_id)?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(project_thing.clone()))
            .await?;
        if !project.status.accepts_requests() {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "Project is not accepting requests".to_string(),
            }));
        }
        if self
            .request_repository
            .exists_for(project_thing.clone(), solver_thing.clone())
            .await?
        {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "You have already requested to work on this project".to_string(),
            }));
        }

        self.request_repository
            .create(ProjectRequest {
                id: None,
                project: project_thing,
                solver: solver_thing,
                message: input.message,
                status: RequestStatus::Pending,
                r_created: None,
                r_updated: None,
            })
            .await
    }

    pub async fn list_by_project(&self, project_id: &str) -> CtxResult<Vec<ProjectRequestView>> {
        let project_thing = get_str_thing(project_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(project_thing.clone()))
            .await?;
        if caller.role != UserRole::Admin && caller.id != Some(project.buyer.clone()) {
            return Err(role_forbidden_err(self.ctx, caller.role));
        }
        self.request_repository.list_by_project(project_thing).await
    }

    pub async fn list_my(&self) -> CtxResult<Vec<ProjectRequest>> {
        let solver = self.user_repository.get_ctx_user().await?;
        if solver.role != UserRole::Solver {
            return Err(role_forbidden_err(self.ctx, solver.role));
        }
        let solver_thing = solver.id.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user record without id".to_string(),
        }))?;
        self.request_repository.list_by_solver(solver_thing).await
    }

    pub async fn accept(&self, request_id: &str) -> CtxResult<ProjectRequest> {
        let request_thing = get_str_thing(request_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let request = self
            .request_repository
            .get(IdentIdName::Id(request_thing.clone()))
            .await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(request.project.clone()))
            .await?;
        if caller.id != Some(project.buyer.clone()) {
            return Err(role_forbidden_err(self.ctx, caller.role));
        }
        if request.status != RequestStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "Request has already been processed".to_string(),
            }));
        }
        if !project.status.accepts_requests() {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "Project is already assigned".to_string(),
            }));
        }

        self.request_repository.accept(&request).await?;
        self.request_repository
            .get(IdentIdName::Id(request_thing))
            .await
    }

    pub async fn reject(&self, request_id: &str) -> CtxResult<ProjectRequest> {
        let request_thing = get_str_thing(request_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let request = self
            .request_repository
            .get(IdentIdName::Id(request_thing.clone()))
            .await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(request.project.clone()))
            .await?;
        if caller.id != Some(project.buyer.clone()) {
            return Err(role_forbidden_err(self.ctx, caller.role));
        }
        if request.status != RequestStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "Request has already been processed".to_string(),
            }));
        }
        self.request_repository
            .set_status(request_thing, RequestStatus::Rejected)
            .await
    }
}
