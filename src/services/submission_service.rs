use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    database::client::Db,
    entities::market::project_entity::{Project, ProjectDbService},
    entities::market::submission_entity::{
        Submission, SubmissionDbService, SubmissionStatus, SubmissionView,
    },
    entities::market::task_entity::{TaskDbService, TaskStatus},
    entities::user_auth::local_user_entity::{LocalUser, LocalUserDbService, UserRole},
    interfaces::file_storage::FileStorageInterface,
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        utils::{db_utils::IdentIdName, string_utils::get_str_thing},
    },
    services::project_service::role_forbidden_err,
    utils::file::convert::FileUpload,
};

const ZIP_CONTENT_TYPES: [&str; 2] = ["application/zip", "application/x-zip-compressed"];

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ReviewSubmissionInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub status: String,
    pub review_notes: Option<String>,
}

pub struct SubmissionService<'a> {
    ctx: &'a Ctx,
    file_storage: &'a Arc<dyn FileStorageInterface + Send + Sync>,
    user_repository: LocalUserDbService<'a>,
    project_repository: ProjectDbService<'a>,
    task_repository: TaskDbService<'a>,
    submission_repository: SubmissionDbService<'a>,
}

impl<'a> SubmissionService<'a> {
    pub fn new(
        db: &'a Db,
        ctx: &'a Ctx,
        file_storage: &'a Arc<dyn FileStorageInterface + Send + Sync>,
    ) -> SubmissionService<'a> {
        SubmissionService {
            ctx,
            file_storage,
            user_repository: LocalUserDbService { db, ctx },
            project_repository: ProjectDbService { db, ctx },
            task_repository: TaskDbService { db, ctx },
            submission_repository: SubmissionDbService { db, ctx },
        }
    }

    pub async fn create(
        &self,
        task_id: &str,
        notes: Option<String>,
        file: FileUpload,
    ) -> CtxResult<Submission> {
        let task_thing = get_str_thing(task_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let task = self
            .task_repository
            .get(IdentIdName::Id(task_thing.clone()))
            .await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(task.project.clone()))
            .await?;
        self.check_assigned_solver(&caller, &project)?;
        if task.status == TaskStatus::Completed {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                description: "Cannot submit to a completed task".to_string(),
            }));
        }

        let is_zip = file
            .content_type
            .as_deref()
            .map(|ct| ZIP_CONTENT_TYPES.contains(&ct))
            .unwrap_or(false)
            || file.file_name.to_lowercase().ends_with(".zip");
        if !is_zip {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                description: "Only ZIP files are allowed".to_string(),
            }));
        }

        let solver_thing = caller.id.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user record without id".to_string(),
        }))?;
        let file_size = file.data.len() as i64;
        let stored_name = format!("submission-{}.zip", Uuid::new_v4());
        let file_path = self
            .file_storage
            .upload(
                file.data,
                None,
                &stored_name,
                file.content_type.as_deref(),
            )
            .await
            .map_err(|err| {
                self.ctx
                    .to_ctx_error(AppError::Generic { description: err })
            })?;

        let submission = self
            .submission_repository
            .create(Submission {
                id: None,
                task: task_thing.clone(),
                solver: solver_thing,
                file_path,
                file_name: file.file_name,
                file_size,
                notes,
                status: SubmissionStatus::Pending,
                review_notes: None,
                reviewed_at: None,
                r_created: None,
                r_updated: None,
            })
            .await?;

        self.task_repository
            .set_status(task_thing, TaskStatus::Submitted)
            .await?;
        Ok(submission)
    }

    pub async fn list_by_task(&self, task_id: &str) -> CtxResult<Vec<SubmissionView>> {
        let task_thing = get_str_thing(task_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let task = self
            .task_repository
            .get(IdentIdName::Id(task_thing.clone()))
            .await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(task.project.clone()))
            .await?;
        self.check_project_member(&caller, &project)?;
        self.submission_repository.list_by_task(task_thing).await
    }

    pub async fn review(
        &self,
        submission_id: &str,
        input: ReviewSubmissionInput,
    ) -> CtxResult<Submission> {
        input.validate()?;
        let submission_thing = get_str_thing(submission_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let submission = self
            .submission_repository
            .get(IdentIdName::Id(submission_thing.clone()))
            .await?;
        let task = self
            .task_repository
            .get(IdentIdName::Id(submission.task.clone()))
            .await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(task.project.clone()))
            .await?;
        if caller.role != UserRole::Admin && caller.id != Some(project.buyer.clone()) {
            return Err(role_forbidden_err(self.ctx, caller.role));
        }

        let decision = SubmissionStatus::from_str(&input.status).map_err(|_| {
            self.ctx.to_ctx_error(AppError::Validation {
                description: format!("Invalid status: {}", input.status),
            })
        })?;
        if decision == SubmissionStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                description: "Review status must be approved or rejected".to_string(),
            }));
        }
        if submission.status != SubmissionStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Conflict {
                description: "Submission has already been reviewed".to_string(),
            }));
        }

        let task_thing = submission.task.clone();
        let project_thing = task.project.clone();
        self.submission_repository
            .review(
                submission_thing.clone(),
                task_thing,
                project_thing,
                decision,
                input.review_notes,
            )
            .await?;
        self.submission_repository
            .get(IdentIdName::Id(submission_thing))
            .await
    }

    pub async fn download(&self, submission_id: &str) -> CtxResult<(Vec<u8>, String)> {
        let submission_thing = get_str_thing(submission_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let submission = self
            .submission_repository
            .get(IdentIdName::Id(submission_thing))
            .await?;
        let task = self
            .task_repository
            .get(IdentIdName::Id(submission.task.clone()))
            .await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(task.project.clone()))
            .await?;
        self.check_project_member(&caller, &project)?;

        let bytes = self
            .file_storage
            .download(None, &submission.file_path)
            .await
            .map_err(|_| {
                self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                    ident: submission.file_path.clone(),
                })
            })?;
        Ok((bytes, submission.file_name))
    }

    fn check_assigned_solver(&self, caller: &LocalUser, project: &Project) -> CtxResult<()> {
        let is_assigned = project
            .assigned_solver
            .as_ref()
            .map(|solver| caller.id == Some(solver.clone()))
            .unwrap_or(false);
        if is_assigned {
            return Ok(());
        }
        Err(role_forbidden_err(self.ctx, caller.role))
    }

    fn check_project_member(&self, caller: &LocalUser, project: &Project) -> CtxResult<()> {
        if caller.role == UserRole::Admin || caller.id == Some(project.buyer.clone()) {
            return Ok(());
        }
        let is_assigned = project
            .assigned_solver
            .as_ref()
            .map(|solver| caller.id == Some(solver.clone()))
            .unwrap_or(false);
        if is_assigned {
            return Ok(());
        }
        Err(role_forbidden_err(self.ctx, caller.role))
    }
}
