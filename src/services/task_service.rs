use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;
use validator::Validate;

use crate::{
    database::client::Db,
    entities::market::project_entity::{Project, ProjectDbService, ProjectStatus},
    entities::market::task_entity::{Task, TaskDbService, TaskStatus},
    entities::user_auth::local_user_entity::{LocalUser, LocalUserDbService, UserRole},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        utils::{db_utils::IdentIdName, string_utils::get_str_thing},
    },
    services::project_service::role_forbidden_err,
};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateTaskInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub project_id: String,
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateTaskInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

pub struct TaskService<'a> {
    ctx: &'a Ctx,
    user_repository: LocalUserDbService<'a>,
    project_repository: ProjectDbService<'a>,
    task_repository: TaskDbService<'a>,
}

impl<'a> TaskService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx) -> TaskService<'a> {
        TaskService {
            ctx,
            user_repository: LocalUserDbService { db, ctx },
            project_repository: ProjectDbService { db, ctx },
            task_repository: TaskDbService { db, ctx },
        }
    }

    pub async fn create(&self, input: CreateTaskInput) -> CtxResult<Task> {
        input.validate()?;
        let caller = self.user_repository.get_ctx_user().await?;
        let project_thing = get_str_thing(&input.project_id)?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(project_thing.clone()))
            .await?;
        self.check_assigned_solver(&caller, &project)?;
        if !project.status.accepts_tasks() {
            return Err(self.ctx.to_ctx_error(AppError::Validation {
                description: "Cannot add tasks to completed or cancelled project".to_string(),
            }));
        }

        let order = self.task_repository.next_order(project_thing.clone()).await?;
        let task = self
            .task_repository
            .create(Task {
                id: None,
                project: project_thing.clone(),
                title: input.title,
                description: input.description,
                deadline: input.deadline.map(Datetime::from),
                status: TaskStatus::Todo,
                order,
                r_created: None,
                r_updated: None,
            })
            .await?;

        // first task moves the freshly assigned project into execution
        if project.status == ProjectStatus::Assigned {
            self.project_repository
                .set_status(project_thing, ProjectStatus::InProgress)
                .await?;
        }
        Ok(task)
    }

    pub async fn list_by_project(&self, project_id: &str) -> CtxResult<Vec<Task>> {
        let project_thing = get_str_thing(project_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(project_thing.clone()))
            .await?;
        self.check_project_member(&caller, &project)?;
        self.task_repository.list_by_project(project_thing).await
    }

    pub async fn get_by_id(&self, task_id: &str) -> CtxResult<Task> {
        let task_thing = get_str_thing(task_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let task = self
            .task_repository
            .get(IdentIdName::Id(task_thing))
            .await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(task.project.clone()))
            .await?;
        self.check_project_member(&caller, &project)?;
        Ok(task)
    }

    pub async fn update(&self, task_id: &str, input: UpdateTaskInput) -> CtxResult<Task> {
        input.validate()?;
        let task_thing = get_str_thing(task_id)?;
        let caller = self.user_repository.get_ctx_user().await?;
        let mut task = self
            .task_repository
            .get(IdentIdName::Id(task_thing))
            .await?;
        let project = self
            .project_repository
            .get(IdentIdName::Id(task.project.clone()))
            .await?;
        self.check_assigned_solver(&caller, &project)?;

        if let Some(status_str) = input.status {
            let status = TaskStatus::from_str(&status_str).map_err(|_| {
                self.ctx.to_ctx_error(AppError::Validation {
                    description: format!("Invalid status: {status_str}"),
                })
            })?;
            if !status.settable_by_solver() {
                return Err(self.ctx.to_ctx_error(AppError::Validation {
                    description: "Task can only be marked complete by buyer".to_string(),
                }));
            }
            task.status = status;
        }
        if let Some(title) = input.title {
            task.title = title;
        }
        if input.description.is_some() {
            task.description = input.description;
        }
        if let Some(deadline) = input.deadline {
            task.deadline = Some(Datetime::from(deadline));
        }
        self.task_repository.update(task).await
    }

    pub async fn delete(&self, task_id: &str) -> CtxResult<()> {
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
                description: "Cannot delete completed task".to_string(),
            }));
        }
        self.task_repository.delete(task_thing).await
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
