use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::middleware::utils::db_utils::{
    get_entity, get_list_qry, with_not_found_err, IdentIdName, QryBindingsVal,
};
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(EnumString, Display, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Submitted,
    RevisionRequested,
    Completed,
}

impl TaskStatus {
    // completed is reachable only through submission approval
    pub fn settable_by_solver(&self) -> bool {
        !matches!(self, TaskStatus::Completed)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub project: Thing,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Datetime>,
    pub status: TaskStatus,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<DateTime<Utc>>,
}

pub struct TaskDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "task";
const TABLE_COL_PROJECT: &str = crate::entities::market::project_entity::TABLE_NAME;

impl<'a> TaskDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let st_todo = TaskStatus::Todo.to_string();
        let st_in_progress = TaskStatus::InProgress.to_string();
        let st_submitted = TaskStatus::Submitted.to_string();
        let st_revision = TaskStatus::RevisionRequested.to_string();
        let st_completed = TaskStatus::Completed.to_string();
        // `order` is a surql keyword, hence the backticks
        let sql = format!("
    DEFINE TABLE {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD project ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_PROJECT}>;
    DEFINE INDEX task_project_idx ON TABLE {TABLE_NAME} COLUMNS project;
    DEFINE FIELD title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD description ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD deadline ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD status ON TABLE {TABLE_NAME} TYPE string
        ASSERT $value INSIDE ['{st_todo}','{st_in_progress}','{st_submitted}','{st_revision}','{st_completed}'];
    DEFINE INDEX task_status_idx ON TABLE {TABLE_NAME} COLUMNS status;
    DEFINE FIELD `order` ON TABLE {TABLE_NAME} TYPE int;
    DEFINE FIELD r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn next_order(&self, project: Thing) -> CtxResult<i64> {
        let mut res = self
            .db
            .query(format!(
                "SELECT `order` FROM {TABLE_NAME} WHERE project=<record>$project ORDER BY `order` DESC LIMIT 1;"
            ))
            .bind(("project", project.to_raw()))
            .await
            .map_err(CtxError::from)?;
        let last: Option<i64> = res.take("order")?;
        Ok(last.map(|o| o + 1).unwrap_or(0))
    }

    pub async fn create(&self, ct_input: Task) -> CtxResult<Task> {
        let created: Option<Task> = self
            .db
            .create(TABLE_NAME)
            .content(ct_input)
            .await
            .map_err(CtxError::from)?;
        created.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "task not created".to_string(),
        }))
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<Task> {
        let opt = get_entity::<Task>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn update(&self, mut record: Task) -> CtxResult<Task> {
        let resource = record.id.clone().ok_or(AppError::Generic {
            description: "can not update task with no id".to_string(),
        })?;
        // db-managed timestamps, the VALUE clauses refill them
        record.r_created = None;
        record.r_updated = None;
        let updated: Option<Task> = self
            .db
            .upsert((resource.tb, resource.id.to_raw()))
            .content(record)
            .await
            .map_err(CtxError::from)?;
        updated.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "task not updated".to_string(),
        }))
    }

    pub async fn set_status(&self, task: Thing, status: TaskStatus) -> CtxResult<Task> {
        let ident = task.to_raw();
        let mut res = self
            .db
            .query("UPDATE $id SET status=$status;")
            .bind(("id", task))
            .bind(("status", status.to_string()))
            .await
            .map_err(CtxError::from)?;
        let updated: Option<Task> = res.take(0)?;
        with_not_found_err(updated, self.ctx, ident.as_str())
    }

    pub async fn delete(&self, task: Thing) -> CtxResult<()> {
        let _: Option<Task> = self
            .db
            .delete((task.tb.clone(), task.id.to_raw()))
            .await
            .map_err(CtxError::from)?;
        Ok(())
    }

    pub async fn list_by_project(&self, project: Thing) -> CtxResult<Vec<Task>> {
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("project".to_string(), project.to_raw());
        let qry = format!(
            "SELECT * FROM {TABLE_NAME} WHERE project=<record>$project ORDER BY `order` ASC;"
        );
        get_list_qry(self.db, QryBindingsVal::new(qry, bindings)).await
    }
}
