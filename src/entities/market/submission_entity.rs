use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::market::project_entity::ProjectStatus;
use crate::entities::market::task_entity::TaskStatus;
use crate::entities::user_auth::local_user_entity::UserItemView;
use crate::middleware::utils::db_utils::{
    get_entity, get_list_qry, with_not_found_err, IdentIdName, QryBindingsVal, ViewFieldSelector,
};
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(EnumString, Display, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub task: Thing,
    pub solver: Thing,
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: Thing,
    pub task: Thing,
    pub solver: UserItemView,
    pub file_name: String,
    pub file_size: i64,
    pub notes: Option<String>,
    pub status: SubmissionStatus,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub r_created: Option<DateTime<Utc>>,
}

impl ViewFieldSelector for SubmissionView {
    fn get_select_query_fields() -> String {
        "id,
        task,
        solver.{id, full_name, email} as solver,
        file_name,
        file_size,
        notes,
        status,
        review_notes,
        reviewed_at,
        r_created"
            .to_string()
    }
}

pub struct SubmissionDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "submission";
const TABLE_COL_TASK: &str = crate::entities::market::task_entity::TABLE_NAME;
const TABLE_COL_USER: &str = crate::entities::user_auth::local_user_entity::TABLE_NAME;

const THROW_ALREADY_REVIEWED: &str = "Submission has already been reviewed";

impl<'a> SubmissionDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let st_pending = SubmissionStatus::Pending.to_string();
        let st_approved = SubmissionStatus::Approved.to_string();
        let st_rejected = SubmissionStatus::Rejected.to_string();
        let sql = format!("
    DEFINE TABLE {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD task ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_TASK}>;
    DEFINE INDEX submission_task_idx ON TABLE {TABLE_NAME} COLUMNS task;
    DEFINE FIELD solver ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD file_path ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD file_name ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD file_size ON TABLE {TABLE_NAME} TYPE int;
    DEFINE FIELD notes ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD status ON TABLE {TABLE_NAME} TYPE string
        ASSERT $value INSIDE ['{st_pending}','{st_approved}','{st_rejected}'];
    DEFINE FIELD review_notes ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD reviewed_at ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn create(&self, ct_input: Submission) -> CtxResult<Submission> {
        let created: Option<Submission> = self
            .db
            .create(TABLE_NAME)
            .content(ct_input)
            .await
            .map_err(CtxError::from)?;
        created.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "submission not created".to_string(),
        }))
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<Submission> {
        let opt = get_entity::<Submission>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn list_by_task(&self, task: Thing) -> CtxResult<Vec<SubmissionView>> {
        let fields = SubmissionView::get_select_query_fields();
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("task".to_string(), task.to_raw());
        let qry = format!(
            "SELECT {fields} FROM {TABLE_NAME} WHERE task=<record>$task ORDER BY r_created DESC;"
        );
        get_list_qry(self.db, QryBindingsVal::new(qry, bindings)).await
    }

    /// Review cascade in one transaction, guarded by a compare-and-swap on
    /// the submission still being pending. Approval completes the task and,
    /// when it was the project's last incomplete one, the project; rejection
    /// sends the task back for revision.
    pub async fn review(
        &self,
        submission_id: Thing,
        task: Thing,
        project: Thing,
        decision: SubmissionStatus,
        review_notes: Option<String>,
    ) -> CtxResult<()> {
        let st_pending = SubmissionStatus::Pending.to_string();
        let task_status = match decision {
            SubmissionStatus::Approved => TaskStatus::Completed,
            _ => TaskStatus::RevisionRequested,
        }
        .to_string();
        let completion_cascade = match decision {
            SubmissionStatus::Approved => {
                let st_task_completed = TaskStatus::Completed.to_string();
                let st_proj_completed = ProjectStatus::Completed.to_string();
                format!("
    LET $remaining = count(SELECT id FROM {TABLE_COL_TASK} WHERE project=$project_id AND status != '{st_task_completed}');
    IF $remaining = 0 {{ UPDATE $project_id SET status='{st_proj_completed}'; }};")
            }
            _ => String::new(),
        };
        let qry = format!("
    BEGIN TRANSACTION;
    LET $sub = (SELECT * FROM ONLY $submission_id);
    IF $sub.status != '{st_pending}' {{ THROW '{THROW_ALREADY_REVIEWED}'; }};
    UPDATE $submission_id SET status=$decision, review_notes=$review_notes, reviewed_at=time::now();
    UPDATE $task_id SET status='{task_status}';{completion_cascade}
    COMMIT TRANSACTION;
");
        let res = self
            .db
            .query(qry)
            .bind(("submission_id", submission_id))
            .bind(("task_id", task))
            .bind(("project_id", project))
            .bind(("decision", decision.to_string()))
            .bind(("review_notes", review_notes))
            .await
            .map_err(CtxError::from)?;
        res.check().map_err(|err| {
            let msg = err.to_string();
            if msg.contains(THROW_ALREADY_REVIEWED) {
                self.ctx.to_ctx_error(AppError::Conflict {
                    description: THROW_ALREADY_REVIEWED.to_string(),
                })
            } else {
                self.ctx.to_ctx_error(AppError::SurrealDb { source: msg })
            }
        })?;
        Ok(())
    }
}
