use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity::UserItemView;
use crate::middleware::utils::db_utils::{
    get_entity, get_entity_view, get_list_qry, with_not_found_err, IdentIdName, QryBindingsVal,
    ViewFieldSelector,
};
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(EnumString, Display, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn accepts_requests(&self) -> bool {
        matches!(self, ProjectStatus::Open)
    }

    pub fn accepts_tasks(&self) -> bool {
        matches!(
            self,
            ProjectStatus::Assigned | ProjectStatus::InProgress
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    pub buyer: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_solver: Option<Thing>,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: Thing,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub buyer: UserItemView,
    pub assigned_solver: Option<UserItemView>,
    pub status: ProjectStatus,
    pub budget: Option<f64>,
    pub deadline: Option<Datetime>,
    pub r_created: Option<DateTime<Utc>>,
    pub r_updated: Option<DateTime<Utc>>,
}

impl ViewFieldSelector for ProjectView {
    fn get_select_query_fields() -> String {
        "id,
        title,
        description,
        requirements,
        buyer.{id, full_name, email} as buyer,
        assigned_solver.{id, full_name, email} as assigned_solver,
        status,
        budget,
        deadline,
        r_created,
        r_updated"
            .to_string()
    }
}

pub struct ProjectDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "project";
const TABLE_COL_USER: &str = crate::entities::user_auth::local_user_entity::TABLE_NAME;

impl<'a> ProjectDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let st_open = ProjectStatus::Open.to_string();
        let st_assigned = ProjectStatus::Assigned.to_string();
        let st_in_progress = ProjectStatus::InProgress.to_string();
        let st_completed = ProjectStatus::Completed.to_string();
        let st_cancelled = ProjectStatus::Cancelled.to_string();
        let sql = format!("
    DEFINE TABLE {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD description ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD requirements ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD buyer ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX project_buyer_idx ON TABLE {TABLE_NAME} COLUMNS buyer;
    DEFINE FIELD assigned_solver ON TABLE {TABLE_NAME} TYPE option<record<{TABLE_COL_USER}>>;
    DEFINE INDEX project_assigned_solver_idx ON TABLE {TABLE_NAME} COLUMNS assigned_solver;
    DEFINE FIELD status ON TABLE {TABLE_NAME} TYPE string
        ASSERT $value INSIDE ['{st_open}','{st_assigned}','{st_in_progress}','{st_completed}','{st_cancelled}'];
    DEFINE INDEX project_status_idx ON TABLE {TABLE_NAME} COLUMNS status;
    DEFINE FIELD budget ON TABLE {TABLE_NAME} TYPE option<number>;
    DEFINE FIELD deadline ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn create(&self, ct_input: Project) -> CtxResult<Project> {
        let created: Option<Project> = self
            .db
            .create(TABLE_NAME)
            .content(ct_input)
            .await
            .map_err(CtxError::from)?;
        created.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "project not created".to_string(),
        }))
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<Project> {
        let opt = get_entity::<Project>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident: IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn update(&self, mut record: Project) -> CtxResult<Project> {
        let resource = record.id.clone().ok_or(AppError::Generic {
            description: "can not update project with no id".to_string(),
        })?;
        // db-managed timestamps, the VALUE clauses refill them
        record.r_created = None;
        record.r_updated = None;
        let updated: Option<Project> = self
            .db
            .upsert((resource.tb, resource.id.to_raw()))
            .content(record)
            .await
            .map_err(CtxError::from)?;
        updated.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "project not updated".to_string(),
        }))
    }

    pub async fn set_status(&self, project: Thing, status: ProjectStatus) -> CtxResult<Project> {
        let ident = project.to_raw();
        let mut res = self
            .db
            .query("UPDATE $id SET status=$status;")
            .bind(("id", project))
            .bind(("status", status.to_string()))
            .await
            .map_err(CtxError::from)?;
        let updated: Option<Project> = res.take(0)?;
        with_not_found_err(updated, self.ctx, ident.as_str())
    }

    pub async fn list_all(&self, status: Option<ProjectStatus>) -> CtxResult<Vec<ProjectView>> {
        let fields = ProjectView::get_select_query_fields();
        let mut bindings = std::collections::HashMap::new();
        let qry = match status {
            None => format!("SELECT {fields} FROM {TABLE_NAME} ORDER BY r_created DESC;"),
            Some(status) => {
                bindings.insert("status".to_string(), status.to_string());
                format!(
                    "SELECT {fields} FROM {TABLE_NAME} WHERE status=$status ORDER BY r_created DESC;"
                )
            }
        };
        get_list_qry(self.db, QryBindingsVal::new(qry, bindings)).await
    }

    pub async fn list_by_buyer(
        &self,
        buyer: Thing,
        status: Option<ProjectStatus>,
    ) -> CtxResult<Vec<ProjectView>> {
        let fields = ProjectView::get_select_query_fields();
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("buyer".to_string(), buyer.to_raw());
        let qry = match status {
            None => format!(
                "SELECT {fields} FROM {TABLE_NAME} WHERE buyer=<record>$buyer ORDER BY r_created DESC;"
            ),
            Some(status) => {
                bindings.insert("status".to_string(), status.to_string());
                format!(
                    "SELECT {fields} FROM {TABLE_NAME} WHERE buyer=<record>$buyer AND status=$status ORDER BY r_created DESC;"
                )
            }
        };
        get_list_qry(self.db, QryBindingsVal::new(qry, bindings)).await
    }

    // Solvers see the open market plus their own assignments; an explicit
    // status filter narrows within that same visible set.
    pub async fn list_visible_to_solver(
        &self,
        solver: Thing,
        status: Option<ProjectStatus>,
    ) -> CtxResult<Vec<ProjectView>> {
        let fields = ProjectView::get_select_query_fields();
        let st_open = ProjectStatus::Open.to_string();
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("solver".to_string(), solver.to_raw());
        let qry = match status {
            None => format!(
                "SELECT {fields} FROM {TABLE_NAME} WHERE status='{st_open}' OR assigned_solver=<record>$solver ORDER BY r_created DESC;"
            ),
            Some(status) => {
                bindings.insert("status".to_string(), status.to_string());
                format!(
                    "SELECT {fields} FROM {TABLE_NAME} WHERE (status='{st_open}' OR assigned_solver=<record>$solver) AND status=$status ORDER BY r_created DESC;"
                )
            }
        };
        get_list_qry(self.db, QryBindingsVal::new(qry, bindings)).await
    }
}
