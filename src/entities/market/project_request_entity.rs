use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::market::project_entity::ProjectStatus;
use crate::entities::user_auth::local_user_entity::UserItemView;
use crate::middleware::utils::db_utils::{
    exists_entity, get_entity, get_list_qry, with_not_found_err, IdentIdName, QryBindingsVal,
    ViewFieldSelector,
};
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(EnumString, Display, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub project: Thing,
    pub solver: Thing,
    pub message: String,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectRequestView {
    pub id: Thing,
    pub project: Thing,
    pub solver: UserItemView,
    pub message: String,
    pub status: RequestStatus,
    pub r_created: Option<DateTime<Utc>>,
}

impl ViewFieldSelector for ProjectRequestView {
    fn get_select_query_fields() -> String {
        "id,
        project,
        solver.{id, full_name, email} as solver,
        message,
        status,
        r_created"
            .to_string()
    }
}

pub struct ProjectRequestDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "project_request";
const TABLE_COL_PROJECT: &str = crate::entities::market::project_entity::TABLE_NAME;
const TABLE_COL_USER: &str = crate::entities::user_auth::local_user_entity::TABLE_NAME;

const THROW_ALREADY_ASSIGNED: &str = "Project is already assigned";

impl<'a> ProjectRequestDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let st_pending = RequestStatus::Pending.to_string();
        let st_accepted = RequestStatus::Accepted.to_string();
        let st_rejected = RequestStatus::Rejected.to_string();
        let sql = format!("
    DEFINE TABLE {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD project ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_PROJECT}>;
    DEFINE INDEX request_project_idx ON TABLE {TABLE_NAME} COLUMNS project;
    DEFINE FIELD solver ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX request_solver_idx ON TABLE {TABLE_NAME} COLUMNS solver;
    DEFINE INDEX request_project_solver_idx ON TABLE {TABLE_NAME} COLUMNS project, solver UNIQUE;
    DEFINE FIELD message ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD status ON TABLE {TABLE_NAME} TYPE string
        ASSERT $value INSIDE ['{st_pending}','{st_accepted}','{st_rejected}'];
    DEFINE INDEX request_status_idx ON TABLE {TABLE_NAME} COLUMNS status;
    DEFINE FIELD r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn create(&self, ct_input: ProjectRequest) -> CtxResult<ProjectRequest> {
        let created: Option<ProjectRequest> = self
            .db
            .create(TABLE_NAME)
            .content(ct_input)
            .await
            .map_err(CtxError::from)?;
        created.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "request not created".to_string(),
        }))
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<ProjectRequest> {
        let opt = get_entity::<ProjectRequest>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn exists_for(&self, project: Thing, solver: Thing) -> CtxResult<bool> {
        let ident = IdentIdName::ColumnIdentAnd(vec![
            IdentIdName::ColumnIdent {
                column: "project".to_string(),
                val: project.to_raw(),
                rec: true,
            },
            IdentIdName::ColumnIdent {
                column: "solver".to_string(),
                val: solver.to_raw(),
                rec: true,
            },
        ]);
        Ok(exists_entity(self.db, TABLE_NAME.to_string(), &ident)
            .await?
            .is_some())
    }

    pub async fn list_by_project(&self, project: Thing) -> CtxResult<Vec<ProjectRequestView>> {
        let fields = ProjectRequestView::get_select_query_fields();
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("project".to_string(), project.to_raw());
        let qry = format!(
            "SELECT {fields} FROM {TABLE_NAME} WHERE project=<record>$project ORDER BY r_created DESC;"
        );
        get_list_qry(self.db, QryBindingsVal::new(qry, bindings)).await
    }

    pub async fn list_by_solver(&self, solver: Thing) -> CtxResult<Vec<ProjectRequest>> {
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("solver".to_string(), solver.to_raw());
        let qry = format!(
            "SELECT * FROM {TABLE_NAME} WHERE solver=<record>$solver ORDER BY r_created DESC;"
        );
        get_list_qry(self.db, QryBindingsVal::new(qry, bindings)).await
    }

    /// Accept cascade in one transaction: flips the request to accepted,
    /// rejects the project's other pending requests and assigns the project.
    /// Guarded by a compare-and-swap on the project still being open so a
    /// concurrent accept loses with a Conflict.
    pub async fn accept(&self, request: &ProjectRequest) -> CtxResult<()> {
        let request_id = request
            .id
            .clone()
            .ok_or(self.ctx.to_ctx_error(AppError::Generic {
                description: "can not accept request with no id".to_string(),
            }))?;
        let st_open = ProjectStatus::Open.to_string();
        let st_assigned = ProjectStatus::Assigned.to_string();
        let st_accepted = RequestStatus::Accepted.to_string();
        let st_pending = RequestStatus::Pending.to_string();
        let st_rejected = RequestStatus::Rejected.to_string();
        let qry = format!("
    BEGIN TRANSACTION;
    LET $proj = (SELECT * FROM ONLY $project_id);
    IF $proj.status != '{st_open}' {{ THROW '{THROW_ALREADY_ASSIGNED}'; }};
    UPDATE $request_id SET status='{st_accepted}';
    UPDATE {TABLE_NAME} SET status='{st_rejected}'
        WHERE project=$project_id AND status='{st_pending}' AND id != $request_id;
    UPDATE $project_id SET status='{st_assigned}', assigned_solver=$solver_id;
    COMMIT TRANSACTION;
");
        let res = self
            .db
            .query(qry)
            .bind(("project_id", request.project.clone()))
            .bind(("request_id", request_id))
            .bind(("solver_id", request.solver.clone()))
            .await
            .map_err(CtxError::from)?;
        res.check().map_err(|err| {
            let msg = err.to_string();
            if msg.contains(THROW_ALREADY_ASSIGNED) {
                self.ctx.to_ctx_error(AppError::Conflict {
                    description: THROW_ALREADY_ASSIGNED.to_string(),
                })
            } else {
                self.ctx.to_ctx_error(AppError::SurrealDb { source: msg })
            }
        })?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        request: Thing,
        status: RequestStatus,
    ) -> CtxResult<ProjectRequest> {
        let ident = request.to_raw();
        let mut res = self
            .db
            .query("UPDATE $id SET status=$status;")
            .bind(("id", request))
            .bind(("status", status.to_string()))
            .await
            .map_err(CtxError::from)?;
        let updated: Option<ProjectRequest> = res.take(0)?;
        with_not_found_err(updated, self.ctx, ident.as_str())
    }
}
