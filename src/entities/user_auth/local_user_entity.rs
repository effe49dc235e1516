use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::authentication_entity::{
    AuthType, Authentication, AuthenticationDbService,
};
use crate::middleware::error::AppError::EntityFailIdNotFound;
use crate::middleware::utils::db_utils::{
    exists_entity, get_entity, get_entity_view, get_list_qry, with_not_found_err, IdentIdName,
    QryBindingsVal, RecordWithId, ViewFieldSelector,
};
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(EnumString, Display, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Buyer,
    Solver,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<DateTime<Utc>>,
}

/// Compact user shape embedded into project/request/submission views.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserItemView {
    pub id: Thing,
    pub full_name: String,
    pub email: String,
}

impl ViewFieldSelector for UserItemView {
    fn get_select_query_fields() -> String {
        "id, full_name, email".to_string()
    }
}

pub struct EmailIdent(pub String);

impl From<EmailIdent> for IdentIdName {
    fn from(value: EmailIdent) -> Self {
        IdentIdName::ColumnIdent {
            column: "email".to_string(),
            val: value.0.to_lowercase(),
            rec: false,
        }
    }
}

pub struct LocalUserDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "local_user";

impl<'a> LocalUserDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let role_admin = UserRole::Admin.to_string();
        let role_buyer = UserRole::Buyer.to_string();
        let role_solver = UserRole::Solver.to_string();
        let sql = format!("
    DEFINE TABLE {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD email ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value) ASSERT string::is::email($value);
    DEFINE INDEX local_user_email_idx ON TABLE {TABLE_NAME} COLUMNS email UNIQUE;
    DEFINE FIELD full_name ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD role ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['{role_admin}','{role_buyer}','{role_solver}'];
    DEFINE INDEX local_user_role_idx ON TABLE {TABLE_NAME} COLUMNS role;
    DEFINE FIELD bio ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD skills ON TABLE {TABLE_NAME} TYPE option<array<string>>;
    DEFINE FIELD experience ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD portfolio ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn get_ctx_user_thing(&self) -> CtxResult<Thing> {
        let user_id = self.ctx.user_id()?;
        let user_thing = Thing::try_from(user_id.clone()).map_err(|_| {
            self.ctx.to_ctx_error(AppError::Generic {
                description: "error into user Thing".to_string(),
            })
        })?;
        let existing_id = self.exists(IdentIdName::Id(user_thing.clone())).await?;
        match existing_id {
            None => Err(self.ctx.to_ctx_error(EntityFailIdNotFound { ident: user_id })),
            Some(_) => Ok(user_thing),
        }
    }

    pub async fn get_ctx_user(&self) -> CtxResult<LocalUser> {
        let user_thing = self.get_ctx_user_thing().await?;
        self.get(IdentIdName::Id(user_thing)).await
    }

    pub async fn exists(&self, ident: IdentIdName) -> CtxResult<Option<Thing>> {
        exists_entity(self.db, TABLE_NAME.to_string(), &ident).await
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<LocalUser> {
        let opt = get_entity::<LocalUser>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident: IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn create(&self, ct_input: LocalUser, auth: AuthType) -> CtxResult<Thing> {
        let user_thing: Thing = self
            .db
            .create(TABLE_NAME)
            .content(ct_input)
            .await
            .map(|v: Option<RecordWithId>| v.map(|rec| rec.id))
            .map_err(CtxError::from)?
            .ok_or(self.ctx.to_ctx_error(AppError::Generic {
                description: "user not created".to_string(),
            }))?;
        AuthenticationDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .create(Authentication::new(user_thing.clone(), auth))
        .await?;
        Ok(user_thing)
    }

    pub async fn update(&self, mut record: LocalUser) -> CtxResult<LocalUser> {
        let resource = record.id.clone().ok_or(AppError::Generic {
            description: "can not update user with no id".to_string(),
        })?;
        // db-managed timestamps, the VALUE clauses refill them
        record.r_created = None;
        record.r_updated = None;
        let updated: Option<LocalUser> = self
            .db
            .upsert((resource.tb, resource.id.to_raw()))
            .content(record)
            .await
            .map_err(CtxError::from)?;
        updated.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "user not updated".to_string(),
        }))
    }

    pub async fn set_role(&self, user: Thing, role: UserRole) -> CtxResult<LocalUser> {
        let ident = user.to_raw();
        let mut res = self
            .db
            .query("UPDATE $id SET role=$role;")
            .bind(("id", user))
            .bind(("role", role.to_string()))
            .await
            .map_err(CtxError::from)?;
        let updated: Option<LocalUser> = res.take(0)?;
        with_not_found_err(updated, self.ctx, ident.as_str())
    }

    pub async fn list(&self, role: Option<UserRole>) -> CtxResult<Vec<LocalUser>> {
        let mut bindings = std::collections::HashMap::new();
        let qry = match role {
            None => format!("SELECT * FROM {TABLE_NAME} ORDER BY r_created DESC;"),
            Some(role) => {
                bindings.insert("role".to_string(), role.to_string());
                format!("SELECT * FROM {TABLE_NAME} WHERE role=$role ORDER BY r_created DESC;")
            }
        };
        get_list_qry(self.db, QryBindingsVal::new(qry, bindings)).await
    }
}
