use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AuthType {
    PASSWORD(Option<String>), // password hash
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::PASSWORD(_) => "PASSWORD",
        }
    }

    pub fn as_val(&self) -> Option<String> {
        match self {
            AuthType::PASSWORD(hash) => hash.clone(),
        }
    }
}

/// Credential row, kept apart from the user profile so password hashes
/// never travel with user records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Authentication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub local_user: Thing,
    pub auth_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Authentication {
    pub fn new(local_user: Thing, auth: AuthType) -> Authentication {
        Authentication {
            id: None,
            local_user,
            auth_type: auth.as_str().to_string(),
            token: auth.as_val(),
        }
    }
}

pub struct AuthenticationDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "authentication";
const TABLE_COL_USER: &str = crate::entities::user_auth::local_user_entity::TABLE_NAME;

impl<'a> AuthenticationDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD local_user ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX local_user_idx ON TABLE {TABLE_NAME} COLUMNS local_user;
    DEFINE FIELD auth_type ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['PASSWORD'];
    DEFINE INDEX local_user_auth_type_idx ON TABLE {TABLE_NAME} COLUMNS local_user, auth_type UNIQUE;
    DEFINE FIELD token ON TABLE {TABLE_NAME} TYPE option<string>;
");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn create(&self, auth: Authentication) -> CtxResult<Authentication> {
        let created: Option<Authentication> = self
            .db
            .create(TABLE_NAME)
            .content(auth)
            .await
            .map_err(CtxError::from)?;
        created.ok_or(self.ctx.to_ctx_error(AppError::Generic {
            description: "authentication not created".to_string(),
        }))
    }

    pub async fn get_by_user(&self, local_user: Thing, auth_type: &str) -> CtxResult<Option<Authentication>> {
        let mut res = self
            .db
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE local_user=<record>$local_user AND auth_type=$auth_type;"
            ))
            .bind(("local_user", local_user.to_raw()))
            .bind(("auth_type", auth_type.to_string()))
            .await
            .map_err(CtxError::from)?;
        let auth: Option<Authentication> = res.take(0)?;
        Ok(auth)
    }
}
