use crate::config::AppConfig;
use crate::database::client::Database;
use crate::interfaces::file_storage::FileStorageInterface;
use crate::utils::file::local_file_storage::LocalFileStorage;
use crate::utils::jwt::JWT;
use chrono::Duration;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub struct CtxState {
    pub db: Database,
    pub is_development: bool,
    pub upload_max_size_mb: u64,
    pub jwt: JWT,
    pub file_storage: Arc<dyn FileStorageInterface + Send + Sync>,
    pub admin_email: String,
    pub admin_password: String,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CTX STATE HERE :)")
    }
}

pub fn create_ctx_state(db: Database, config: &AppConfig) -> Arc<CtxState> {
    let ctx_state = CtxState {
        db,
        is_development: config.is_development,
        upload_max_size_mb: config.upload_file_size_max_mb,
        jwt: JWT::new(
            config.jwt_secret.clone(),
            Duration::days(config.jwt_duration_days),
        ),
        file_storage: Arc::new(LocalFileStorage::new(config.uploads_dir.clone())),
        admin_email: config.admin_email.clone(),
        admin_password: config.admin_password.clone(),
    };
    Arc::new(ctx_state)
}

pub const JWT_KEY: &str = "jwt";
