use dotenvy;

#[derive(Debug)]
pub struct AppConfig {
    pub port: u16,
    pub db_namespace: String,
    pub db_database: String,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
    pub db_url: String,
    pub jwt_secret: String,
    pub jwt_duration_days: i64,
    pub upload_file_size_max_mb: u64,
    pub uploads_dir: String,
    pub admin_email: String,
    pub admin_password: String,
    pub is_development: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let port: u16 = std::env::var("PORT")
            .unwrap_or("5000".to_string())
            .parse()
            .expect("PORT should be number");
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_url = std::env::var("DB_URL").unwrap_or("mem://".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").expect("Missing JWT_SECRET in env");
        let jwt_duration_days: i64 = std::env::var("JWT_DURATION_DAYS")
            .unwrap_or("7".to_string())
            .parse()
            .expect("JWT_DURATION_DAYS should be number");

        let upload_file_size_max_mb: u64 = std::env::var("UPLOAD_MAX_SIZE_MB")
            .unwrap_or("50".to_string())
            .parse()
            .expect("UPLOAD_MAX_SIZE_MB should be number");
        let uploads_dir = std::env::var("UPLOADS_DIRECTORY").unwrap_or("uploads".to_string());

        let admin_email = std::env::var("ADMIN_EMAIL").expect("Missing ADMIN_EMAIL in env");
        let admin_password =
            std::env::var("ADMIN_PASSWORD").expect("Missing ADMIN_PASSWORD in env");

        let is_development = std::env::var("DEVELOPMENT")
            .map(|v| v == "true")
            .unwrap_or(false);

        AppConfig {
            port,
            db_namespace,
            db_database,
            db_username,
            db_password,
            db_url,
            jwt_secret,
            jwt_duration_days,
            upload_file_size_max_mb,
            uploads_dir,
            admin_email,
            admin_password,
            is_development,
        }
    }
}
