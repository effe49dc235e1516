#[macro_export]
macro_rules! test_with_server {
    ($name:ident, |$server:ident, $ctx_state:ident, $config:ident| $body:block) => {
        #[tokio::test(flavor = "multi_thread")]
        #[serial_test::serial]
        async fn $name() {
            use axum_test::{TestServer, TestServerConfig};
            use futures::FutureExt;
            use marketplace_server::config::AppConfig;
            use marketplace_server::database::client::{Database, DbConfig};
            use marketplace_server::middleware::mw_ctx::create_ctx_state;
            use std::panic::resume_unwind;

            let $config = AppConfig {
                port: 0,
                db_namespace: "test".to_string(),
                db_database: "test".to_string(),
                db_username: None,
                db_password: None,
                db_url: "mem://".to_string(),
                jwt_secret: "secret".to_string(),
                jwt_duration_days: 1,
                upload_file_size_max_mb: 50,
                uploads_dir: "target/tests_media".to_string(),
                admin_email: "admin@test.local".to_string(),
                admin_password: "admin-pass123".to_string(),
                is_development: true,
            };

            let $ctx_state = {
                let db = Database::connect(DbConfig {
                    url: &$config.db_url,
                    database: &$config.db_database,
                    namespace: &$config.db_namespace,
                    username: $config.db_username.as_deref(),
                    password: $config.db_password.as_deref(),
                })
                .await;

                marketplace_server::init::run_migrations(&db).await.unwrap();
                create_ctx_state(db, &$config)
            };
            marketplace_server::init::create_admin_user(&$ctx_state)
                .await
                .unwrap();

            let routes_all = marketplace_server::init::main_router(&$ctx_state).await;

            let $server = TestServer::new_with_config(
                routes_all,
                TestServerConfig {
                    transport: None,
                    save_cookies: false,
                    expect_success_by_default: false,
                    restrict_requests_with_http_schema: false,
                    default_content_type: None,
                    default_scheme: None,
                },
            )
            .expect("Failed to create test server");

            let test_result = std::panic::AssertUnwindSafe(async {
                (|| async $body)().await;
            })
            .catch_unwind()
            .await;

            $ctx_state
                .db
                .client
                .query(format!("REMOVE DATABASE {};", $config.db_database))
                .await
                .expect("failed to remove database");

            if let Err(panic) = test_result {
                resume_unwind(panic);
            }
        }
    };
}
