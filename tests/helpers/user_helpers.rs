use axum_test::TestServer;
use fake::{faker, Fake};
use marketplace_server::routes::auth::AuthData;
use marketplace_server::routes::ApiResponse;
use serde_json::json;

pub const TEST_PASSWORD: &str = "some3242paSs#$";

#[allow(dead_code)]
pub async fn register_user(server: &TestServer, role: &str) -> AuthData {
    let email = faker::internet::en::FreeEmail().fake::<String>();
    let full_name = faker::name::en::Name().fake::<String>();
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "full_name": full_name,
            "role": role,
        }))
        .await;
    response.assert_status_success();
    response.json::<ApiResponse<AuthData>>().data
}

#[allow(dead_code)]
pub async fn register_buyer(server: &TestServer) -> AuthData {
    register_user(server, "buyer").await
}

#[allow(dead_code)]
pub async fn register_solver(server: &TestServer) -> AuthData {
    register_user(server, "solver").await
}

#[allow(dead_code)]
pub async fn login_user(server: &TestServer, email: &str, password: &str) -> AuthData {
    let response = server
        .post("/api/auth/login")
        .json(&json!({"email": email, "password": password}))
        .await;
    response.assert_status_success();
    response.json::<ApiResponse<AuthData>>().data
}
