use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use marketplace_server::entities::market::project_entity::Project;
use marketplace_server::entities::market::project_request_entity::ProjectRequest;
use marketplace_server::entities::market::submission_entity::Submission;
use marketplace_server::entities::market::task_entity::Task;
use marketplace_server::routes::ApiResponse;
use serde_json::json;

#[allow(dead_code)]
pub async fn create_project(server: &TestServer, buyer_token: &str) -> Project {
    let response = server
        .post("/api/projects")
        .authorization_bearer(buyer_token)
        .json(&json!({
            "title": "Landing page rework",
            "description": "Rebuild the landing page with the new brand",
            "budget": 1500.0,
        }))
        .await;
    response.assert_status_success();
    response.json::<ApiResponse<Project>>().data
}

#[allow(dead_code)]
pub async fn create_request(
    server: &TestServer,
    solver_token: &str,
    project_id: &str,
) -> ProjectRequest {
    let response = server
        .post("/api/requests")
        .authorization_bearer(solver_token)
        .json(&json!({
            "project_id": project_id,
            "message": "I can take this on",
        }))
        .await;
    response.assert_status_success();
    response.json::<ApiResponse<ProjectRequest>>().data
}

#[allow(dead_code)]
pub async fn accept_request(
    server: &TestServer,
    buyer_token: &str,
    request_id: &str,
) -> ProjectRequest {
    let response = server
        .patch(&format!("/api/requests/{request_id}/accept"))
        .authorization_bearer(buyer_token)
        .await;
    response.assert_status_success();
    response.json::<ApiResponse<ProjectRequest>>().data
}

#[allow(dead_code)]
pub async fn create_task(
    server: &TestServer,
    solver_token: &str,
    project_id: &str,
    title: &str,
) -> Task {
    let response = server
        .post("/api/tasks")
        .authorization_bearer(solver_token)
        .json(&json!({
            "project_id": project_id,
            "title": title,
        }))
        .await;
    response.assert_status_success();
    response.json::<ApiResponse<Task>>().data
}

#[allow(dead_code)]
pub async fn upload_submission_raw(
    server: &TestServer,
    solver_token: &str,
    task_id: &str,
    file_name: &str,
    mime_type: &str,
    bytes: Vec<u8>,
) -> TestResponse {
    let part = Part::bytes(bytes).file_name(file_name).mime_type(mime_type);
    let form = MultipartForm::new()
        .add_text("task_id", task_id)
        .add_text("notes", "first pass")
        .add_part("file", part);
    server
        .post("/api/submissions")
        .authorization_bearer(solver_token)
        .multipart(form)
        .await
}

#[allow(dead_code)]
pub async fn upload_zip_submission(
    server: &TestServer,
    solver_token: &str,
    task_id: &str,
) -> Submission {
    let response = upload_submission_raw(
        server,
        solver_token,
        task_id,
        "deliverable.zip",
        "application/zip",
        b"PK\x03\x04 deliverable bytes".to_vec(),
    )
    .await;
    response.assert_status_success();
    response.json::<ApiResponse<Submission>>().data
}

#[allow(dead_code)]
pub async fn review_submission(
    server: &TestServer,
    buyer_token: &str,
    submission_id: &str,
    status: &str,
) -> TestResponse {
    server
        .patch(&format!("/api/submissions/{submission_id}/review"))
        .authorization_bearer(buyer_token)
        .json(&json!({"status": status, "review_notes": "reviewed"}))
        .await
}
