mod helpers;

use axum_test::TestServer;
use marketplace_server::entities::market::submission_entity::{
    Submission, SubmissionStatus, SubmissionView,
};
use marketplace_server::entities::market::task_entity::{Task, TaskStatus};
use marketplace_server::routes::auth::AuthData;
use marketplace_server::routes::ApiResponse;

use crate::helpers::project_helpers::{
    accept_request, create_project, create_request, create_task, review_submission,
    upload_submission_raw, upload_zip_submission,
};
use crate::helpers::user_helpers::{register_buyer, register_solver};

async fn project_with_task(server: &TestServer) -> (AuthData, AuthData, String, String) {
    let buyer = register_buyer(server).await;
    let solver = register_solver(server).await;
    let project = create_project(server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();
    let request = create_request(server, &solver.token, &project_id).await;
    accept_request(server, &buyer.token, &request.id.as_ref().unwrap().to_raw()).await;
    let task = create_task(server, &solver.token, &project_id, "deliver it").await;
    let task_id = task.id.as_ref().unwrap().to_raw();
    (buyer, solver, project_id, task_id)
}

test_with_server!(upload_zip_marks_task_submitted, |server, ctx_state, config| {
    let (_buyer, solver, _project_id, task_id) = project_with_task(&server).await;

    let submission = upload_zip_submission(&server, &solver.token, &task_id).await;
    assert_eq!(submission.status, SubmissionStatus::Pending);
    assert_eq!(submission.file_name, "deliverable.zip");
    assert!(submission.file_size > 0);

    let response = server
        .get(&format!("/api/tasks/{task_id}"))
        .authorization_bearer(&solver.token)
        .await;
    let task = response.json::<ApiResponse<Task>>().data;
    assert_eq!(task.status, TaskStatus::Submitted);
});

test_with_server!(upload_rejects_non_zip, |server, ctx_state, config| {
    let (_buyer, solver, _project_id, task_id) = project_with_task(&server).await;

    let response = upload_submission_raw(
        &server,
        &solver.token,
        &task_id,
        "report.pdf",
        "application/pdf",
        b"%PDF-1.4".to_vec(),
    )
    .await;
    response.assert_status_bad_request();
    assert!(response.text().contains("Only ZIP files are allowed"));
});

test_with_server!(upload_is_assigned_solver_only, |server, ctx_state, config| {
    let (_buyer, _solver, _project_id, task_id) = project_with_task(&server).await;
    let outsider = register_solver(&server).await;

    let response = upload_submission_raw(
        &server,
        &outsider.token,
        &task_id,
        "deliverable.zip",
        "application/zip",
        b"PK\x03\x04".to_vec(),
    )
    .await;
    response.assert_status_forbidden();
});

test_with_server!(approve_completes_task, |server, ctx_state, config| {
    let (buyer, solver, _project_id, task_id) = project_with_task(&server).await;
    let submission = upload_zip_submission(&server, &solver.token, &task_id).await;
    let submission_id = submission.id.as_ref().unwrap().to_raw();

    let response = review_submission(&server, &buyer.token, &submission_id, "approved").await;
    response.assert_status_success();
    let reviewed = response.json::<ApiResponse<Submission>>().data;
    assert_eq!(reviewed.status, SubmissionStatus::Approved);
    assert!(reviewed.reviewed_at.is_some());
    assert_eq!(reviewed.review_notes.as_deref(), Some("reviewed"));

    let response = server
        .get(&format!("/api/tasks/{task_id}"))
        .authorization_bearer(&buyer.token)
        .await;
    let task = response.json::<ApiResponse<Task>>().data;
    assert_eq!(task.status, TaskStatus::Completed);
});

test_with_server!(reject_requests_revision, |server, ctx_state, config| {
    let (buyer, solver, _project_id, task_id) = project_with_task(&server).await;
    let submission = upload_zip_submission(&server, &solver.token, &task_id).await;
    let submission_id = submission.id.as_ref().unwrap().to_raw();

    let response = review_submission(&server, &buyer.token, &submission_id, "rejected").await;
    response.assert_status_success();

    let response = server
        .get(&format!("/api/tasks/{task_id}"))
        .authorization_bearer(&buyer.token)
        .await;
    let task = response.json::<ApiResponse<Task>>().data;
    assert_eq!(task.status, TaskStatus::RevisionRequested);
});

test_with_server!(double_review_fails, |server, ctx_state, config| {
    let (buyer, solver, _project_id, task_id) = project_with_task(&server).await;
    let submission = upload_zip_submission(&server, &solver.token, &task_id).await;
    let submission_id = submission.id.as_ref().unwrap().to_raw();

    review_submission(&server, &buyer.token, &submission_id, "approved")
        .await
        .assert_status_success();
    let response = review_submission(&server, &buyer.token, &submission_id, "rejected").await;
    response.assert_status_bad_request();
    assert!(response.text().contains("Submission has already been reviewed"));
});

test_with_server!(review_validates_decision, |server, ctx_state, config| {
    let (buyer, solver, _project_id, task_id) = project_with_task(&server).await;
    let submission = upload_zip_submission(&server, &solver.token, &task_id).await;
    let submission_id = submission.id.as_ref().unwrap().to_raw();

    let response = review_submission(&server, &buyer.token, &submission_id, "pending").await;
    response.assert_status_bad_request();

    let response = review_submission(&server, &buyer.token, &submission_id, "maybe").await;
    response.assert_status_bad_request();
});

test_with_server!(solver_cannot_review, |server, ctx_state, config| {
    let (_buyer, solver, _project_id, task_id) = project_with_task(&server).await;
    let submission = upload_zip_submission(&server, &solver.token, &task_id).await;
    let submission_id = submission.id.as_ref().unwrap().to_raw();

    let response = review_submission(&server, &solver.token, &submission_id, "approved").await;
    response.assert_status_forbidden();
});

test_with_server!(submissions_listing_for_members, |server, ctx_state, config| {
    let (buyer, solver, _project_id, task_id) = project_with_task(&server).await;
    upload_zip_submission(&server, &solver.token, &task_id).await;

    let response = server
        .get(&format!("/api/submissions/task/{task_id}"))
        .authorization_bearer(&buyer.token)
        .await;
    response.assert_status_success();
    let submissions = response.json::<ApiResponse<Vec<SubmissionView>>>().data;
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].solver.id, solver.user.id.clone().unwrap());

    let outsider = register_solver(&server).await;
    let response = server
        .get(&format!("/api/submissions/task/{task_id}"))
        .authorization_bearer(&outsider.token)
        .await;
    response.assert_status_forbidden();
});

test_with_server!(download_returns_archive, |server, ctx_state, config| {
    let (buyer, solver, _project_id, task_id) = project_with_task(&server).await;
    let submission = upload_zip_submission(&server, &solver.token, &task_id).await;
    let submission_id = submission.id.as_ref().unwrap().to_raw();

    let response = server
        .get(&format!("/api/submissions/{submission_id}/download"))
        .authorization_bearer(&buyer.token)
        .await;
    response.assert_status_success();
    assert_eq!(
        response.as_bytes().to_vec(),
        b"PK\x03\x04 deliverable bytes".to_vec()
    );

    let outsider = register_solver(&server).await;
    let response = server
        .get(&format!("/api/submissions/{submission_id}/download"))
        .authorization_bearer(&outsider.token)
        .await;
    response.assert_status_forbidden();
});

test_with_server!(submission_requires_auth, |server, ctx_state, config| {
    let response = server.get("/api/submissions/task/task:any").await;
    response.assert_status_unauthorized();
});
