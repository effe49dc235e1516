mod helpers;

use marketplace_server::entities::market::project_entity::{ProjectStatus, ProjectView};
use marketplace_server::entities::market::project_request_entity::{
    ProjectRequest, ProjectRequestView, RequestStatus,
};
use std::future::IntoFuture;

use futures::future::join_all;
use marketplace_server::routes::ApiResponse;
use serde_json::json;

use crate::helpers::project_helpers::{accept_request, create_project, create_request};
use crate::helpers::user_helpers::{register_buyer, register_solver};

test_with_server!(solver_submits_request, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;

    let request =
        create_request(&server, &solver.token, &project.id.as_ref().unwrap().to_raw()).await;
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.solver, solver.user.id.unwrap());
});

test_with_server!(buyer_cannot_submit_request, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let project = create_project(&server, &buyer.token).await;

    let response = server
        .post("/api/requests")
        .authorization_bearer(&buyer.token)
        .json(&json!({
            "project_id": project.id.as_ref().unwrap().to_raw(),
            "message": "let me in",
        }))
        .await;
    response.assert_status_forbidden();
});

test_with_server!(request_on_missing_project_not_found, |server, ctx_state, config| {
    let solver = register_solver(&server).await;
    let response = server
        .post("/api/requests")
        .authorization_bearer(&solver.token)
        .json(&json!({"project_id": "project:missing", "message": "hi"}))
        .await;
    response.assert_status_not_found();
});

test_with_server!(request_on_closed_project_fails, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    server
        .patch(&format!("/api/projects/{project_id}/status"))
        .authorization_bearer(&buyer.token)
        .json(&json!({"status": "cancelled"}))
        .await
        .assert_status_success();

    let response = server
        .post("/api/requests")
        .authorization_bearer(&solver.token)
        .json(&json!({"project_id": project_id, "message": "too late"}))
        .await;
    response.assert_status_bad_request();
    assert!(response.text().contains("Project is not accepting requests"));
});

test_with_server!(duplicate_request_fails, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    create_request(&server, &solver.token, &project_id).await;
    let response = server
        .post("/api/requests")
        .authorization_bearer(&solver.token)
        .json(&json!({"project_id": project_id, "message": "again"}))
        .await;
    response.assert_status_bad_request();
    assert!(response
        .text()
        .contains("You have already requested to work on this project"));
});

test_with_server!(accept_cascades_to_siblings_and_project, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver_a = register_solver(&server).await;
    let solver_b = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    let request_a = create_request(&server, &solver_a.token, &project_id).await;
    let request_b = create_request(&server, &solver_b.token, &project_id).await;

    let accepted = accept_request(
        &server,
        &buyer.token,
        &request_a.id.as_ref().unwrap().to_raw(),
    )
    .await;
    assert_eq!(accepted.status, RequestStatus::Accepted);

    let response = server
        .get(&format!("/api/requests/project/{project_id}"))
        .authorization_bearer(&buyer.token)
        .await;
    response.assert_status_success();
    let requests = response.json::<ApiResponse<Vec<ProjectRequestView>>>().data;
    assert_eq!(requests.len(), 2);
    for req in &requests {
        if req.id == *request_a.id.as_ref().unwrap() {
            assert_eq!(req.status, RequestStatus::Accepted);
        } else {
            assert_eq!(req.id, *request_b.id.as_ref().unwrap());
            assert_eq!(req.status, RequestStatus::Rejected);
        }
    }

    let response = server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&buyer.token)
        .await;
    response.assert_status_success();
    let view = response.json::<ApiResponse<ProjectView>>().data;
    assert_eq!(view.status, ProjectStatus::Assigned);
    assert_eq!(
        view.assigned_solver.map(|s| s.id),
        solver_a.user.id
    );
});

test_with_server!(concurrent_accepts_pick_single_winner, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver_a = register_solver(&server).await;
    let solver_b = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    let request_a = create_request(&server, &solver_a.token, &project_id).await;
    let request_b = create_request(&server, &solver_b.token, &project_id).await;

    let responses = join_all([
        server
            .patch(&format!(
                "/api/requests/{}/accept",
                request_a.id.as_ref().unwrap().to_raw()
            ))
            .authorization_bearer(&buyer.token)
            .into_future(),
        server
            .patch(&format!(
                "/api/requests/{}/accept",
                request_b.id.as_ref().unwrap().to_raw()
            ))
            .authorization_bearer(&buyer.token)
            .into_future(),
    ])
    .await;

    let winners = responses
        .iter()
        .filter(|r| r.status_code().is_success())
        .count();
    assert_eq!(winners, 1);

    let response = server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&buyer.token)
        .await;
    let view = response.json::<ApiResponse<ProjectView>>().data;
    assert_eq!(view.status, ProjectStatus::Assigned);
    assert!(view.assigned_solver.is_some());
});

test_with_server!(accept_decided_request_fails, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver_a = register_solver(&server).await;
    let solver_b = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    let request_a = create_request(&server, &solver_a.token, &project_id).await;
    let request_b = create_request(&server, &solver_b.token, &project_id).await;

    accept_request(
        &server,
        &buyer.token,
        &request_a.id.as_ref().unwrap().to_raw(),
    )
    .await;

    // the sibling was auto-rejected; no transition leads back from there
    let response = server
        .patch(&format!(
            "/api/requests/{}/accept",
            request_b.id.as_ref().unwrap().to_raw()
        ))
        .authorization_bearer(&buyer.token)
        .await;
    response.assert_status_bad_request();
    assert!(response.text().contains("Request has already been processed"));
});

test_with_server!(only_owner_accepts, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let other_buyer = register_buyer(&server).await;
    let solver = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let request =
        create_request(&server, &solver.token, &project.id.as_ref().unwrap().to_raw()).await;

    let response = server
        .patch(&format!(
            "/api/requests/{}/accept",
            request.id.as_ref().unwrap().to_raw()
        ))
        .authorization_bearer(&other_buyer.token)
        .await;
    response.assert_status_forbidden();
});

test_with_server!(reject_leaves_project_open, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();
    let request = create_request(&server, &solver.token, &project_id).await;

    let response = server
        .patch(&format!(
            "/api/requests/{}/reject",
            request.id.as_ref().unwrap().to_raw()
        ))
        .authorization_bearer(&buyer.token)
        .await;
    response.assert_status_success();
    let rejected = response.json::<ApiResponse<ProjectRequest>>().data;
    assert_eq!(rejected.status, RequestStatus::Rejected);

    let response = server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&buyer.token)
        .await;
    let view = response.json::<ApiResponse<ProjectView>>().data;
    assert_eq!(view.status, ProjectStatus::Open);
    assert!(view.assigned_solver.is_none());
});

test_with_server!(solver_lists_own_requests, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver = register_solver(&server).await;
    let other_solver = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    create_request(&server, &solver.token, &project_id).await;
    create_request(&server, &other_solver.token, &project_id).await;

    let response = server
        .get("/api/requests/my")
        .authorization_bearer(&solver.token)
        .await;
    response.assert_status_success();
    let mine = response.json::<ApiResponse<Vec<ProjectRequest>>>().data;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].solver, solver.user.id.unwrap());
});

test_with_server!(request_listing_is_owner_only, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let solver = register_solver(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();
    create_request(&server, &solver.token, &project_id).await;

    let response = server
        .get(&format!("/api/requests/project/{project_id}"))
        .authorization_bearer(&solver.token)
        .await;
    response.assert_status_forbidden();
});
