mod helpers;

use chrono::{DateTime, Utc};
use marketplace_server::entities::market::project_entity::{Project, ProjectStatus, ProjectView};
use marketplace_server::routes::ApiResponse;
use serde_json::json;
use surrealdb::sql::Datetime;

use crate::helpers::project_helpers::{accept_request, create_project, create_request};
use crate::helpers::user_helpers::{login_user, register_buyer, register_solver};

test_with_server!(buyer_creates_open_project, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let project = create_project(&server, &buyer.token).await;
    assert_eq!(project.status, ProjectStatus::Open);
    assert!(project.assigned_solver.is_none());
    assert_eq!(project.buyer, buyer.user.id.unwrap());
});

test_with_server!(solver_cannot_create_project, |server, ctx_state, config| {
    let solver = register_solver(&server).await;
    let response = server
        .post("/api/projects")
        .authorization_bearer(&solver.token)
        .json(&json!({"title": "t", "description": "d"}))
        .await;
    response.assert_status_forbidden();
});

test_with_server!(project_requires_title_and_description, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let response = server
        .post("/api/projects")
        .authorization_bearer(&buyer.token)
        .json(&json!({"title": "", "description": ""}))
        .await;
    response.assert_status_bad_request();
});

test_with_server!(project_visibility_per_role, |server, ctx_state, config| {
    let buyer_a = register_buyer(&server).await;
    let buyer_b = register_buyer(&server).await;
    let solver = register_solver(&server).await;
    let admin = login_user(&server, &config.admin_email, &config.admin_password).await;

    let project_a = create_project(&server, &buyer_a.token).await;
    let project_b = create_project(&server, &buyer_b.token).await;
    let project_a_id = project_a.id.as_ref().unwrap().to_raw();

    // assign project_a to the solver so it stays visible to them once closed
    let request = create_request(&server, &solver.token, &project_a_id).await;
    accept_request(&server, &buyer_a.token, &request.id.as_ref().unwrap().to_raw()).await;

    let response = server
        .get("/api/projects")
        .authorization_bearer(&buyer_a.token)
        .await;
    response.assert_status_success();
    let visible = response.json::<ApiResponse<Vec<ProjectView>>>().data;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, *project_a.id.as_ref().unwrap());

    // solver: own assignment plus the open market
    let response = server
        .get("/api/projects")
        .authorization_bearer(&solver.token)
        .await;
    response.assert_status_success();
    let visible = response.json::<ApiResponse<Vec<ProjectView>>>().data;
    assert_eq!(visible.len(), 2);

    let response = server
        .get("/api/projects")
        .authorization_bearer(&admin.token)
        .await;
    response.assert_status_success();
    let visible = response.json::<ApiResponse<Vec<ProjectView>>>().data;
    assert_eq!(visible.len(), 2);

    // status filter narrows within the visible set
    let response = server
        .get("/api/projects")
        .authorization_bearer(&solver.token)
        .add_query_param("status", "assigned")
        .await;
    response.assert_status_success();
    let visible = response.json::<ApiResponse<Vec<ProjectView>>>().data;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, *project_a.id.as_ref().unwrap());
    assert_eq!(
        visible[0].assigned_solver.as_ref().map(|s| s.id.clone()),
        solver.user.id
    );

    let _ = project_b;
});

test_with_server!(get_project_access_rules, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let other_buyer = register_buyer(&server).await;
    let solver = register_solver(&server).await;

    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    // any solver may inspect an open listing
    let response = server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&solver.token)
        .await;
    response.assert_status_success();

    // an unrelated buyer may not
    let response = server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&other_buyer.token)
        .await;
    response.assert_status_forbidden();

    let response = server
        .get("/api/projects/project:missing")
        .authorization_bearer(&buyer.token)
        .await;
    response.assert_status_not_found();
});

test_with_server!(owner_updates_project_fields, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    let response = server
        .patch(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&buyer.token)
        .json(&json!({"title": "Rework v2", "budget": 2000.0}))
        .await;
    response.assert_status_success();
    let updated = response.json::<ApiResponse<Project>>().data;
    assert_eq!(updated.title, "Rework v2");
    assert_eq!(updated.budget, Some(2000.0));
    assert_eq!(updated.description, project.description);
});

test_with_server!(project_deadline_round_trips, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let deadline: DateTime<Utc> = "2026-10-01T12:00:00Z".parse().unwrap();

    let response = server
        .post("/api/projects")
        .authorization_bearer(&buyer.token)
        .json(&json!({
            "title": "Payment gateway integration",
            "description": "Stripe checkout with webhooks",
            "deadline": deadline,
        }))
        .await;
    response.assert_status_success();
    let project = response.json::<ApiResponse<Project>>().data;
    assert_eq!(project.deadline, Some(Datetime::from(deadline)));

    let project_id = project.id.as_ref().unwrap().to_raw();
    let later: DateTime<Utc> = "2026-11-15T09:30:00Z".parse().unwrap();
    let response = server
        .patch(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&buyer.token)
        .json(&json!({"deadline": later}))
        .await;
    response.assert_status_success();
    let updated = response.json::<ApiResponse<Project>>().data;
    assert_eq!(updated.deadline, Some(Datetime::from(later)));
    assert_eq!(updated.title, project.title);

    let response = server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&buyer.token)
        .await;
    response.assert_status_success();
    let view = response.json::<ApiResponse<ProjectView>>().data;
    assert_eq!(view.deadline, Some(Datetime::from(later)));
});

test_with_server!(status_endpoint_validates_enum, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    let response = server
        .patch(&format!("/api/projects/{project_id}/status"))
        .authorization_bearer(&buyer.token)
        .json(&json!({"status": "cancelled"}))
        .await;
    response.assert_status_success();
    let updated = response.json::<ApiResponse<Project>>().data;
    assert_eq!(updated.status, ProjectStatus::Cancelled);

    let response = server
        .patch(&format!("/api/projects/{project_id}/status"))
        .authorization_bearer(&buyer.token)
        .json(&json!({"status": "paused"}))
        .await;
    response.assert_status_bad_request();
});

test_with_server!(non_owner_cannot_update_project, |server, ctx_state, config| {
    let buyer = register_buyer(&server).await;
    let other_buyer = register_buyer(&server).await;
    let project = create_project(&server, &buyer.token).await;
    let project_id = project.id.as_ref().unwrap().to_raw();

    let response = server
        .patch(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&other_buyer.token)
        .json(&json!({"title": "hijack"}))
        .await;
    response.assert_status_forbidden();
});
