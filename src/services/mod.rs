pub mod auth_service;
pub mod project_service;
pub mod request_service;
pub mod submission_service;
pub mod task_service;
pub mod user_service;
