pub mod project_entity;
pub mod project_request_entity;
pub mod submission_entity;
pub mod task_entity;
