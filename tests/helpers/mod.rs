pub mod project_helpers;
pub mod test_with_server;
pub mod user_helpers;
