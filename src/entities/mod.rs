pub mod market;
pub mod user_auth;
