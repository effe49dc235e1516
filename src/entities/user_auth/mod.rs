pub mod authentication_entity;
pub mod local_user_entity;
