use serde::{Deserialize, Serialize};

pub mod auth;
pub mod projects;
pub mod requests;
pub mod submissions;
pub mod tasks;
pub mod users;

/// Success envelope; errors go out as `{success: false, message}` via
/// `CtxError`'s `IntoResponse`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        ApiResponse {
            success: true,
            data,
        }
    }
}
