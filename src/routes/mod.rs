mod auth;
mod health_check;
mod stores;
mod users;

pub use auth::{login, logout, refresh, CredentialsForm};
pub use health_check::health_check;
pub use stores::{create_store, delete_store, get_store, list_stores};
pub use users::{delete_user, get_user, register};

/// `{"message": ...}` body used by every endpoint without a resource to return
#[derive(serde::Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
