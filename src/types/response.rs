use serde::Serialize;
use utoipa::ToSchema;

/// Message-only body for endpoints with nothing else to return (logout,
/// admin confirmations).
#[derive(Debug, Serialize, ToSchema)]
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
