pub mod club;
pub mod event;
pub mod user;

use serde::{Deserialize, Serialize};

/// `{"message": "..."}` acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
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
