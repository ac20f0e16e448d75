use serde::{Deserialize, Serialize};

/// Standard API envelope returned by every JSON endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(error),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// A success carrying only a human-readable message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }
}

/// Result of a batch write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::success(3)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": 3}));
    }

    #[test]
    fn message_only_response() {
        let json = serde_json::to_value(ApiResponse::message("Logged out")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "message": "Logged out"}));
    }
}
