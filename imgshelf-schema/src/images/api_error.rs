use serde::{Deserialize, Serialize};

/// Error payload returned by every image endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiErrorBody {
    /// Human readable, client safe summary.
    pub message: String,

    /// Stable machine readable code such as `NOT_FOUND`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: Some(code.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_missing_code() {
        let body = ApiErrorBody {
            message: "Server Error".to_string(),
            error: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"message":"Server Error"}"#);
    }

    #[test]
    fn carries_code() {
        let body = ApiErrorBody::new("Image not found", "NOT_FOUND");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"message":"Image not found","error":"NOT_FOUND"}"#);
    }
}
