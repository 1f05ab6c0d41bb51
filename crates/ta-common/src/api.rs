use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CommonError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    /// Free-text question about the course.
    #[serde(default)]
    pub question: String,
    /// Optional base64-encoded screenshot or photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The trimmed question, or `MissingQuestion` when nothing is left.
    pub fn validated_question(&self) -> Result<&str, CommonError> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(CommonError::MissingQuestion);
        }
        Ok(question)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<CommonError> for ErrorResponse {
    fn from(err: CommonError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub message: String,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    pub message: String,
    pub example: AskRequest,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_trimmed() {
        let req = AskRequest::new("  what is GA5?  ");
        assert_eq!(req.validated_question(), Ok("what is GA5?"));
    }

    #[test]
    fn blank_question_is_rejected() {
        let req = AskRequest::new(" \t\n");
        assert_eq!(req.validated_question(), Err(CommonError::MissingQuestion));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let req: AskRequest = serde_json::from_str("{}").expect("valid json");
        assert!(req.question.is_empty());
        assert!(req.image.is_none());
    }

    #[test]
    fn image_is_omitted_when_absent() {
        let json = serde_json::to_string(&AskRequest::new("hi")).expect("serializes");
        assert_eq!(json, r#"{"question":"hi"}"#);
    }

    #[test]
    fn error_body_uses_display_text() {
        let body = ErrorResponse::from(CommonError::MissingData);
        assert_eq!(body.error, "No data provided");
    }
}
