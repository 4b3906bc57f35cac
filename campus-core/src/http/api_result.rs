use anyhow::Result;
use bytes::Bytes;
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forms::FieldError;
use crate::is_default;
use crate::store::StoreError;

/// Envelope of every response of the JSON api.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResult {
    pub status: u16,
    #[serde(default, skip_serializing_if = "is_default")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub fields: Option<Vec<FieldError>>,
}

impl ApiResult {
    pub fn ok<T: Serialize>(data: T) -> Self {
        Self::with_status(200, data)
    }

    pub fn created<T: Serialize>(data: T) -> Self {
        Self::with_status(201, data)
    }

    fn with_status<T: Serialize>(status: u16, data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                status,
                data: Some(data),
                ..Default::default()
            },
            Err(e) => {
                log::error!("Unable to encode response: {}", e);
                Self::error(500, format!("Unable to encode response: {}", e))
            }
        }
    }

    pub fn error<T: AsRef<str>>(status: u16, message: T) -> Self {
        Self {
            status,
            error: Some(message.as_ref().to_string()),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_hyper_response(self) -> Result<hyper::Response<Full<Bytes>>> {
        let body = serde_json::to_string(&self)?;
        let response = hyper::Response::builder()
            .status(self.status)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))?;
        Ok(response)
    }
}

impl<T: Serialize> From<Result<T, StoreError>> for ApiResult {
    fn from(result: Result<T, StoreError>) -> Self {
        match result {
            Ok(data) => ApiResult::ok(data),
            Err(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiResult {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => ApiResult::error(404, error.to_string()),
            StoreError::Conflict(message) => ApiResult::error(409, message),
            StoreError::Invalid(errors) => ApiResult {
                status: 422,
                error: Some("Validation failed".to_string()),
                fields: Some(errors.fields),
                ..Default::default()
            },
            StoreError::Backend(e) => {
                log::error!("Request failed: {:#}", e);
                ApiResult::error(500, format!("{:#}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::ValidationErrors;

    #[test]
    fn test_store_errors_map_to_status() {
        let not_found: ApiResult = StoreError::not_found("Course", "c1").into();
        assert_eq!(not_found.status, 404);
        assert_eq!(not_found.error.as_deref(), Some("Course c1 not found"));

        let conflict: ApiResult = StoreError::Conflict("taken".to_string()).into();
        assert_eq!(conflict.status, 409);

        let backend: ApiResult = StoreError::from(anyhow::anyhow!("disk full")).into();
        assert_eq!(backend.status, 500);
        assert!(!backend.is_success());
    }

    #[test]
    fn test_validation_body() {
        let mut errors = ValidationErrors::single("title", "is required");
        errors.push("duration", "must be between 1 and 365");
        let result: ApiResult = StoreError::from(errors).into();
        insta::assert_snapshot!(serde_json::to_string(&result).unwrap(), @r#"{"status":422,"error":"Validation failed","fields":[{"field":"title","message":"is required"},{"field":"duration","message":"must be between 1 and 365"}]}"#);
    }

    #[test]
    fn test_success_body() {
        let result: ApiResult = Ok::<_, StoreError>(vec!["a", "b"]).into();
        assert!(result.is_success());
        insta::assert_snapshot!(serde_json::to_string(&result).unwrap(), @r#"{"status":200,"data":["a","b"]}"#);
    }

    #[test]
    fn test_into_hyper_response() -> Result<()> {
        let response = ApiResult::created("id").into_hyper_response()?;
        assert_eq!(response.status(), 201);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        Ok(())
    }
}
