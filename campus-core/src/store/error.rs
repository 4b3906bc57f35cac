use crate::forms::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    Conflict(String),
    #[error("Validation failed: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found<T: AsRef<str>>(kind: &'static str, id: T) -> Self {
        StoreError::NotFound {
            kind,
            id: id.as_ref().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            StoreError::not_found("Course", "c1").to_string(),
            "Course c1 not found"
        );
        let invalid = StoreError::from(ValidationErrors::single("title", "is required"));
        assert_eq!(invalid.to_string(), "Validation failed: title: is required");
        let backend = StoreError::from(anyhow::anyhow!("disk full"));
        assert_eq!(backend.to_string(), "disk full");
    }
}
