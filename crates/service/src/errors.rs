use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("restaurant name already exists")]
    NameAlreadyExists,
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// HTTP status the response layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) | ServiceError::NameAlreadyExists => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Model(models::errors::ModelError::Validation(_)) => 400,
            ServiceError::Model(models::errors::ModelError::Db(_)) | ServiceError::Db(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(ServiceError::NameAlreadyExists.status_code(), 400);
        assert_eq!(ServiceError::not_found("restaurant").status_code(), 404);
        assert_eq!(ServiceError::Db("down".into()).status_code(), 500);
        assert_eq!(ServiceError::Model(models::errors::ModelError::Validation("x".into())).status_code(), 400);
        assert_eq!(ServiceError::Validation(ValidationErrors::default()).status_code(), 400);
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(ServiceError::not_found("restaurant").to_string(), "restaurant not found");
    }
}
