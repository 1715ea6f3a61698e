/// Domain error taxonomy shared by the repository and API layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Entities resolve by numeric ID or by slug, so the key is a string.
    #[error("Entity not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Not-found for an entity addressed by numeric ID.
    pub fn not_found_id(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            key: id.to_string(),
        }
    }
}
