use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("OpenAPI document not found: {0}")]
    DocumentNotFound(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("template '{template}' has no value for placeholder '{field}'")]
    MissingField { template: String, field: String },

    #[error("invalid ticket: {0}")]
    InvalidTicket(String),

    #[error("invalid OpenAPI document: {0}")]
    InvalidDocument(String),

    #[error(
        "handler name '{name}' derived from both '{first}' and '{second}'; rename one of the paths"
    )]
    HandlerCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
