use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("field names required")]
    EmptySchema,
    #[error("field name at position {position} is blank")]
    BlankField { position: usize },
    #[error("duplicate field name: {0}")]
    DuplicateField(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
