use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Identifier must not be empty: {0}")]
    EmptyIdentifier(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
