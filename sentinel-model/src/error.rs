use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    EmptyIdentifier(&'static str),
    InvalidBoundingBox(String),
    InvalidConfidence(f32),
    InvalidTimestamp(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyIdentifier(kind) => {
                write!(f, "{kind} identifier must not be empty")
            }
            ModelError::InvalidBoundingBox(msg) => {
                write!(f, "invalid bounding box: {msg}")
            }
            ModelError::InvalidConfidence(value) => {
                write!(f, "confidence {value} is not a finite number")
            }
            ModelError::InvalidTimestamp(raw) => {
                write!(f, "unrecognised timestamp '{raw}'")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
