/// Runtime-image error types and handling utilities
use thiserror::Error;

/// Main error type for runtime-image operations
#[derive(Debug, Error)]
pub enum RuntimeImageError {
    /// The Dockerfile template text failed to compile
    #[error("Failed to parse runtime Dockerfile template: {0}")]
    TemplateConstruction(#[source] tera::Error),

    /// Rendering the compiled template against a build failed
    #[error("Failed to render runtime Dockerfile: {0}")]
    TemplateExecution(#[source] tera::Error),

    /// A required image reference is missing from the build specification
    #[error("Incomplete build specification: '{field}' must not be empty")]
    IncompleteSpecification { field: &'static str },

    /// The source context directory resolves outside the workspace
    #[error("Source context directory '{dir}' escapes the workspace")]
    InvalidContextDir { dir: String },

    /// The build specification could not be turned into a template context
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RuntimeImageError {
    /// Whether the error was caused by the build specification rather than by
    /// the engine itself. Callers surface these as validation failures.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::IncompleteSpecification { .. } => true,
            Self::InvalidContextDir { .. } => true,
            Self::TemplateExecution(_) => true,
            Self::TemplateConstruction(_) => false,
            Self::Serialization(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeImageError>;
