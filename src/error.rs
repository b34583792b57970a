use thiserror::Error;

/// Errors raised while preparing or running a cell type annotation.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// No scoring backend is available. Carries the package that provides one
    /// and instructions on how to enable it.
    #[error("missing dependency `{package}`: {remedy}")]
    DependencyMissing {
        package: &'static str,
        remedy: String,
    },

    /// A tunable is out of range or names an unsupported method.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Labels and matrix dimensions disagree.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Failure inside one of the statistical helpers.
    #[error(transparent)]
    Statistics(#[from] anyhow::Error),
}

impl AnnotationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AnnotationError::InvalidArgument(message.into())
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        AnnotationError::ShapeMismatch(message.into())
    }

    pub(crate) fn missing_point_annotator() -> Self {
        AnnotationError::DependencyMissing {
            package: "point-annotator",
            remedy: "enable the scoring backend with \
                     `single-annotation = { version = \"0.1\", features = [\"point-annotator\"] }` \
                     or pass your own scorer to `Annotator::with_scorer`"
                .to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
