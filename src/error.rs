pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("PDF render failed for page {page}")]
    PdfRender {
        page: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("annotation payload is malformed")]
    Parse(#[from] ParseError),
    #[error("{operation} failed: {message}")]
    Persistence {
        operation: &'static str,
        message: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("resource not ready: {0}")]
    ResourceNotReady(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Failure to decode a stored annotation payload.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u32),
    #[error("object {index} is invalid: {reason}")]
    InvalidObject { index: usize, reason: String },
    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

impl From<std::io::Error> for AppError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl AppError {
    pub fn io_with_context(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn pdf_render(page: u32, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::PdfRender {
            page,
            source: Box::new(source),
        }
    }

    pub fn persistence(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Persistence {
            operation,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn resource_not_ready(message: impl Into<String>) -> Self {
        Self::ResourceNotReady(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::{AppError, ParseError};
    use crate::annotation::PageNumber;
    use crate::backend::{FixedPageRenderer, PageRenderer};

    #[test]
    fn render_failure_keeps_the_renderer_error_as_source() {
        let cause = FixedPageRenderer::letter(2)
            .render_page(PageNumber(5), 1.0)
            .expect_err("page 5 is outside a two page document");
        let err = AppError::pdf_render(5, cause);
        assert!(matches!(err, AppError::PdfRender { page: 5, .. }));
        let source = err.source().expect("render error has a source");
        assert!(source.to_string().contains("out of range"));
    }

    #[test]
    fn persistence_error_names_operation() {
        let err = AppError::persistence("save", "connection refused");
        assert_eq!(err.to_string(), "save failed: connection refused");
    }

    #[test]
    fn parse_error_converts_into_app_error() {
        let err: AppError = ParseError::UnsupportedVersion(9).into();
        assert!(matches!(err, AppError::Parse(ParseError::UnsupportedVersion(9))));
    }
}
