use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Font embedding error: {0}")]
    Font(String),
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_lopdf_failures_convert() {
        let io: RenderError = std::io::Error::new(std::io::ErrorKind::WriteZero, "short write").into();
        assert!(matches!(io, RenderError::Io(_)));
        let err = lopdf::Document::load_mem(b"not a pdf").unwrap_err();
        assert!(matches!(RenderError::from(err), RenderError::Pdf(_)));
    }
}
