// src/error.rs
use notepress_layout::LayoutError;
use notepress_render_lopdf::RenderError;
use thiserror::Error;

/// The single error type of one export.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("A newer export of this document superseded this one")]
    Superseded,

    #[error("{0}")]
    Other(String),
}

impl From<LayoutError> for PipelineError {
    fn from(e: LayoutError) -> Self {
        match e {
            LayoutError::Superseded => PipelineError::Superseded,
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Settings(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superseded_layout_maps_to_superseded_export() {
        assert!(matches!(PipelineError::from(LayoutError::Superseded), PipelineError::Superseded));
    }

    #[test]
    fn malformed_settings_json_is_a_settings_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(PipelineError::from(err), PipelineError::Settings(_)));
    }
}
