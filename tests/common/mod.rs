pub mod fixtures;
pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use notepress::{ExportRequest, ExportSettings, ExporterBuilder, NoteExporter, PipelineError};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
    pub warnings: Vec<String>,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self {
            bytes,
            doc,
            warnings: Vec::new(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Text of one 1-based page.
    pub fn page_text(&self, page: u32) -> String {
        self.doc.extract_text(&[page]).unwrap_or_default()
    }

    /// Save PDF to a file for manual debugging
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Exports `text` through `exporter` and loads the result back.
pub async fn export_with(exporter: &NoteExporter, text: &str) -> Result<GeneratedPdf, PipelineError> {
    let request = ExportRequest::new("note.md", text, "note", fixtures::timestamp());
    let report = exporter.export(request).await?;
    let mut pdf = GeneratedPdf::from_bytes(report.pdf).map_err(|e| PipelineError::Other(e.to_string()))?;
    pdf.warnings = report.warnings;
    Ok(pdf)
}

/// Exports `text` with the given settings and default capabilities.
pub async fn export_note(text: &str, settings: ExportSettings) -> Result<GeneratedPdf, PipelineError> {
    let exporter = ExporterBuilder::new().with_settings(settings).build()?;
    export_with(&exporter, text).await
}
