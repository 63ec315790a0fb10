//! The exporter: one note in, one PDF buffer out.

use crate::error::PipelineError;
use crate::settings::ExportSettings;
use chrono::NaiveDateTime;
use notepress_layout::{
    segment_document, FontSet, FootnoteCompositor, GenerationTicket, LayoutContext, PaginationEngine,
};
use notepress_render_lopdf::LopdfRenderer;
use notepress_traits::{AssetResolver, Rasterizer, TableLayout};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};

/// One export request.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Identifies the document for supersession, e.g. the note's path.
    pub document_id: String,
    pub text: String,
    /// Note title, used for `{title}`, the info dictionary and the title block.
    pub title: String,
    /// Moment used for `{date}` and `{time}`; part of the request so output is reproducible.
    pub timestamp: NaiveDateTime,
    /// TrueType bytes; takes precedence over `ExportSettings::custom_font_path`.
    pub custom_font: Option<Vec<u8>>,
}

impl ExportRequest {
    pub fn new(
        document_id: impl Into<String>,
        text: impl Into<String>,
        title: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            text: text.into(),
            title: title.into(),
            timestamp,
            custom_font: None,
        }
    }

    pub fn with_custom_font(mut self, data: Vec<u8>) -> Self {
        self.custom_font = Some(data);
        self
    }
}

/// The outcome of a successful export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub pdf: Vec<u8>,
    pub page_count: usize,
    /// User-visible problems that did not stop the export.
    pub warnings: Vec<String>,
}

/// Serializes exports of the same document; newer requests supersede older ones.
#[derive(Debug, Default)]
struct DocumentSlot {
    latest: Arc<AtomicU64>,
    running: tokio::sync::Mutex<()>,
}

pub struct NoteExporter {
    pub(crate) settings: ExportSettings,
    pub(crate) resolver: Arc<dyn AssetResolver>,
    pub(crate) rasterizer: Arc<dyn Rasterizer>,
    pub(crate) tables: Arc<dyn TableLayout>,
    slots: Mutex<HashMap<String, Arc<DocumentSlot>>>,
}

impl NoteExporter {
    pub(crate) fn new(
        settings: ExportSettings,
        resolver: Arc<dyn AssetResolver>,
        rasterizer: Arc<dyn Rasterizer>,
        tables: Arc<dyn TableLayout>,
    ) -> Self {
        Self {
            settings,
            resolver,
            rasterizer,
            tables,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    fn slot(&self, document_id: &str) -> Arc<DocumentSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(slots.entry(document_id.to_string()).or_default())
    }

    /// Exports one note.
    ///
    /// Returns `PipelineError::Superseded` if another export of the same
    /// document was requested before this one finished.
    pub async fn export(&self, request: ExportRequest) -> Result<ExportReport, PipelineError> {
        let document_id = request.document_id.clone();
        let slot = self.slot(&document_id);
        // Claim the newest ticket before queueing so a running pass sees it.
        let ticket = GenerationTicket::issue(&slot.latest);
        let result = self.run_exclusive(&slot, request, ticket).await;
        self.release(&document_id, slot);
        result
    }

    async fn run_exclusive(
        &self,
        slot: &DocumentSlot,
        request: ExportRequest,
        ticket: GenerationTicket,
    ) -> Result<ExportReport, PipelineError> {
        let _running = slot.running.lock().await;
        ticket.check()?;

        log::info!("Exporting '{}' (generation {})", request.document_id, ticket.id());
        self.generate(request, ticket).await
    }

    /// Drops the slot once no other export of the document holds it.
    fn release(&self, document_id: &str, slot: Arc<DocumentSlot>) {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        drop(slot);
        if slots.get(document_id).is_some_and(|s| Arc::strong_count(s) == 1) {
            slots.remove(document_id);
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    async fn custom_font_bytes(&self, request: &ExportRequest, warnings: &mut Vec<String>) -> Option<Vec<u8>> {
        if let Some(data) = &request.custom_font {
            return Some(data.clone());
        }
        let path = self.settings.custom_font_path.as_ref()?;
        match tokio::fs::read(path).await {
            Ok(data) => Some(data),
            Err(e) => {
                let msg = format!("Custom font '{}' could not be read ({}); using Helvetica", path.display(), e);
                log::warn!("{}", msg);
                warnings.push(msg);
                None
            }
        }
    }

    async fn generate(&self, request: ExportRequest, ticket: GenerationTicket) -> Result<ExportReport, PipelineError> {
        let settings = &self.settings;
        let mut warnings = Vec::new();

        let custom_font = self.custom_font_bytes(&request, &mut warnings).await;
        ticket.check()?;
        let font_family = if custom_font.is_none() && settings.custom_font_path.is_some() {
            "helvetica"
        } else {
            settings.font_family.as_str()
        };
        let (fonts, font_warnings) = FontSet::resolve(font_family, custom_font);
        warnings.extend(font_warnings);

        let ctx = LayoutContext::new(&settings.layout_config(), fonts);
        let blocks = segment_document(&request.text, settings.forced_breaks.clone());
        let title = settings.include_title.then_some(request.title.as_str());

        let engine = PaginationEngine::new(&ctx, self.resolver.as_ref(), self.rasterizer.as_ref(), self.tables.as_ref())
            .with_ticket(ticket.clone());
        let mut doc = engine.paginate(&blocks, title).await?;

        if settings.footnote_enabled {
            FootnoteCompositor::new(settings.footnote_template.as_str(), request.title.as_str(), request.timestamp)
                .stamp(&mut doc, &ctx);
        }
        // Layout may finish without suspending after a newer request arrived.
        ticket.check()?;

        let pdf = LopdfRenderer::new().with_title(request.title.as_str()).render(&doc)?;
        log::info!(
            "Exported '{}': {} pages, {} bytes, {} warnings",
            request.document_id,
            doc.page_count(),
            pdf.len(),
            warnings.len()
        );
        Ok(ExportReport {
            pdf,
            page_count: doc.page_count(),
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ExporterBuilder;
    use chrono::NaiveDate;
    use notepress_layout::GridTableLayout;
    use notepress_traits::{TableCanvas, TableData, TableError, TableStyle};
    use std::sync::OnceLock;
    use std::sync::atomic::Ordering;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap()
    }

    /// Grid layout that announces a newer request while it runs.
    #[derive(Debug, Default)]
    struct InterruptingTables {
        latest: OnceLock<Arc<AtomicU64>>,
    }

    impl TableLayout for InterruptingTables {
        fn layout(&self, data: &TableData, style: &TableStyle, canvas: &mut dyn TableCanvas) -> Result<f32, TableError> {
            if let Some(latest) = self.latest.get() {
                latest.fetch_add(1, Ordering::SeqCst);
            }
            GridTableLayout.layout(data, style, canvas)
        }

        fn name(&self) -> &'static str {
            "InterruptingTables"
        }
    }

    #[tokio::test]
    async fn stale_pass_without_suspension_is_discarded() {
        let tables = Arc::new(InterruptingTables::default());
        let exporter = ExporterBuilder::new().with_table_layout(tables.clone()).build().unwrap();
        let slot = exporter.slot("t.md");
        tables.latest.set(Arc::clone(&slot.latest)).unwrap();

        let result = exporter
            .export(ExportRequest::new("t.md", "| a |\n|---|\n| 1 |", "t", timestamp()))
            .await;
        assert!(matches!(result, Err(PipelineError::Superseded)));
    }

    #[tokio::test]
    async fn finished_exports_release_their_slots() {
        let exporter = ExporterBuilder::new().build().unwrap();
        for id in ["a.md", "b.md", "a.md"] {
            exporter
                .export(ExportRequest::new(id, "text", "t", timestamp()))
                .await
                .unwrap();
        }
        assert_eq!(exporter.slot_count(), 0);

        let held = exporter.slot("c.md");
        exporter
            .export(ExportRequest::new("c.md", "text", "c", timestamp()))
            .await
            .unwrap();
        assert_eq!(exporter.slot_count(), 1);
        drop(held);
    }

    #[tokio::test]
    async fn unknown_font_is_reported_and_replaced() {
        let settings = ExportSettings {
            font_family: "Comic Sans".into(),
            ..Default::default()
        };
        let exporter = ExporterBuilder::new().with_settings(settings).build().unwrap();
        let report = exporter
            .export(ExportRequest::new("a.md", "hello", "a", timestamp()))
            .await
            .unwrap();
        assert_eq!(report.page_count, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Comic Sans"));
    }

    #[tokio::test]
    async fn broken_custom_font_falls_back() {
        let exporter = ExporterBuilder::new().build().unwrap();
        let request = ExportRequest::new("a.md", "hello", "a", timestamp()).with_custom_font(vec![1, 2, 3]);
        let report = exporter.export(request).await.unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn missing_font_file_falls_back() {
        let settings = ExportSettings {
            font_family: "Fancy".into(),
            custom_font_path: Some("/definitely/not/here.ttf".into()),
            ..Default::default()
        };
        let exporter = ExporterBuilder::new().with_settings(settings).build().unwrap();
        let report = exporter
            .export(ExportRequest::new("a.md", "hello", "a", timestamp()))
            .await
            .unwrap();
        assert_eq!(report.warnings.len(), 1);
    }
}
