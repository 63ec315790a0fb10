use clap::{Parser, ValueEnum};
use notepress::{ExportRequest, ExportSettings, ExporterBuilder, PipelineError, Theme};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

/// Export a markdown note to a paginated PDF.
#[derive(Debug, Parser)]
#[command(name = "notepress", version)]
struct Cli {
    /// The note to export.
    input: PathBuf,

    /// Where to write the PDF; defaults to the note path with a .pdf extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON settings file; flags below override it.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Built-in font family (helvetica, times, courier).
    #[arg(long)]
    font: Option<String>,

    /// TrueType file to embed instead of a built-in family.
    #[arg(long)]
    font_file: Option<PathBuf>,

    /// Stamp source line numbers in the margin.
    #[arg(long)]
    gutter: bool,

    /// Footer template, e.g. "{title} - Page {page} of {total}".
    #[arg(long, num_args = 0..=1, default_missing_value = notepress::DEFAULT_FOOTNOTE_TEMPLATE)]
    footnote: Option<String>,

    /// Start a new page at this 1-based source line. Repeatable.
    #[arg(long = "break", value_name = "LINE")]
    breaks: Vec<usize>,

    /// Set the note title above the first line.
    #[arg(long)]
    title: bool,
}

impl Cli {
    fn settings(&self) -> Result<ExportSettings, PipelineError> {
        let mut settings = match &self.settings {
            Some(path) => ExportSettings::from_json(&std::fs::read_to_string(path)?)?,
            None => ExportSettings::default(),
        };
        if let Some(theme) = self.theme {
            settings.theme = match theme {
                ThemeArg::Light => Theme::Light,
                ThemeArg::Dark => Theme::Dark,
            };
        }
        if let Some(font) = &self.font {
            settings.font_family = font.clone();
        }
        if let Some(path) = &self.font_file {
            settings.custom_font_path = Some(path.clone());
            if self.font.is_none() {
                settings.font_family = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "custom".to_string());
            }
        }
        settings.gutter |= self.gutter;
        if let Some(template) = &self.footnote {
            settings.footnote_enabled = true;
            settings.footnote_template = template.clone();
        }
        settings.forced_breaks.extend(self.breaks.iter().copied());
        settings.include_title |= self.title;
        settings.validate()?;
        Ok(settings)
    }
}

fn note_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    env_logger::init();
    let cli = Cli::parse();

    let text = tokio::fs::read_to_string(&cli.input).await.map_err(|e| {
        PipelineError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read note '{}': {}", cli.input.display(), e),
        ))
    })?;
    let asset_dir = cli.input.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    let output = cli.output.clone().unwrap_or_else(|| cli.input.with_extension("pdf"));

    let exporter = ExporterBuilder::new()
        .with_settings(cli.settings()?)
        .with_asset_dir(&asset_dir)
        .build()?;

    let start = Instant::now();
    let request = ExportRequest::new(
        cli.input.display().to_string(),
        text,
        note_title(&cli.input),
        chrono::Local::now().naive_local(),
    );
    let report = exporter.export(request).await?;
    tokio::fs::write(&output, &report.pdf).await?;

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    println!(
        "Wrote {} ({} pages) in {:.2?}",
        output.display(),
        report.page_count,
        start.elapsed()
    );
    Ok(())
}
