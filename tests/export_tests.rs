mod common;

use common::fixtures::*;
use common::pdf_assertions::{extract_font_names, image_draw_count};
use common::{TestResult, export_note, export_with};
use notepress::{ExportRequest, ExportSettings, ExporterBuilder, PipelineError};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_empty_note_has_one_page() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let pdf = export_note("", ExportSettings::default()).await?;
    assert_pdf_page_count!(pdf, 1);
    Ok(())
}

#[tokio::test]
async fn test_same_input_gives_identical_bytes() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let text = "# Title\n\nSome **bold** and *italic* text.\n\n- item\n- item two";
    let settings = ExportSettings {
        footnote_enabled: true,
        gutter: true,
        ..Default::default()
    };
    let first = export_note(text, settings.clone()).await?;
    let second = export_note(text, settings).await?;
    assert_eq!(first.bytes, second.bytes);
    Ok(())
}

#[tokio::test]
async fn test_forced_break_starts_new_page() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let settings = ExportSettings {
        forced_breaks: BTreeSet::from([2]),
        ..Default::default()
    };
    let pdf = export_note("first\nsecond", settings).await?;
    assert_pdf_page_count!(pdf, 2);
    assert!(pdf.page_text(1).contains("first"));
    assert!(!pdf.page_text(1).contains("second"));
    assert!(pdf.page_text(2).contains("second"));
    Ok(())
}

#[tokio::test]
async fn test_long_note_overflows() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let pdf = export_note(&paragraphs(120), ExportSettings::default()).await?;
    assert_pdf_min_pages!(pdf, 2);
    assert_pdf_contains_text!(pdf, "Paragraph");
    assert_pdf_contains_text!(pdf, "120");
    Ok(())
}

#[tokio::test]
async fn test_frontmatter_is_not_printed() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let pdf = export_note("---\nsecret: yes\n---\nBody", ExportSettings::default()).await?;
    assert_pdf_not_contains_text!(pdf, "secret");
    assert_pdf_contains_text!(pdf, "Body");
    Ok(())
}

#[tokio::test]
async fn test_over_wide_token_is_kept_whole() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let token = "x".repeat(400);
    let pdf = export_note(&token, ExportSettings::default()).await?;
    assert_pdf_page_count!(pdf, 1);
    let printed: usize = common::pdf_assertions::extract_text(&pdf.doc)
        .chars()
        .filter(|c| *c == 'x')
        .count();
    assert_eq!(printed, 400);
    Ok(())
}

#[tokio::test]
async fn test_emphasis_selects_font_variants() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let pdf = export_note("plain **bold** *italic* ***both***", ExportSettings::default()).await?;
    let fonts = extract_font_names(&pdf.doc);
    for name in ["Helvetica", "Helvetica-Bold", "Helvetica-Oblique", "Helvetica-BoldOblique"] {
        assert!(fonts.contains(name), "missing {} in {:?}", name, fonts);
    }
    assert_pdf_not_contains_text!(pdf, "**");
    Ok(())
}

#[tokio::test]
async fn test_unclosed_markers_stay_on() -> TestResult {
    let pdf = export_note("**bold then *italic without closing", ExportSettings::default()).await?;
    let fonts = extract_font_names(&pdf.doc);
    assert!(fonts.contains("Helvetica-Bold"));
    assert!(fonts.contains("Helvetica-BoldOblique"));
    assert!(!fonts.contains("Helvetica"));
    Ok(())
}

#[tokio::test]
async fn test_times_family_uses_times_fonts() -> TestResult {
    let settings = ExportSettings {
        font_family: "times".into(),
        ..Default::default()
    };
    let pdf = export_note("hello", settings).await?;
    assert!(extract_font_names(&pdf.doc).contains("Times-Roman"));
    assert!(pdf.warnings.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_image_embed_with_caption() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("attachments"))?;
    std::fs::write(dir.path().join("attachments/cat.png"), png(40, 20))?;

    let exporter = ExporterBuilder::new().with_asset_dir(dir.path()).build()?;
    let pdf = export_with(&exporter, "before\n![[cat.png|A sleepy cat|200]]\nafter").await?;
    assert_eq!(image_draw_count(&pdf.doc, 1), 1);
    assert_pdf_contains_text!(pdf, "A sleepy cat");
    assert_pdf_contains_text!(pdf, "after");
    Ok(())
}

#[tokio::test]
async fn test_missing_image_is_skipped() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir()?;
    let exporter = ExporterBuilder::new().with_asset_dir(dir.path()).build()?;
    let pdf = export_with(&exporter, "![[nowhere.png|Lost]]\ntext").await?;
    assert_pdf_page_count!(pdf, 1);
    assert_eq!(image_draw_count(&pdf.doc, 1), 0);
    assert_pdf_contains_text!(pdf, "text");
    Ok(())
}

#[tokio::test]
async fn test_table_renders_cells() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let pdf = export_note("| Name | Qty |\n|---|---|\n| apples | 3 |", ExportSettings::default()).await?;
    assert_pdf_contains_text!(pdf, "Name");
    assert_pdf_contains_text!(pdf, "apples");
    assert_pdf_not_contains_text!(pdf, "---");
    Ok(())
}

#[tokio::test]
async fn test_forced_break_inside_table_keeps_rows() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let settings = ExportSettings {
        forced_breaks: BTreeSet::from([4]),
        ..Default::default()
    };
    let text = "| H | V |\n|---|---|\n| r1 | 1 |\n| r2 | 2 |\n| r3 | 3 |";
    let pdf = export_note(text, settings).await?;
    assert_pdf_page_count!(pdf, 2);
    assert!(pdf.page_text(1).contains("r1"));
    let second = pdf.page_text(2);
    assert!(second.contains("H") && second.contains("r2") && second.contains("r3"));
    Ok(())
}

#[tokio::test]
async fn test_single_row_table_prints_raw_line() -> TestResult {
    let pdf = export_note("| lonely |", ExportSettings::default()).await?;
    assert_pdf_contains_text!(pdf, "lonely");
    assert_pdf_contains_text!(pdf, "|");
    Ok(())
}

#[tokio::test]
async fn test_footnote_counts_pages() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let settings = ExportSettings {
        footnote_enabled: true,
        forced_breaks: BTreeSet::from([2, 3]),
        ..Default::default()
    };
    let pdf = export_note("one\ntwo\nthree", settings).await?;
    assert_pdf_page_count!(pdf, 3);
    assert!(pdf.page_text(2).contains("note - Page 2 of 3"));
    assert!(pdf.page_text(3).contains("note - Page 3 of 3"));
    Ok(())
}

#[tokio::test]
async fn test_math_without_rasterizer_shows_placeholder() -> TestResult {
    let pdf = export_note("$$x^2$$", ExportSettings::default()).await?;
    assert_pdf_contains_text!(pdf, "[math render failed]");
    Ok(())
}

#[tokio::test]
async fn test_callout_is_rasterized() -> TestResult {
    let exporter = ExporterBuilder::new()
        .with_rasterizer(Arc::new(SolidRasterizer::new(120, 40)))
        .build()?;
    let pdf = export_with(&exporter, "> [!note] Heads up\n> body").await?;
    assert_eq!(image_draw_count(&pdf.doc, 1), 1);
    assert_pdf_not_contains_text!(pdf, "Heads up");
    Ok(())
}

#[tokio::test]
async fn test_newer_export_supersedes_older() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let exporter = ExporterBuilder::new()
        .with_rasterizer(Arc::new(SolidRasterizer::slow(Duration::from_millis(300))))
        .build()?;
    let older = ExportRequest::new("same.md", "> [!note]\n> slow", "same", timestamp());
    let newer = ExportRequest::new("same.md", "fresh", "same", timestamp());

    let (first, second) = tokio::join!(exporter.export(older), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        exporter.export(newer).await
    });
    assert!(matches!(first, Err(PipelineError::Superseded)));
    assert_eq!(second?.page_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_different_documents_do_not_supersede() -> TestResult {
    let exporter = ExporterBuilder::new()
        .with_rasterizer(Arc::new(SolidRasterizer::slow(Duration::from_millis(100))))
        .build()?;
    let a = ExportRequest::new("a.md", "> [!note]\n> a", "a", timestamp());
    let b = ExportRequest::new("b.md", "b", "b", timestamp());

    let (first, second) = tokio::join!(exporter.export(a), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        exporter.export(b).await
    });
    assert!(first.is_ok());
    assert!(second.is_ok());
    Ok(())
}
