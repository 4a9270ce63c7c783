//! End-to-end pipeline tests with a mock translator backend.

#![allow(clippy::unwrap_used)]

use std::io::{Cursor, Write};
use std::sync::Arc;

use async_trait::async_trait;
use doc_translator_core::{
    ActivityLog, AppConfig, DocFormat, DocTranslator, Detection, Error, Lang, Result, Translator,
    TranslatorInfo,
};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Deterministic backend: prefixes every unit with the target code.
struct MockTranslator;

#[async_trait]
impl Translator for MockTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "mock",
            requires_api_key: false,
            supports_auto_detect: true,
        }
    }

    async fn translate(&self, text: &str, _source: &Lang, target: &Lang) -> Result<String> {
        Ok(format!("[{}] {}", target.as_str(), text))
    }
}

fn pipeline(target: &str) -> DocTranslator {
    let config = AppConfig {
        target_lang: Lang::new(target),
        ..AppConfig::default()
    };
    DocTranslator::with_translator(config, Arc::new(MockTranslator))
}

fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for text in paragraphs {
        body.push_str(&format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"));
    }
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn build_pptx(runs: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for text in runs {
        body.push_str(&format!("<a:r><a:t>{text}</a:t></a:r>"));
    }
    let slide = format!(
        r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p>{body}</a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("ppt/slides/slide1.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(slide.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

const PARAGRAPHS: [&str; 3] = [
    "The quick brown fox jumps over the lazy dog and keeps running.",
    "Every morning the harbour fills with small fishing boats returning home.",
    "Nobody expected the library to stay open this late in the winter.",
];

#[tokio::test]
async fn docx_file_translates_to_sibling_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.docx");
    std::fs::write(&input, build_docx(&PARAGRAPHS)).unwrap();

    let result = pipeline("fr").translate_file(&input, None).await.unwrap();

    assert_eq!(result.path, dir.path().join("report_translated_fr.docx"));
    assert_eq!(result.format, DocFormat::Docx);
    assert_eq!(result.units_translated, 3);
    assert_eq!(result.detected_source, Detection::Single(Lang::new("en")));

    // Original untouched, output exists alongside it.
    assert!(input.exists());
    let output_bytes = std::fs::read(&result.path).unwrap();
    let text = DocTranslator::extract_text(DocFormat::Docx, &output_bytes).unwrap();
    assert!(text.contains("[fr] The quick brown fox"));
    assert_eq!(text.lines().count(), 3);
}

#[tokio::test]
async fn pptx_file_translates_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deck.pptx");
    std::fs::write(&input, build_pptx(&["Hello", "world"])).unwrap();

    let result = pipeline("es").translate_file(&input, None).await.unwrap();

    assert_eq!(result.path, dir.path().join("deck_translated_es.pptx"));
    assert_eq!(result.units_translated, 2);

    let output_bytes = std::fs::read(&result.path).unwrap();
    let text = DocTranslator::extract_text(DocFormat::Pptx, &output_bytes).unwrap();
    assert!(text.contains("[es] Hello"));
    assert!(text.contains("[es] world"));
}

#[tokio::test]
async fn document_without_text_writes_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.docx");
    std::fs::write(&input, build_docx(&[])).unwrap();

    let err = pipeline("es").translate_file(&input, None).await.unwrap_err();
    assert!(matches!(err, Error::NoTextContent));

    // No partial output left behind.
    let outputs: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains("translated"))
        .collect();
    assert!(outputs.is_empty());
}

#[tokio::test]
async fn unsupported_extension_is_rejected_at_the_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "plain text").unwrap();

    let err = pipeline("es").translate_file(&input, None).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
}

#[tokio::test]
async fn text_flow_translates_and_logs_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let translator = pipeline("es");

    let translated = translator.translate_text("Hello world").await.unwrap();
    assert_eq!(translated, "[es] Hello world");

    let log = ActivityLog::new(dir.path().join("user_log.csv"));
    log.append("cli", "-", "auto", "es").unwrap();

    let rows = log.read_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].file_name, "-");
    assert_eq!(rows[0].target_language, "es");
}

#[tokio::test]
async fn text_flow_renders_a_downloadable_pdf() {
    let pdf = pipeline("de")
        .translate_text_to_pdf("Guten Morgen")
        .await
        .unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let haystack = String::from_utf8_lossy(&pdf);
    assert!(haystack.contains("([de] Guten Morgen) Tj"));
}

#[tokio::test]
async fn progress_callback_reports_completion() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.docx");
    std::fs::write(&input, build_docx(&PARAGRAPHS)).unwrap();

    let ticks = std::sync::Arc::new(AtomicUsize::new(0));
    let ticks_in_progress = ticks.clone();
    let progress = move |_done: usize, _total: usize| {
        ticks_in_progress.fetch_add(1, Ordering::SeqCst);
    };

    pipeline("ja")
        .translate_file(&input, Some(&progress))
        .await
        .unwrap();
    assert!(ticks.load(Ordering::SeqCst) > 0);
}
