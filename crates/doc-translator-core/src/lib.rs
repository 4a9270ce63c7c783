//! Core library for translating office documents and PDFs.
//!
//! The pipeline reads a document, translates its text through a pluggable
//! [`Translator`] backend, and writes a new file next to the original (or
//! into a configured output directory). Each format keeps as much of its
//! structure as the format allows:
//!
//! - **DOCX**: paragraphs and table cells translated wholesale, paragraph
//!   and cell properties preserved
//! - **PPTX**: every text run replaced in place, run formatting preserved
//! - **PDF**: each text span covered with a white rectangle and the
//!   translated text drawn at the original position
//!
//! Translation is best-effort per unit: a failed API call leaves that unit's
//! original text in place and the rest of the document proceeds.

pub mod activity;
pub mod config;
pub mod detect;
pub mod error;
pub mod office;
pub mod pdf;
pub mod translator;
pub mod util;

pub use activity::{ActivityLog, ActivityRecord};
pub use config::{
    display_name_for_code, lang_for_display_name, target_languages, AppConfig, Lang,
    LanguageOption, StorageConfig, TranslatorConfig, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG,
};
pub use detect::{detect_language, detect_lines, Detection};
pub use error::{Error, Result};
pub use translator::{create_translator, OpenAiTranslator, Translator, TranslatorInfo};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::pdf::{PdfDocument, PdfRewriter, SpanReplacement, TextExtractor};
use crate::translator::translate_or_original;

/// Supported document formats, dispatched on file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Docx,
    Pptx,
    Pdf,
}

impl DocFormat {
    /// Resolve a format from a file path's extension.
    ///
    /// Unknown extensions are rejected here, before any bytes are read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "pptx" => Ok(Self::Pptx),
            "pdf" => Ok(Self::Pdf),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for DocFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Progress callback: `(done, total)` in format-specific units (pages for
/// PDF, a single completion tick for OOXML formats).
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Result of a file translation.
#[derive(Debug, Clone)]
pub struct TranslatedFile {
    /// Where the translated document was written
    pub path: PathBuf,
    pub format: DocFormat,
    /// Number of structural units (paragraphs, cells, runs, spans) translated
    pub units_translated: usize,
    /// Per-line language detection over the extracted source text
    pub detected_source: Detection,
}

/// High-level document translation pipeline.
pub struct DocTranslator {
    translator: Arc<dyn Translator>,
    config: AppConfig,
}

impl DocTranslator {
    /// Build a pipeline with the translator backend named in the config.
    pub fn new(config: AppConfig) -> Result<Self> {
        let translator = translator::create_translator(&config.translator)?;
        Ok(Self { translator, config })
    }

    /// Build a pipeline around an existing translator (used by the servers
    /// and by tests).
    pub fn with_translator(config: AppConfig, translator: Arc<dyn Translator>) -> Self {
        Self { translator, config }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Translate a document file and write the result as
    /// `<stem>_translated_<code>.<ext>`. The input file is never modified.
    ///
    /// A document with no translatable text is an error: no output file is
    /// written and `Error::NoTextContent` is returned.
    pub async fn translate_file(
        &self,
        input: &Path,
        progress: Option<&ProgressFn>,
    ) -> Result<TranslatedFile> {
        let format = DocFormat::from_path(input)?;
        let bytes = std::fs::read(input)?;

        let extracted = Self::extract_text(format, &bytes)?;
        let detected_source = detect::detect_lines(&extracted);

        let source = &self.config.source_lang;
        let target = &self.config.target_lang;

        let (output, units) = match format {
            DocFormat::Docx => {
                let result =
                    office::docx::translate_docx(&bytes, self.translator.as_ref(), source, target)
                        .await?;
                if let Some(cb) = progress {
                    cb(1, 1);
                }
                result
            }
            DocFormat::Pptx => {
                let result =
                    office::pptx::translate_pptx(&bytes, self.translator.as_ref(), source, target)
                        .await?;
                if let Some(cb) = progress {
                    cb(1, 1);
                }
                result
            }
            DocFormat::Pdf => self.translate_pdf(&bytes, progress).await?,
        };

        if units == 0 {
            return Err(Error::NoTextContent);
        }

        let out_path = util::translated_output_path(
            input,
            target,
            self.config.storage.output_dir.as_deref(),
        );
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&out_path, &output)?;

        info!(
            input = %input.display(),
            output = %out_path.display(),
            units,
            source = %detected_source.label(),
            target = %target,
            "translated document"
        );

        Ok(TranslatedFile {
            path: out_path,
            format,
            units_translated: units,
            detected_source,
        })
    }

    /// Translate raw bytes in memory, returning the translated document
    /// bytes plus unit count and detection. Used by the web upload flow.
    pub async fn translate_bytes(
        &self,
        format: DocFormat,
        bytes: &[u8],
    ) -> Result<(Vec<u8>, usize, Detection)> {
        let extracted = Self::extract_text(format, bytes)?;
        let detected = detect::detect_lines(&extracted);

        let source = &self.config.source_lang;
        let target = &self.config.target_lang;

        let (output, units) = match format {
            DocFormat::Docx => {
                office::docx::translate_docx(bytes, self.translator.as_ref(), source, target)
                    .await?
            }
            DocFormat::Pptx => {
                office::pptx::translate_pptx(bytes, self.translator.as_ref(), source, target)
                    .await?
            }
            DocFormat::Pdf => self.translate_pdf(bytes, None).await?,
        };

        if units == 0 {
            return Err(Error::NoTextContent);
        }
        Ok((output, units, detected))
    }

    /// Translate typed text, returning the translated string.
    pub async fn translate_text(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::NoTextContent);
        }
        self.translator
            .translate(text, &self.config.source_lang, &self.config.target_lang)
            .await
    }

    /// Translate typed text and render the result as a fresh PDF.
    pub async fn translate_text_to_pdf(&self, text: &str) -> Result<Vec<u8>> {
        let translated = self.translate_text(text).await?;
        pdf::synthesize_pdf(&translated)
    }

    /// Extract plain text from document bytes, for detection and preview.
    pub fn extract_text(format: DocFormat, bytes: &[u8]) -> Result<String> {
        match format {
            DocFormat::Docx => office::docx::extract_text(bytes),
            DocFormat::Pptx => office::pptx::extract_text(bytes),
            DocFormat::Pdf => {
                let doc = PdfDocument::from_bytes(bytes.to_vec())?;
                TextExtractor::new(&doc).get_document_text()
            }
        }
    }

    /// Translate a PDF span by span: each span is covered and its translated
    /// text drawn back at the original bounding box, page by page.
    async fn translate_pdf(
        &self,
        bytes: &[u8],
        progress: Option<&ProgressFn>,
    ) -> Result<(Vec<u8>, usize)> {
        let doc = PdfDocument::from_bytes(bytes.to_vec())?;
        let extractor = TextExtractor::new(&doc);
        let mut rewriter = PdfRewriter::load(bytes)?;

        let source = &self.config.source_lang;
        let target = &self.config.target_lang;
        let total_pages = doc.page_count();
        let mut units = 0usize;

        for page_num in 0..total_pages {
            let spans = extractor.extract_page_spans(page_num)?;

            let mut replacements = Vec::with_capacity(spans.len());
            for span in spans {
                let translated =
                    translate_or_original(self.translator.as_ref(), &span.text, source, target)
                        .await;
                replacements.push(SpanReplacement {
                    bbox: span.bbox,
                    text: translated,
                    font_size: span.font_size,
                });
                units += 1;
            }

            if !replacements.is_empty() {
                rewriter.replace_page_spans(page_num, &replacements)?;
            }

            if let Some(cb) = progress {
                cb(page_num + 1, total_pages);
            }
        }

        Ok((rewriter.save()?, units))
    }
}
