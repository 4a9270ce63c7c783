use thiserror::Error;

/// Unified error type for doc-translator-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Document operations per format (opening, parsing, rewriting, saving)
/// - Translation operations (API requests, responses, language resolution)
/// - Activity log operations
/// - Configuration operations (loading)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Document Errors
    // ==========================================================================
    /// Unsupported or unrecognized document format
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Failed to open or parse a PDF file
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    /// Invalid page number requested
    #[error("invalid page number {page} (document has {total} pages)")]
    PdfInvalidPage { page: usize, total: usize },

    /// Failed to extract text from a PDF page
    #[error("failed to extract text from page {page}: {reason}")]
    PdfTextExtraction { page: usize, reason: String },

    /// Failed to rewrite a PDF page
    #[error("failed to rewrite PDF: {0}")]
    PdfRewrite(String),

    /// Failed to save a PDF
    #[error("failed to save PDF: {0}")]
    PdfSave(String),

    /// Error from the lopdf library
    #[error("lopdf error: {0}")]
    Lopdf(String),

    /// Failed to open an OOXML archive (docx/pptx are zip containers)
    #[error("failed to open {format} archive: {reason}")]
    OoxmlArchive { format: &'static str, reason: String },

    /// Failed to parse or rewrite OOXML part XML
    #[error("failed to process {part}: {reason}")]
    OoxmlXml { part: String, reason: String },

    /// Document contains no translatable text
    #[error("document contains no translatable text")]
    NoTextContent,

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Target language name not in the known mapping
    #[error("unsupported target language: {0}")]
    TranslationUnsupportedLanguage(String),

    /// Translation request timed out
    #[error("translation request timed out")]
    TranslationTimeout,

    // ==========================================================================
    // Activity Log Errors
    // ==========================================================================
    /// Failed to append to or read the activity log
    #[error("activity log error: {0}")]
    ActivityLog(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
