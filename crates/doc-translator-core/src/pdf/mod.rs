pub mod document;
pub mod page_index;
pub mod redact;
pub mod synth;
pub mod text;

pub use document::PdfDocument;
pub use page_index::PageIndex;
pub use redact::{PdfRewriter, SpanReplacement};
pub use synth::synthesize_pdf;
pub use text::{BoundingBox, TextExtractor, TextSpan};
