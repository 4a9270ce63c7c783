//! Plain-text PDF synthesis for the typed-text flow.
//!
//! Builds a fresh Letter-size document from translated text: word-wrapped
//! Helvetica, one content stream per page. No attempt is made to mirror any
//! source layout; this flow exists so typed text can be downloaded as a PDF.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const FONT_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 16.0;

/// Average character width as a fraction of font size for Helvetica.
const CHAR_WIDTH_FACTOR: f32 = 0.55;

/// Synthesize a PDF from plain text.
///
/// Paragraph breaks (`\n`) are honored; long paragraphs are word-wrapped to
/// the page width and overflow continues on new pages.
pub fn synthesize_pdf(text: &str) -> Result<Vec<u8>> {
    if text.trim().is_empty() {
        return Err(Error::NoTextContent);
    }

    let usable_width = PAGE_WIDTH - 2.0 * MARGIN;
    let char_width = FONT_SIZE * CHAR_WIDTH_FACTOR;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_chars = (usable_width / char_width).floor().max(10.0) as usize;

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(word_wrap(paragraph, max_chars));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lines_per_page = ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT).floor().max(1.0) as usize;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
    )]));

    let mut kids: Vec<Object> = Vec::new();
    for page_lines in lines.chunks(lines_per_page) {
        let page_id = build_page(&mut doc, pages_id, resources_id, page_lines);
        kids.push(Object::Reference(page_id));
    }

    #[allow(clippy::cast_possible_truncation)]
    let page_count = kids.len() as i64;
    let page_tree = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(page_count)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| Error::PdfSave(format!("Failed to save synthesized PDF: {e}")))?;
    Ok(output)
}

fn build_page(
    doc: &mut Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    lines: &[String],
) -> ObjectId {
    use std::fmt::Write;

    let mut content = String::new();
    content.push_str("BT\n");
    let _ = writeln!(content, "/F1 {FONT_SIZE} Tf");
    let _ = writeln!(content, "{LINE_HEIGHT} TL");
    let _ = writeln!(content, "{MARGIN} {:.2} Td", PAGE_HEIGHT - MARGIN - FONT_SIZE);

    for line in lines {
        let _ = writeln!(content, "({}) Tj T*", super::redact::escape_pdf_text(line));
    }
    content.push_str("ET\n");

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Reference(resources_id)),
        (
            "MediaBox",
            Object::Array(vec![
                0.into(),
                0.into(),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ]),
        ),
    ]))
}

/// Word wrap text to fit within `max_chars` per line.
fn word_wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_chars {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_word_wrap_basic() {
        let lines = word_wrap("Hello world this is a test", 10);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Hello");
        assert_eq!(lines[1], "world this");
        assert_eq!(lines[2], "is a test");
    }

    #[test]
    fn test_word_wrap_empty() {
        let lines = word_wrap("", 10);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "");
    }

    #[test]
    fn synthesizes_valid_single_page_pdf() {
        let output = synthesize_pdf("Hola mundo").unwrap();
        assert!(output.starts_with(b"%PDF"));

        let doc = Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let haystack = String::from_utf8_lossy(&output);
        assert!(haystack.contains("(Hola mundo) Tj"));
    }

    #[test]
    fn long_text_spills_onto_multiple_pages() {
        let text = "word ".repeat(5000);
        let output = synthesize_pdf(&text).unwrap();
        let doc = Document::load_mem(&output).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(synthesize_pdf("   \n ").is_err());
    }
}
