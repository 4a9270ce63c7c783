//! Span replacement for PDF pages.
//!
//! # Coordinate System
//!
//! PDF uses a **bottom-left origin** coordinate system, while mupdf (used
//! for span extraction) reports boxes with a **top-left origin** where Y
//! increases downward. Conversion: `pdf_y = page_height - mupdf_y`.
//!
//! # Replacement Strategy
//!
//! For each translated span, in span order: paint a white rectangle over the
//! original bounding box, then draw the translated text at the box's
//! top-left anchor with base-14 Helvetica at the original font size. The
//! rect/text pairs are emitted per span rather than batched into phases, so
//! a later span's redaction paints over any earlier insertion that overflows
//! into its box. The bounding box itself is never moved or resized; text
//! that is wider or narrower than the original is an accepted limitation
//! (no reflow, no font-size fitting).

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::page_index::PageIndex;
use super::text::BoundingBox;
use crate::error::{Error, Result};

/// Resource name under which the replacement font is registered on a page.
const FONT_RESOURCE_NAME: &str = "FRepl";

/// A single span edit: translated text to place over the original box.
#[derive(Debug, Clone)]
pub struct SpanReplacement {
    /// Bounding box of the original span (mupdf coordinates)
    pub bbox: BoundingBox,
    /// Translated text to draw
    pub text: String,
    /// Font size in points, carried over from the original span
    pub font_size: f32,
}

/// Rewrites PDF pages by overlaying span replacements.
///
/// The document is loaded once, pages are edited one at a time, and the
/// whole document is saved once at the end; the input bytes are never
/// modified.
pub struct PdfRewriter {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
    font_id: Option<ObjectId>,
}

impl PdfRewriter {
    /// Load a PDF for rewriting.
    pub fn load(pdf_bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(pdf_bytes)
            .map_err(|e| Error::Lopdf(format!("Failed to load PDF: {e}")))?;
        let pages = doc.get_pages();

        Ok(Self {
            doc,
            pages,
            font_id: None,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Apply span replacements to one page.
    ///
    /// Appends a content stream with one rect+text pair per replacement, in
    /// the order given.
    pub fn replace_page_spans(
        &mut self,
        page_num: usize,
        replacements: &[SpanReplacement],
    ) -> Result<()> {
        if replacements.is_empty() {
            return Ok(());
        }

        let page_index = PageIndex::try_from_page_num(page_num, self.pages.len())?;
        let page_id = *self
            .pages
            .get(&page_index.as_lopdf_page_number())
            .ok_or(Error::PdfInvalidPage {
                page: page_num,
                total: self.pages.len(),
            })?;

        let page_obj = self
            .doc
            .get_object(page_id)
            .map_err(|e| Error::Lopdf(format!("Failed to get page object: {e}")))?;
        let media_box = get_media_box(&self.doc, page_obj)?;
        let page_height = media_box[3] - media_box[1];

        let font_id = self.ensure_font_object();
        self.attach_font_to_page(page_id, font_id)?;

        let content = build_replacement_content(replacements, page_height);
        self.append_content_to_page(page_id, &content)
    }

    /// Serialize the rewritten document.
    pub fn save(mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| Error::PdfSave(format!("Failed to save PDF: {e}")))?;
        Ok(output)
    }

    /// Add the shared Helvetica font object once per document.
    fn ensure_font_object(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }

        let id = self.doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        self.font_id = Some(id);
        id
    }

    /// Register the replacement font in the page's resource dictionary,
    /// handling inline, referenced, and missing Resources/Font entries.
    fn attach_font_to_page(&mut self, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
        enum ResourcesAt {
            Inline,
            Referenced(ObjectId),
        }

        let location = {
            let page = self
                .doc
                .get_dictionary(page_id)
                .map_err(|e| Error::Lopdf(format!("Failed to get page dictionary: {e}")))?;
            match page.get(b"Resources") {
                Ok(Object::Reference(id)) => ResourcesAt::Referenced(*id),
                _ => ResourcesAt::Inline,
            }
        };

        let deferred_fonts_ref = match location {
            ResourcesAt::Referenced(resources_id) => {
                match self.doc.get_object_mut(resources_id) {
                    Ok(Object::Dictionary(resources)) => set_font_entry(resources, font_id),
                    _ => None,
                }
            }
            ResourcesAt::Inline => {
                let page = self
                    .doc
                    .get_object_mut(page_id)
                    .map_err(|e| Error::Lopdf(format!("Failed to get page: {e}")))?;
                let Object::Dictionary(dict) = page else {
                    return Err(Error::PdfRewrite("page object is not a dictionary".into()));
                };

                match dict.get_mut(b"Resources") {
                    Ok(Object::Dictionary(resources)) => set_font_entry(resources, font_id),
                    _ => {
                        let fonts = Dictionary::from_iter([(
                            FONT_RESOURCE_NAME,
                            Object::Reference(font_id),
                        )]);
                        let resources =
                            Dictionary::from_iter([("Font", Object::Dictionary(fonts))]);
                        dict.set("Resources", Object::Dictionary(resources));
                        None
                    }
                }
            }
        };

        // The Font entry itself may be an indirect reference; patch it in a
        // second pass to keep the borrows simple.
        if let Some(fonts_id) = deferred_fonts_ref
            && let Ok(Object::Dictionary(fonts)) = self.doc.get_object_mut(fonts_id)
        {
            fonts.set(FONT_RESOURCE_NAME, Object::Reference(font_id));
        }

        Ok(())
    }

    /// Append a content stream to a page, preserving any existing content.
    fn append_content_to_page(&mut self, page_id: ObjectId, content: &str) -> Result<()> {
        let content_stream = Stream::new(Dictionary::new(), content.as_bytes().to_vec());
        let content_id = self.doc.add_object(Object::Stream(content_stream));

        let page = self
            .doc
            .get_object_mut(page_id)
            .map_err(|e| Error::Lopdf(format!("Failed to get page: {e}")))?;

        if let Object::Dictionary(dict) = page {
            let existing_contents = dict.get(b"Contents").ok().cloned();

            match existing_contents {
                Some(Object::Reference(existing_id)) => {
                    let contents_array = Object::Array(vec![
                        Object::Reference(existing_id),
                        Object::Reference(content_id),
                    ]);
                    dict.set("Contents", contents_array);
                }
                Some(Object::Array(mut arr)) => {
                    arr.push(Object::Reference(content_id));
                    dict.set("Contents", Object::Array(arr));
                }
                _ => {
                    dict.set("Contents", Object::Reference(content_id));
                }
            }
        }

        Ok(())
    }
}

/// Set the replacement font in a resources dictionary.
///
/// Returns the Font entry's object id when it is an indirect reference the
/// caller must patch instead.
fn set_font_entry(resources: &mut Dictionary, font_id: ObjectId) -> Option<ObjectId> {
    match resources.get_mut(b"Font") {
        Ok(Object::Dictionary(fonts)) => {
            fonts.set(FONT_RESOURCE_NAME, Object::Reference(font_id));
            None
        }
        Ok(Object::Reference(id)) => Some(*id),
        _ => {
            let fonts = Dictionary::from_iter([(FONT_RESOURCE_NAME, Object::Reference(font_id))]);
            resources.set("Font", Object::Dictionary(fonts));
            None
        }
    }
}

/// Build the content stream for a page's replacements.
///
/// Emits, per span and in span order: white fill over the original box,
/// then the translated text anchored at the box's top-left corner.
fn build_replacement_content(replacements: &[SpanReplacement], page_height: f32) -> String {
    use std::fmt::Write;

    let mut content = String::new();
    content.push_str("q\n");

    for replacement in replacements {
        let bbox = replacement.bbox;
        // mupdf top-left origin -> PDF bottom-left origin
        let rect_y = page_height - bbox.y1;
        let baseline = page_height - bbox.y0 - replacement.font_size;

        let _ = writeln!(
            content,
            "1 1 1 rg\n{:.2} {:.2} {:.2} {:.2} re f",
            bbox.x0,
            rect_y,
            bbox.width(),
            bbox.height()
        );

        content.push_str("0 0 0 rg\nBT\n");
        let _ = writeln!(content, "/{FONT_RESOURCE_NAME} {:.2} Tf", replacement.font_size);
        let _ = writeln!(content, "{:.2} {:.2} Td", bbox.x0, baseline);
        let _ = writeln!(content, "({}) Tj", escape_pdf_text(&replacement.text));
        content.push_str("ET\n");
    }

    content.push_str("Q\n");
    content
}

/// Get the media box for a page, walking up to the parent when inherited.
fn get_media_box(doc: &Document, page_obj: &Object) -> Result<[f32; 4]> {
    if let Object::Dictionary(dict) = page_obj {
        if let Ok(Object::Array(arr)) = dict.get(b"MediaBox")
            && arr.len() == 4
        {
            let values: Vec<f32> = arr
                .iter()
                .filter_map(|o| match o {
                    #[allow(clippy::cast_precision_loss)]
                    Object::Integer(i) => Some(*i as f32),
                    Object::Real(r) => Some(*r),
                    _ => None,
                })
                .collect();

            if values.len() == 4 {
                return Ok([values[0], values[1], values[2], values[3]]);
            }
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent")
            && let Ok(parent) = doc.get_object(*parent_id)
        {
            return get_media_box(doc, parent);
        }
    }

    // Default to US Letter size
    Ok([0.0, 0.0, 612.0, 792.0])
}

/// Escape text for a PDF literal string.
///
/// Latin-1 characters above ASCII are emitted as octal escapes; anything
/// outside Latin-1 cannot be encoded with a non-embedded base font and
/// degrades to '?'.
pub(crate) fn escape_pdf_text(text: &str) -> String {
    use std::fmt::Write;

    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            c if c.is_ascii_graphic() || c == ' ' => escaped.push(c),
            c => {
                let code = c as u32;
                if (0xA0..=0xFF).contains(&code) {
                    let _ = write!(escaped, "\\{code:03o}");
                } else {
                    escaped.push('?');
                }
            }
        }
    }
    escaped
}
