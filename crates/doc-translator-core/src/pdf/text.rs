use mupdf::TextPageOptions;

use super::document::PdfDocument;
use super::page_index::PageIndex;
use crate::error::{Error, Result};

/// The smallest addressable unit of styled text on a PDF page.
///
/// A span corresponds to one extracted line of text with its own bounding
/// box and estimated font size. Replacing a span's text never changes its
/// bounding box.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Bounding box in mupdf coordinates (top-left origin)
    pub bbox: BoundingBox,
    /// Font size in points (estimated from line height)
    pub font_size: f32,
}

/// Bounding box in PDF coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Create from mupdf Quad (4 points defining a quadrilateral)
    pub const fn from_quad(quad: &mupdf::Quad) -> Self {
        let x0 = quad.ul.x.min(quad.ur.x).min(quad.ll.x).min(quad.lr.x);
        let y0 = quad.ul.y.min(quad.ur.y).min(quad.ll.y).min(quad.lr.y);
        let x1 = quad.ul.x.max(quad.ur.x).max(quad.ll.x).max(quad.lr.x);
        let y1 = quad.ul.y.max(quad.ur.y).max(quad.ll.y).max(quad.lr.y);
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Span-level text extraction from PDF pages.
pub struct TextExtractor<'a> {
    doc: &'a PdfDocument,
}

impl<'a> TextExtractor<'a> {
    pub const fn new(doc: &'a PdfDocument) -> Self {
        Self { doc }
    }

    /// Extract text spans from a page.
    ///
    /// Each line inside a mupdf text block becomes one span. Empty and
    /// whitespace-only lines are skipped; everything else is returned in
    /// reading order with its bounding box intact.
    pub fn extract_page_spans(&self, page_num: usize) -> Result<Vec<TextSpan>> {
        let text_page = self.text_page(page_num)?;

        let mut spans = Vec::new();

        for block in text_page.blocks() {
            for line in block.lines() {
                let mut line_text = String::new();
                let mut line_bbox: Option<BoundingBox> = None;

                for text_char in line.chars() {
                    if let Some(c) = text_char.char() {
                        line_text.push(c);
                    }

                    let char_bbox = BoundingBox::from_quad(&text_char.quad());
                    line_bbox = Some(line_bbox.map_or(char_bbox, |b| b.union(&char_bbox)));
                }

                let text = line_text.trim().to_string();
                if text.is_empty() {
                    continue;
                }

                if let Some(bbox) = line_bbox {
                    // The extracted line height tends to run slightly under
                    // the visual font size; scale up a touch to compensate.
                    let font_size = (bbox.height() * 1.18).clamp(6.0, 36.0);

                    spans.push(TextSpan {
                        text,
                        bbox,
                        font_size,
                    });
                }
            }
        }

        Ok(spans)
    }

    /// Get plain text from a page, one line per extracted line.
    pub fn get_page_text(&self, page_num: usize) -> Result<String> {
        let text_page = self.text_page(page_num)?;

        let mut all_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                for text_char in line.chars() {
                    if let Some(c) = text_char.char() {
                        all_text.push(c);
                    }
                }
                all_text.push('\n');
            }
        }

        Ok(all_text)
    }

    /// Get plain text for the whole document.
    pub fn get_document_text(&self) -> Result<String> {
        let mut text = String::new();
        for page_num in 0..self.doc.page_count() {
            text.push_str(&self.get_page_text(page_num)?);
        }
        Ok(text)
    }

    fn text_page(&self, page_num: usize) -> Result<mupdf::TextPage> {
        let page_index = PageIndex::try_from_page_num(page_num, self.doc.page_count())?;

        let doc = self.doc.open_document()?;
        let page = doc
            .load_page(page_index.into())
            .map_err(|e| Error::PdfTextExtraction {
                page: page_num,
                reason: format!("Failed to load page: {e}"),
            })?;

        page.to_text_page(TextPageOptions::empty())
            .map_err(|e| Error::PdfTextExtraction {
                page: page_num,
                reason: format!("Failed to get text page: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_union_covers_both() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, -2.0, 20.0, 8.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.0, -2.0, 20.0, 10.0));
    }

    #[test]
    fn bbox_dimensions() {
        let b = BoundingBox::new(10.0, 20.0, 110.0, 35.0);
        assert!((b.width() - 100.0).abs() < f32::EPSILON);
        assert!((b.height() - 15.0).abs() < f32::EPSILON);
    }
}
