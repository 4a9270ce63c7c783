//! DOCX translation.
//!
//! Word documents are translated one structural unit at a time: each
//! top-level paragraph is translated wholesale (all runs joined, the result
//! written back as a single run) and each table cell likewise. Paragraph
//! properties (`w:pPr`) and cell properties (`w:tcPr`) are carried over, so
//! alignment, numbering and shading survive; run-level formatting inside a
//! translated paragraph is intentionally collapsed because translated text
//! has no stable mapping back onto the original run boundaries.

use std::collections::HashMap;
use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::config::Lang;
use crate::error::{Error, Result};
use crate::translator::{translate_or_original, Translator};

const DOCUMENT_PART: &str = "word/document.xml";

fn xml_err(part: &str, e: impl std::fmt::Display) -> Error {
    Error::OoxmlXml {
        part: part.to_string(),
        reason: e.to_string(),
    }
}

/// Translate a DOCX document, returning the rebuilt archive and the number
/// of units (paragraphs and table cells) that were translated.
pub async fn translate_docx(
    bytes: &[u8],
    translator: &dyn Translator,
    source: &Lang,
    target: &Lang,
) -> Result<(Vec<u8>, usize)> {
    let xml = super::read_part(bytes, DOCUMENT_PART, "docx")?;
    let (rewritten, units) = rewrite_document(&xml, translator, source, target).await?;

    debug!(units, "translated docx body");

    let mut replaced = HashMap::new();
    replaced.insert(DOCUMENT_PART.to_string(), rewritten);
    let output = super::rewrite_archive(bytes, "docx", &replaced)?;
    Ok((output, units))
}

/// Plain text of the document body, one line per paragraph.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let xml = super::read_part(bytes, DOCUMENT_PART, "docx")?;

    let mut reader = Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_err(DOCUMENT_PART, e))?
        {
            Event::Start(ref e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(ref e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::Text(ref t) if in_text => {
                text.push_str(&t.unescape().map_err(|e| xml_err(DOCUMENT_PART, e))?);
            }
            Event::End(ref e) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

async fn rewrite_document(
    xml: &[u8],
    translator: &dyn Translator,
    source: &Lang,
    target: &Lang,
) -> Result<(Vec<u8>, usize)> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut table_depth = 0usize;
    let mut units = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_err(DOCUMENT_PART, e))?;

        match event {
            Event::Eof => break,
            Event::Start(ref e) if e.name().as_ref() == b"w:tbl" => {
                table_depth += 1;
                writer
                    .write_event(event.clone())
                    .map_err(|e| xml_err(DOCUMENT_PART, e))?;
            }
            Event::End(ref e) if e.name().as_ref() == b"w:tbl" => {
                table_depth = table_depth.saturating_sub(1);
                writer
                    .write_event(event.clone())
                    .map_err(|e| xml_err(DOCUMENT_PART, e))?;
            }
            Event::Start(ref e) if e.name().as_ref() == b"w:tc" && table_depth > 0 => {
                let subtree = capture_subtree(&mut reader, event.clone().into_owned())?;
                let translated =
                    rewrite_cell(&mut writer, &subtree, translator, source, target).await?;
                if translated {
                    units += 1;
                }
            }
            Event::Start(ref e) if e.name().as_ref() == b"w:p" && table_depth == 0 => {
                let subtree = capture_subtree(&mut reader, event.clone().into_owned())?;
                let translated =
                    rewrite_paragraph(&mut writer, &subtree, translator, source, target).await?;
                if translated {
                    units += 1;
                }
            }
            other => {
                writer
                    .write_event(other)
                    .map_err(|e| xml_err(DOCUMENT_PART, e))?;
            }
        }
        buf.clear();
    }

    Ok((writer.into_inner().into_inner(), units))
}

/// Collect a whole element subtree, including the already-read start event
/// and the matching end event. Handles same-name nesting.
fn capture_subtree(
    reader: &mut Reader<&[u8]>,
    start: Event<'static>,
) -> Result<Vec<Event<'static>>> {
    let name = match &start {
        Event::Start(e) => e.name().as_ref().to_vec(),
        _ => {
            return Err(xml_err(
                DOCUMENT_PART,
                "capture_subtree called on a non-start event",
            ))
        }
    };

    let mut events = vec![start];
    let mut depth = 1usize;
    let mut buf = Vec::new();

    while depth > 0 {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_err(DOCUMENT_PART, e))?;
        match &event {
            Event::Start(e) if e.name().as_ref() == name.as_slice() => depth += 1,
            Event::End(e) if e.name().as_ref() == name.as_slice() => depth -= 1,
            Event::Eof => return Err(xml_err(DOCUMENT_PART, "unexpected end of document")),
            _ => {}
        }
        events.push(event.into_owned());
        buf.clear();
    }

    Ok(events)
}

/// Concatenated text of every `w:t` element in a subtree, with a newline
/// between paragraphs (multi-paragraph table cells).
fn subtree_text(events: &[Event<'_>]) -> Result<String> {
    let mut text = String::new();
    let mut in_text = false;

    for event in events {
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::End(e) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Event::Text(t) if in_text => {
                text.push_str(&t.unescape().map_err(|e| xml_err(DOCUMENT_PART, e))?);
            }
            _ => {}
        }
    }

    while text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// First direct-child subtree with the given name (e.g. `w:pPr`), if any.
fn child_subtree<'a>(events: &'a [Event<'a>], name: &[u8]) -> Vec<&'a Event<'a>> {
    let mut depth = 0usize;
    let mut collecting = false;
    let mut collected = Vec::new();

    for event in &events[1..events.len().saturating_sub(1)] {
        match event {
            Event::Start(e) => {
                if depth == 0 && e.name().as_ref() == name {
                    collecting = true;
                }
                if collecting {
                    collected.push(event);
                }
                depth += 1;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if collecting {
                    collected.push(event);
                    if depth == 0 && e.name().as_ref() == name {
                        return collected;
                    }
                }
            }
            Event::Empty(e) => {
                if depth == 0 && e.name().as_ref() == name {
                    return vec![event];
                }
                if collecting {
                    collected.push(event);
                }
            }
            _ => {
                if collecting {
                    collected.push(event);
                }
            }
        }
    }

    if collecting {
        collected
    } else {
        Vec::new()
    }
}

fn write_text_run<W: std::io::Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    let mut t = BytesStart::new("w:t");
    t.push_attribute(("xml:space", "preserve"));

    writer
        .write_event(Event::Start(BytesStart::new("w:r")))
        .and_then(|()| writer.write_event(Event::Start(t)))
        .and_then(|()| writer.write_event(Event::Text(BytesText::new(text))))
        .and_then(|()| writer.write_event(Event::End(BytesEnd::new("w:t"))))
        .and_then(|()| writer.write_event(Event::End(BytesEnd::new("w:r"))))
        .map_err(|e| xml_err(DOCUMENT_PART, e))
}

/// Rewrite one captured paragraph. Returns whether it was translated.
async fn rewrite_paragraph<W: std::io::Write>(
    writer: &mut Writer<W>,
    subtree: &[Event<'_>],
    translator: &dyn Translator,
    source: &Lang,
    target: &Lang,
) -> Result<bool> {
    let text = subtree_text(subtree)?;
    if text.trim().is_empty() {
        for event in subtree {
            writer
                .write_event(event.clone())
                .map_err(|e| xml_err(DOCUMENT_PART, e))?;
        }
        return Ok(false);
    }

    let translated = translate_or_original(translator, &text, source, target).await;

    writer
        .write_event(subtree[0].clone())
        .map_err(|e| xml_err(DOCUMENT_PART, e))?;
    for event in child_subtree(subtree, b"w:pPr") {
        writer
            .write_event(event.clone())
            .map_err(|e| xml_err(DOCUMENT_PART, e))?;
    }
    write_text_run(writer, &translated)?;
    writer
        .write_event(Event::End(BytesEnd::new("w:p")))
        .map_err(|e| xml_err(DOCUMENT_PART, e))?;

    Ok(true)
}

/// Rewrite one captured table cell: all its text translated as a single
/// unit and written back as one paragraph, cell properties preserved.
async fn rewrite_cell<W: std::io::Write>(
    writer: &mut Writer<W>,
    subtree: &[Event<'_>],
    translator: &dyn Translator,
    source: &Lang,
    target: &Lang,
) -> Result<bool> {
    let text = subtree_text(subtree)?;
    if text.trim().is_empty() {
        for event in subtree {
            writer
                .write_event(event.clone())
                .map_err(|e| xml_err(DOCUMENT_PART, e))?;
        }
        return Ok(false);
    }

    let translated = translate_or_original(translator, &text, source, target).await;

    writer
        .write_event(subtree[0].clone())
        .map_err(|e| xml_err(DOCUMENT_PART, e))?;
    for event in child_subtree(subtree, b"w:tcPr") {
        writer
            .write_event(event.clone())
            .map_err(|e| xml_err(DOCUMENT_PART, e))?;
    }
    writer
        .write_event(Event::Start(BytesStart::new("w:p")))
        .map_err(|e| xml_err(DOCUMENT_PART, e))?;
    write_text_run(writer, &translated)?;
    writer
        .write_event(Event::End(BytesEnd::new("w:p")))
        .map_err(|e| xml_err(DOCUMENT_PART, e))?;
    writer
        .write_event(Event::End(BytesEnd::new("w:tc")))
        .map_err(|e| xml_err(DOCUMENT_PART, e))?;

    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::office::test_support::build_archive;
    use crate::translator::TranslatorInfo;
    use async_trait::async_trait;

    struct UppercaseTranslator;

    #[async_trait]
    impl Translator for UppercaseTranslator {
        fn info(&self) -> TranslatorInfo {
            TranslatorInfo {
                name: "uppercase",
                requires_api_key: false,
                supports_auto_detect: true,
            }
        }

        async fn translate(&self, text: &str, _source: &Lang, _target: &Lang) -> Result<String> {
            Ok(text.to_uppercase())
        }
    }

    const DOCUMENT_XML: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:body>"#,
        r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>"#,
        r#"<w:r><w:t xml:space="preserve">Hello </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t>world</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tr>"#,
        r#"<w:tc><w:tcPr><w:shd w:fill="FFFF00"/></w:tcPr>"#,
        r#"<w:p><w:r><w:t>Cell one</w:t></w:r></w:p></w:tc>"#,
        r#"<w:tc><w:p><w:r><w:t>Cell two</w:t></w:r></w:p></w:tc>"#,
        r#"</w:tr></w:tbl>"#,
        r#"<w:p/>"#,
        r#"</w:body></w:document>"#,
    );

    fn sample_docx() -> Vec<u8> {
        build_archive(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", DOCUMENT_XML),
            ("word/styles.xml", "<w:styles/>"),
        ])
    }

    fn count_elements(xml: &[u8], name: &[u8]) -> usize {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut count = 0;
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == name => {
                    count += 1;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        count
    }

    #[tokio::test]
    async fn translates_paragraphs_and_cells() {
        let docx = sample_docx();
        let (output, units) = translate_docx(
            &docx,
            &UppercaseTranslator,
            &Lang::auto(),
            &Lang::new("es"),
        )
        .await
        .unwrap();

        // 2 paragraphs + 2 cells; the empty trailing paragraph is skipped.
        assert_eq!(units, 4);

        let text = extract_text(&output).unwrap();
        assert!(text.contains("HELLO WORLD"));
        assert!(text.contains("SECOND PARAGRAPH"));
        assert!(text.contains("CELL ONE"));
        assert!(text.contains("CELL TWO"));
    }

    #[tokio::test]
    async fn preserves_structure_and_properties() {
        let docx = sample_docx();
        let (output, _) = translate_docx(
            &docx,
            &UppercaseTranslator,
            &Lang::auto(),
            &Lang::new("fr"),
        )
        .await
        .unwrap();

        let xml = crate::office::read_part(&output, "word/document.xml", "docx").unwrap();

        // Same paragraph count, same table shape.
        assert_eq!(count_elements(&xml, b"w:p"), 5);
        assert_eq!(count_elements(&xml, b"w:tr"), 1);
        assert_eq!(count_elements(&xml, b"w:tc"), 2);

        // Runs inside translated paragraphs are collapsed to one.
        assert_eq!(count_elements(&xml, b"w:r"), 4);

        // Paragraph and cell properties survive.
        let haystack = String::from_utf8_lossy(&xml);
        assert!(haystack.contains(r#"<w:jc w:val="center"/>"#));
        assert!(haystack.contains(r#"<w:shd w:fill="FFFF00"/>"#));
    }

    #[tokio::test]
    async fn untouched_parts_are_copied_through() {
        let docx = sample_docx();
        let (output, _) = translate_docx(
            &docx,
            &UppercaseTranslator,
            &Lang::auto(),
            &Lang::new("de"),
        )
        .await
        .unwrap();

        let styles = crate::office::read_part(&output, "word/styles.xml", "docx").unwrap();
        assert_eq!(styles, b"<w:styles/>");
    }

    #[tokio::test]
    async fn document_without_text_yields_zero_units() {
        let docx = build_archive(&[(
            "word/document.xml",
            r#"<w:document xmlns:w="x"><w:body><w:p/></w:body></w:document>"#,
        )]);
        let (_, units) = translate_docx(
            &docx,
            &UppercaseTranslator,
            &Lang::auto(),
            &Lang::new("es"),
        )
        .await
        .unwrap();
        assert_eq!(units, 0);
    }

    #[test]
    fn extract_text_joins_runs_per_paragraph() {
        let docx = sample_docx();
        let text = extract_text(&docx).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Hello world");
        assert_eq!(lines[1], "Second paragraph");
    }
}
