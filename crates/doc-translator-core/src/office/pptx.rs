//! PPTX translation.
//!
//! PowerPoint decks are translated run by run: every `a:t` text element in
//! every slide part is replaced in place, leaving run properties and shape
//! geometry untouched. Unlike the DOCX path there is no run collapsing, so
//! per-run formatting survives exactly.

use std::collections::HashMap;
use std::io::Cursor;

use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::config::Lang;
use crate::error::{Error, Result};
use crate::translator::{translate_or_original, Translator};

fn xml_err(part: &str, e: impl std::fmt::Display) -> Error {
    Error::OoxmlXml {
        part: part.to_string(),
        reason: e.to_string(),
    }
}

fn is_slide_part(name: &str) -> bool {
    name.starts_with("ppt/slides/slide") && name.ends_with(".xml")
}

/// Translate a PPTX deck, returning the rebuilt archive and the number of
/// text runs that were translated across all slides.
pub async fn translate_pptx(
    bytes: &[u8],
    translator: &dyn Translator,
    source: &Lang,
    target: &Lang,
) -> Result<(Vec<u8>, usize)> {
    let slides = super::list_parts(bytes, "pptx", is_slide_part)?;

    let mut replaced = HashMap::new();
    let mut units = 0usize;

    for part in slides {
        let xml = super::read_part(bytes, &part, "pptx")?;
        let (rewritten, slide_units) =
            rewrite_slide(&xml, &part, translator, source, target).await?;
        debug!(part = %part, units = slide_units, "translated slide");
        units += slide_units;
        replaced.insert(part, rewritten);
    }

    let output = super::rewrite_archive(bytes, "pptx", &replaced)?;
    Ok((output, units))
}

/// Plain text of the deck, one line per paragraph, in slide order.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut text = String::new();

    for part in super::list_parts(bytes, "pptx", is_slide_part)? {
        let xml = super::read_part(bytes, &part, "pptx")?;

        let mut reader = Reader::from_reader(xml.as_slice());
        let mut buf = Vec::new();
        let mut in_text = false;

        loop {
            match reader
                .read_event_into(&mut buf)
                .map_err(|e| xml_err(&part, e))?
            {
                Event::Start(ref e) if e.name().as_ref() == b"a:t" => in_text = true,
                Event::End(ref e) if e.name().as_ref() == b"a:t" => in_text = false,
                Event::Text(ref t) if in_text => {
                    text.push_str(&t.unescape().map_err(|e| xml_err(&part, e))?);
                }
                Event::End(ref e) if e.name().as_ref() == b"a:p" => text.push('\n'),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    Ok(text)
}

async fn rewrite_slide(
    xml: &[u8],
    part: &str,
    translator: &dyn Translator,
    source: &Lang,
    target: &Lang,
) -> Result<(Vec<u8>, usize)> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut in_text = false;
    let mut units = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_err(part, e))?;

        match event {
            Event::Eof => break,
            Event::Start(ref e) if e.name().as_ref() == b"a:t" => {
                in_text = true;
                writer.write_event(event.clone()).map_err(|e| xml_err(part, e))?;
            }
            Event::End(ref e) if e.name().as_ref() == b"a:t" => {
                in_text = false;
                writer.write_event(event.clone()).map_err(|e| xml_err(part, e))?;
            }
            Event::Text(ref t) if in_text => {
                let original = t.unescape().map_err(|e| xml_err(part, e))?;
                if original.trim().is_empty() {
                    writer.write_event(event.clone()).map_err(|e| xml_err(part, e))?;
                } else {
                    let translated =
                        translate_or_original(translator, &original, source, target).await;
                    units += 1;
                    writer
                        .write_event(Event::Text(BytesText::new(&translated)))
                        .map_err(|e| xml_err(part, e))?;
                }
            }
            other => {
                writer.write_event(other).map_err(|e| xml_err(part, e))?;
            }
        }
        buf.clear();
    }

    Ok((writer.into_inner().into_inner(), units))
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

    const SLIDE_XML: &str = concat!(
        r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        r#"<p:cSld><p:spTree><p:sp><p:txBody>"#,
        r#"<a:p><a:r><a:rPr b="1"/><a:t>Hello</a:t></a:r>"#,
        r#"<a:r><a:t xml:space="preserve"> world</a:t></a:r></a:p>"#,
        r#"</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
    );

    fn sample_pptx() -> Vec<u8> {
        build_archive(&[
            ("[Content_Types].xml", "<Types/>"),
            ("ppt/slides/slide1.xml", SLIDE_XML),
            (
                "ppt/slides/slide2.xml",
                r#"<p:sld xmlns:a="x" xmlns:p="y"><p:cSld><a:p><a:r><a:t>Second slide</a:t></a:r></a:p></p:cSld></p:sld>"#,
            ),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
        ])
    }

    fn count_runs(xml: &[u8]) -> usize {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut count = 0;
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(ref e) if e.name().as_ref() == b"a:r" => count += 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        count
    }

    #[tokio::test]
    async fn translates_every_run_in_every_slide() {
        let pptx = sample_pptx();
        let (output, units) = translate_pptx(
            &pptx,
            &UppercaseTranslator,
            &Lang::auto(),
            &Lang::new("es"),
        )
        .await
        .unwrap();

        // Two runs on slide 1, one on slide 2.
        assert_eq!(units, 3);

        let text = extract_text(&output).unwrap();
        assert!(text.contains("HELLO WORLD"));
        assert!(text.contains("SECOND SLIDE"));
    }

    #[tokio::test]
    async fn run_boundaries_and_properties_survive() {
        let pptx = sample_pptx();
        let (output, _) = translate_pptx(
            &pptx,
            &UppercaseTranslator,
            &Lang::auto(),
            &Lang::new("fr"),
        )
        .await
        .unwrap();

        let xml = crate::office::read_part(&output, "ppt/slides/slide1.xml", "pptx").unwrap();
        assert_eq!(count_runs(&xml), 2);

        let haystack = String::from_utf8_lossy(&xml);
        assert!(haystack.contains(r#"<a:rPr b="1"/>"#));
    }

    #[tokio::test]
    async fn relationship_parts_are_not_rewritten() {
        let pptx = sample_pptx();
        let (output, _) = translate_pptx(
            &pptx,
            &UppercaseTranslator,
            &Lang::auto(),
            &Lang::new("de"),
        )
        .await
        .unwrap();

        let rels =
            crate::office::read_part(&output, "ppt/slides/_rels/slide1.xml.rels", "pptx").unwrap();
        assert_eq!(rels, b"<Relationships/>");
    }

    #[test]
    fn extract_text_walks_slides_in_order() {
        let pptx = sample_pptx();
        let text = extract_text(&pptx).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Hello world");
        assert_eq!(lines[1], "Second slide");
    }
}
