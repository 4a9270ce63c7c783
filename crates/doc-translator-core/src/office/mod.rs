//! OOXML (DOCX/PPTX) adapters.
//!
//! Both formats are zip containers holding XML parts. The adapters rewrite
//! only the text-bearing parts with quick-xml and copy every other archive
//! entry through untouched, so styles, media, themes and relationships
//! survive byte-identical.

pub mod docx;
pub mod pptx;

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Error, Result};

fn archive_err(format: &'static str, reason: impl std::fmt::Display) -> Error {
    Error::OoxmlArchive {
        format,
        reason: reason.to_string(),
    }
}

/// Read one named part out of an OOXML archive.
pub(crate) fn read_part(bytes: &[u8], part: &str, format: &'static str) -> Result<Vec<u8>> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| archive_err(format, e))?;
    let mut file = archive
        .by_name(part)
        .map_err(|_| archive_err(format, format!("missing {part}")))?;

    let mut data = Vec::new();
    file.read_to_end(&mut data).map_err(|e| archive_err(format, e))?;
    Ok(data)
}

/// List part names matching a predicate, sorted for deterministic order.
pub(crate) fn list_parts(
    bytes: &[u8],
    format: &'static str,
    predicate: impl Fn(&str) -> bool,
) -> Result<Vec<String>> {
    let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| archive_err(format, e))?;
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| predicate(name))
        .map(ToString::to_string)
        .collect();
    names.sort();
    Ok(names)
}

/// Rebuild an OOXML archive, replacing the given parts and raw-copying the
/// rest (preserving their compression as-is).
pub(crate) fn rewrite_archive(
    bytes: &[u8],
    format: &'static str,
    replaced: &HashMap<String, Vec<u8>>,
) -> Result<Vec<u8>> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| archive_err(format, e))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let file = archive.by_index_raw(i).map_err(|e| archive_err(format, e))?;
        let name = file.name().to_string();

        if let Some(data) = replaced.get(&name) {
            writer
                .start_file(&name, SimpleFileOptions::default())
                .map_err(|e| archive_err(format, e))?;
            writer.write_all(data).map_err(|e| archive_err(format, e))?;
        } else {
            writer.raw_copy_file(file).map_err(|e| archive_err(format, e))?;
        }
    }

    let cursor = writer.finish().map_err(|e| archive_err(format, e))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a minimal OOXML-style archive from (name, xml) parts.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn build_archive(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in parts {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn rewrite_keeps_untouched_parts() {
        let original = build_archive(&[("a.xml", "<a/>"), ("b.xml", "<b/>")]);

        let mut replaced = HashMap::new();
        replaced.insert("a.xml".to_string(), b"<a>new</a>".to_vec());
        let rebuilt = rewrite_archive(&original, "docx", &replaced).unwrap();

        assert_eq!(read_part(&rebuilt, "a.xml", "docx").unwrap(), b"<a>new</a>");
        assert_eq!(read_part(&rebuilt, "b.xml", "docx").unwrap(), b"<b/>");
    }

    #[test]
    fn missing_part_is_a_parse_error() {
        let archive = build_archive(&[("other.xml", "<x/>")]);
        assert!(read_part(&archive, "word/document.xml", "docx").is_err());
    }

    #[test]
    fn garbage_bytes_are_an_archive_error() {
        assert!(read_part(b"not a zip", "word/document.xml", "docx").is_err());
    }
}
