//! Utility functions shared across the crate.

use std::path::{Path, PathBuf};

use crate::config::Lang;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Derive the output path for a translated file:
/// `<stem>_translated_<code>.<ext>`, placed in `output_dir` when given,
/// otherwise next to the input.
pub fn translated_output_path(input: &Path, target: &Lang, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("bin");

    let file_name = format!("{}_translated_{}.{}", stem, target.as_str(), ext);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// Derive the output name for the text-synthesis flow:
/// `<stem>_translated.pdf`.
pub fn synthesized_pdf_name(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("text");
    format!("{stem}_translated.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_appends_suffix_before_extension() {
        let out = translated_output_path(Path::new("/docs/report.docx"), &Lang::new("fr"), None);
        assert_eq!(out, PathBuf::from("/docs/report_translated_fr.docx"));
    }

    #[test]
    fn output_path_honors_output_dir() {
        let out = translated_output_path(
            Path::new("/uploads/deck.pptx"),
            &Lang::new("zh-CN"),
            Some(Path::new("/translated_files")),
        );
        assert_eq!(out, PathBuf::from("/translated_files/deck_translated_zh-CN.pptx"));
    }

    #[test]
    fn synthesized_name_drops_original_extension() {
        assert_eq!(synthesized_pdf_name("notes.docx"), "notes_translated.pdf");
        assert_eq!(synthesized_pdf_name("typed text"), "typed text_translated.pdf");
    }
}
