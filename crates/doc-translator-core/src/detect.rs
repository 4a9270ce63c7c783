//! Language detection.
//!
//! Thin wrapper over whatlang. Detection is deterministic (whatlang is a
//! pure trigram classifier, no seeding needed) and never propagates an
//! error: anything undetectable comes back as `None` / `Detection::Empty`.

use crate::config::Lang;

/// Outcome of per-line detection over a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// No line yielded a detection result
    Empty,
    /// Exactly one distinct language across all lines
    Single(Lang),
    /// More than one distinct language observed
    Multi,
}

impl Detection {
    /// Human-readable label for UI/log display.
    pub fn label(&self) -> String {
        match self {
            Self::Empty => "Unknown".to_string(),
            Self::Single(lang) => lang.display_name().to_string(),
            Self::Multi => "multi".to_string(),
        }
    }
}

/// Detect the dominant language of `text`.
///
/// Returns `None` for empty/whitespace input or when detection is
/// unreliable.
pub fn detect_language(text: &str) -> Option<Lang> {
    if text.trim().is_empty() {
        return None;
    }
    let info = whatlang::detect(text)?;
    if !info.is_reliable() {
        return None;
    }
    Some(Lang::new(lang_to_code(info.lang())))
}

/// Detect languages line by line and report whether the text mixes them.
///
/// Each non-empty line is detected independently; lines that defeat the
/// detector are skipped rather than treated as errors.
pub fn detect_lines(text: &str) -> Detection {
    let mut seen: Vec<Lang> = Vec::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(lang) = detect_language(line)
            && !seen.contains(&lang)
        {
            seen.push(lang);
        }
    }

    let mut langs = seen.into_iter();
    match (langs.next(), langs.next()) {
        (None, _) => Detection::Empty,
        (Some(lang), None) => Detection::Single(lang),
        _ => Detection::Multi,
    }
}

/// Map whatlang's ISO 639-3 variants onto the short codes the backend and
/// the UI table use.
fn lang_to_code(lang: whatlang::Lang) -> &'static str {
    use whatlang::Lang::{
        Ara, Cmn, Deu, Eng, Fra, Hin, Ita, Jpn, Kor, Nld, Pol, Por, Rus, Spa, Tha, Tur, Ukr, Vie,
    };
    match lang {
        Eng => "en",
        Cmn => "zh-CN",
        Jpn => "ja",
        Kor => "ko",
        Fra => "fr",
        Deu => "de",
        Spa => "es",
        Rus => "ru",
        Por => "pt",
        Ita => "it",
        Ara => "ar",
        Hin => "hi",
        Tur => "tr",
        Vie => "vi",
        Tha => "th",
        Nld => "nl",
        Pol => "pl",
        Ukr => "uk",
        other => other.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str =
        "The quick brown fox jumps over the lazy dog and keeps on running through the forest.";
    const RUSSIAN: &str =
        "Быстрая коричневая лиса перепрыгивает через ленивую собаку и бежит дальше по лесу.";

    #[test]
    fn detects_english() {
        assert_eq!(detect_language(ENGLISH), Some(Lang::new("en")));
    }

    #[test]
    fn empty_and_whitespace_yield_none() {
        assert_eq!(detect_language(""), None);
        assert_eq!(detect_language("   \n\t  "), None);
    }

    #[test]
    fn detection_is_deterministic() {
        let first = detect_language(RUSSIAN);
        let second = detect_language(RUSSIAN);
        assert_eq!(first, second);
    }

    #[test]
    fn single_language_lines_yield_single() {
        let text = format!("{ENGLISH}\n\n{ENGLISH}");
        assert_eq!(detect_lines(&text), Detection::Single(Lang::new("en")));
    }

    #[test]
    fn mixed_language_lines_yield_multi() {
        let text = format!("{ENGLISH}\n{RUSSIAN}");
        assert_eq!(detect_lines(&text), Detection::Multi);
    }

    #[test]
    fn blank_text_yields_empty() {
        assert_eq!(detect_lines("\n  \n"), Detection::Empty);
        assert_eq!(Detection::Empty.label(), "Unknown");
    }
}
