use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Language codes following ISO 639-1 with regional variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn auto() -> Self {
        Self("auto".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_auto(&self) -> bool {
        self.0 == "auto"
    }

    /// Display name for the UI-exposed subset, or the raw code otherwise.
    pub fn display_name(&self) -> &str {
        display_name_for_code(&self.0).unwrap_or(&self.0)
    }
}

// Serde default functions for common languages
fn default_source_lang() -> Lang {
    Lang::auto()
}

fn default_target_lang() -> Lang {
    Lang::new("en")
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Translator backend configuration for OpenAI-compatible APIs.
///
/// Supports llama.cpp, Ollama, DeepSeek, OpenAI, and any other OpenAI-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TranslatorConfig {
    /// Create a new translator config
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            model: model.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/v1".to_string(),
            api_key: None,
            model: "default_model".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Filesystem locations used by the pipeline.
///
/// All paths are explicit so the core never depends on the process working
/// directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded files are saved under (web flow)
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Directory translated output files are written to.
    /// When `None`, output lands next to the input file.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Path of the CSV activity log
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("user_log.csv")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_dir: None,
            log_path: default_log_path(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source language ("auto" lets the backend infer)
    #[serde(default = "default_source_lang")]
    pub source_lang: Lang,

    /// Target language
    #[serde(default = "default_target_lang")]
    pub target_lang: Lang,

    /// Translator backend configuration
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Filesystem locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            translator: TranslatorConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}")))
    }

    /// Load from default locations (~/.config/doc-translator/config.toml, ./config.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("doc-translator").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        // Return defaults
        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

/// A language option for UI dropdowns
#[derive(Debug, Clone)]
pub struct LanguageOption {
    /// Backend language code (e.g., "en", "zh-CN")
    pub code: &'static str,
    /// Display name (e.g., "English", "Chinese (Simplified)")
    pub name: &'static str,
}

/// The fixed code <-> display-name table exposed to the UI.
///
/// This mapping must stay a bijection: `lang_for_display_name` and
/// `display_name_for_code` both resolve through it. The detector may return
/// codes outside this subset; those are displayed as the raw code.
const LANGUAGE_TABLE: &[LanguageOption] = &[
    LanguageOption { code: "en", name: "English" },
    LanguageOption { code: "es", name: "Spanish" },
    LanguageOption { code: "fr", name: "French" },
    LanguageOption { code: "de", name: "German" },
    LanguageOption { code: "zh-CN", name: "Chinese (Simplified)" },
    LanguageOption { code: "ja", name: "Japanese" },
    LanguageOption { code: "ko", name: "Korean" },
    LanguageOption { code: "ar", name: "Arabic" },
    LanguageOption { code: "ru", name: "Russian" },
    LanguageOption { code: "pt", name: "Portuguese" },
];

/// Languages available as translation target.
pub fn target_languages() -> Vec<LanguageOption> {
    LANGUAGE_TABLE.to_vec()
}

/// Resolve a human-readable display name to its backend code.
///
/// Returns `None` for names outside the exposed subset; callers surface that
/// as an invalid-target error without attempting a backend call.
pub fn lang_for_display_name(name: &str) -> Option<Lang> {
    LANGUAGE_TABLE
        .iter()
        .find(|opt| opt.name.eq_ignore_ascii_case(name))
        .map(|opt| Lang::new(opt.code))
}

/// Resolve a backend code to its display name within the exposed subset.
pub fn display_name_for_code(code: &str) -> Option<&'static str> {
    LANGUAGE_TABLE
        .iter()
        .find(|opt| opt.code.eq_ignore_ascii_case(code))
        .map(|opt| opt.name)
}

/// Default source language code
pub const DEFAULT_SOURCE_LANG: &str = "auto";
/// Default target language code
pub const DEFAULT_TARGET_LANG: &str = "en";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_table_is_bijective() {
        for opt in LANGUAGE_TABLE {
            let lang = lang_for_display_name(opt.name).expect("name resolves");
            assert_eq!(lang.as_str(), opt.code);
            assert_eq!(display_name_for_code(opt.code), Some(opt.name));
        }
    }

    #[test]
    fn unknown_display_name_is_rejected() {
        assert!(lang_for_display_name("Klingon").is_none());
    }

    #[test]
    fn detected_code_outside_subset_displays_raw() {
        let lang = Lang::new("uk");
        assert_eq!(lang.display_name(), "uk");
    }

    #[test]
    fn display_name_lookup_is_case_insensitive() {
        assert_eq!(
            lang_for_display_name("chinese (simplified)").map(|l| l.0),
            Some("zh-CN".to_string())
        );
    }
}
