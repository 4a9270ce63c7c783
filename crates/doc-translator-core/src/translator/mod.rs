mod openai;
mod traits;

pub use openai::OpenAiTranslator;
pub use traits::{Translator, TranslatorInfo};

use crate::config::{Lang, TranslatorConfig};
use crate::error::Result;
use std::sync::Arc;
use tracing::warn;

/// Create a translator from configuration
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn Translator>> {
    Ok(Arc::new(OpenAiTranslator::from_config(config)))
}

/// Best-effort translation of a single structural unit.
///
/// Translation failures are recovered here, as close to the source as
/// possible: the unit keeps its original text and the rest of the document
/// proceeds. This is the "never crash, never all-or-nothing" contract.
pub async fn translate_or_original(
    translator: &dyn Translator,
    text: &str,
    source: &Lang,
    target: &Lang,
) -> String {
    match translator.translate(text, source, target).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Could not translate chunk, keeping original: {}", e);
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        fn info(&self) -> TranslatorInfo {
            TranslatorInfo {
                name: "failing",
                requires_api_key: false,
                supports_auto_detect: false,
            }
        }

        async fn translate(&self, _text: &str, _source: &Lang, _target: &Lang) -> Result<String> {
            Err(Error::TranslationRequest("backend unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_translation_falls_back_to_original() {
        let out = translate_or_original(
            &FailingTranslator,
            "Hello world",
            &Lang::auto(),
            &Lang::new("es"),
        )
        .await;
        assert_eq!(out, "Hello world");
    }
}
