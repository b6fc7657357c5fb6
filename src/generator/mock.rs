use std::path::Path;

use crate::core::read_image_file;
use crate::error::GenerationError;

use super::{DiaryGenerator, PromptAwareGenerator};

const DEFAULT_TEXT: &str =
    "この植物は順調に成長しています。葉の色が鮮やかで、新しい芽も見られます。";

/// Offline generator returning the same text for every image.
/// Used when no API key is configured.
#[derive(Debug, Clone)]
pub(crate) struct FixedGenerator {
    text: String,
}

impl FixedGenerator {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for FixedGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT)
    }
}

impl DiaryGenerator for FixedGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn generate(&self, image_path: &Path) -> Result<String, GenerationError> {
        read_image_file(image_path)?;
        if self.text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(self.text.clone())
    }

    fn prompt_aware(&self) -> Option<&dyn PromptAwareGenerator> {
        Some(self)
    }
}

impl PromptAwareGenerator for FixedGenerator {
    fn generate_with_prompt(
        &self,
        image_path: &Path,
        _prompt: &str,
    ) -> Result<String, GenerationError> {
        self.generate(image_path)
    }
}
