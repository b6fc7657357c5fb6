//! Diary text generation
//!
//! Every generator can describe an image on its own. Generators that can
//! also take the history prompt advertise it through
//! [`DiaryGenerator::prompt_aware`]; the ingestion worker asks at call time
//! and falls back to the plain shape when the answer is `None`.

mod gemini;
mod mock;

use std::path::Path;

use crate::error::GenerationError;

pub(crate) use gemini::{GeminiConfig, GeminiGenerator};
pub(crate) use mock::FixedGenerator;

pub(crate) trait DiaryGenerator: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn generate(&self, image_path: &Path) -> Result<String, GenerationError>;

    /// The prompt-aware shape of this generator, if it has one.
    fn prompt_aware(&self) -> Option<&dyn PromptAwareGenerator> {
        None
    }
}

pub(crate) trait PromptAwareGenerator: Send + Sync {
    fn generate_with_prompt(
        &self,
        image_path: &Path,
        prompt: &str,
    ) -> Result<String, GenerationError>;
}

/// Call the richest shape the generator supports.
pub(crate) fn generate_diary(
    generator: &dyn DiaryGenerator,
    image_path: &Path,
    prompt: &str,
) -> Result<String, GenerationError> {
    match generator.prompt_aware() {
        Some(extended) => extended.generate_with_prompt(image_path, prompt),
        None => generator.generate(image_path),
    }
}
