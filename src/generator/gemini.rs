//! Gemini `generateContent` client
//!
//! Sends the prompt and the photo as inline base64 data in a single user
//! turn and returns the concatenated text of the first candidate.

use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::core::{build_prompt, read_image_file};
use crate::error::{AppError, GenerationError};
use crate::utils::Timezone;

use super::{DiaryGenerator, PromptAwareGenerator};

pub(crate) const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub(crate) const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_MIME: &str = "image/jpeg";

#[derive(Debug, Clone)]
pub(crate) struct GeminiConfig {
    pub(crate) model: String,
    pub(crate) endpoint: String,
    pub(crate) timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub(crate) struct GeminiGenerator {
    agent: ureq::Agent,
    api_key: String,
    url: String,
}

impl GeminiGenerator {
    pub(crate) fn new(api_key: &str, config: GeminiConfig) -> Result<Self, AppError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::GeneratorInit(
                "GEMINI_API_KEY is empty".to_string(),
            ));
        }
        if config.model.trim().is_empty() {
            return Err(AppError::GeneratorInit("Gemini model is empty".to_string()));
        }

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();

        Ok(Self {
            agent,
            api_key: api_key.to_string(),
            url: generate_url(&config.endpoint, &config.model),
        })
    }

    fn call(&self, request: &GenerateRequest<'_>) -> Result<String, GenerationError> {
        let response = self
            .agent
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .send_json(request)
            .map_err(map_ureq_error)?;

        let mut body = response.into_body();
        let parsed: GenerateResponse = serde_json::from_reader(body.as_reader())
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        response_text(parsed)
    }
}

impl DiaryGenerator for GeminiGenerator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn generate(&self, image_path: &Path) -> Result<String, GenerationError> {
        self.generate_with_prompt(image_path, &build_prompt(&[], Timezone::default()))
    }

    fn prompt_aware(&self) -> Option<&dyn PromptAwareGenerator> {
        Some(self)
    }
}

impl PromptAwareGenerator for GeminiGenerator {
    fn generate_with_prompt(
        &self,
        image_path: &Path,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let image = read_image_file(image_path)?;
        let request = GenerateRequest::new(prompt, &image);
        self.call(&request)
    }
}

fn generate_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model.trim()
    )
}

fn map_ureq_error(err: ureq::Error) -> GenerationError {
    match err {
        ureq::Error::Timeout(_) => GenerationError::Timeout,
        ureq::Error::StatusCode(status) => GenerationError::Status { status },
        ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => GenerationError::Timeout,
        other => GenerationError::Transport(other.to_string()),
    }
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or(FALLBACK_MIME)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, image: &[u8]) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part {
                        text: Some(prompt),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: sniff_mime(image),
                            data: STANDARD.encode(image),
                        }),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

fn response_text(response: GenerateResponse) -> Result<String, GenerationError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}
