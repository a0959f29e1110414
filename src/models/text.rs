use super::common::GenerationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TOKENS: u32 = 150;

pub const MIN_MAX_TOKENS: u32 = 1;
pub const MAX_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Wire body for the text-generation call.
#[derive(Debug, Serialize)]
pub struct TextGenerationPayload<'a> {
    pub inputs: &'a str,
    pub parameters: TextGenerationParameters,
}

#[derive(Debug, Serialize)]
pub struct TextGenerationParameters {
    pub max_new_tokens: u32,
}

impl<'a> From<&'a TextRequest> for TextGenerationPayload<'a> {
    fn from(request: &'a TextRequest) -> Self {
        Self {
            inputs: &request.prompt,
            parameters: TextGenerationParameters {
                max_new_tokens: request.max_tokens,
            },
        }
    }
}

pub type TextResult = Result<String, GenerationError>;
