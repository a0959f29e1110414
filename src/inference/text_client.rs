use crate::{
    inference::InferenceGateway,
    logger,
    models::{GenerationError, TextRequest, TextResult},
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct TextClient {
    gateway: Arc<dyn InferenceGateway>,
    model: String,
}

impl TextClient {
    pub fn new(gateway: Arc<dyn InferenceGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, request: TextRequest) -> TextResult {
        let request_id = Uuid::new_v4();
        log::info!("Invoking model: {} [req:{}]", self.model, request_id);
        log::debug!("max_new_tokens={} prompt={:?}", request.max_tokens, request.prompt);

        let outcome = {
            let _timer = logger::timer(format!("Text generation [req:{}]", request_id));
            self.gateway
                .text_generation(&self.model, &request)
                .await
                .and_then(|raw| extract_generated_text(&raw))
        };

        match &outcome {
            Ok(text) => log::info!("Generated {} chars [req:{}]", text.len(), request_id),
            Err(e) => log::error!("Text generation failed [req:{}]: {}", request_id, e),
        }

        outcome
    }
}

/// Maps the raw JSON body onto plain text.
///
/// A bare string is the text. A structured body (object, or the documented
/// list of objects) yields its non-empty `generated_text`. Structured bodies
/// without that field are stringified whole.
pub fn extract_generated_text(raw: &Value) -> TextResult {
    match raw {
        Value::String(text) => Ok(text.clone()),
        Value::Null => Err(GenerationError::unexpected_response(
            "inference API returned a null body",
        )),
        other => {
            if let Some(text) = generated_text_field(other) {
                return Ok(text.to_string());
            }
            // Kept for compatibility; a stricter parser would reject this.
            log::warn!("Response has no generated_text, falling back to the raw response");
            Ok(other.to_string())
        }
    }
}

fn generated_text_field(raw: &Value) -> Option<&str> {
    let entry = match raw {
        Value::Array(items) => items.first()?,
        other => other,
    };
    entry
        .get("generated_text")?
        .as_str()
        .filter(|text| !text.is_empty())
}
