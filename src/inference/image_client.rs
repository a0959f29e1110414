use crate::{
    inference::InferenceGateway,
    logger,
    models::{GenerationError, ImagePayload, ImageRequest, ImageResult},
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ImageClient {
    gateway: Arc<dyn InferenceGateway>,
    model: String,
}

impl ImageClient {
    pub fn new(gateway: Arc<dyn InferenceGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One text-to-image call. Failures come back as values, never panics.
    pub async fn generate(&self, request: ImageRequest) -> ImageResult {
        let request_id = Uuid::new_v4();
        log::info!(
            "Generating {}x{} image with model: {} [req:{}]",
            request.width,
            request.height,
            self.model,
            request_id
        );
        log::debug!("guidance_scale={} prompt={:?}", request.guidance_scale, request.prompt);

        let outcome = {
            let _timer = logger::timer(format!("Image generation [req:{}]", request_id));
            self.gateway
                .text_to_image(&self.model, &request)
                .await
                .and_then(select_image)
        };

        match &outcome {
            Ok(image) => log::info!(
                "Image ready: {} bytes of {} [req:{}]",
                image.bytes.len(),
                image.mime_type,
                request_id
            ),
            Err(e) => log::error!("Image generation failed [req:{}]: {}", request_id, e),
        }

        outcome
    }
}

/// A sequence yields its first image; a single image passes through untouched.
pub fn select_image(payload: ImagePayload) -> ImageResult {
    match payload {
        ImagePayload::Single(image) => Ok(image),
        ImagePayload::Sequence(images) => images.into_iter().next().ok_or_else(|| {
            GenerationError::unexpected_response("inference API returned an empty image list")
        }),
    }
}
