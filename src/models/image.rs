use super::common::GenerationError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_SIZE: u32 = 1024;
pub const DEFAULT_GUIDANCE_SCALE: f32 = 7.5;

pub const MIN_IMAGE_SIZE: u32 = 256;
pub const MAX_IMAGE_SIZE: u32 = 2048;
pub const MAX_GUIDANCE_SCALE: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub guidance_scale: f32,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }
}

/// Wire body for the text-to-image call.
#[derive(Debug, Serialize)]
pub struct ImageGenerationPayload<'a> {
    pub inputs: &'a str,
    pub parameters: ImageGenerationParameters,
}

#[derive(Debug, Serialize)]
pub struct ImageGenerationParameters {
    pub width: u32,
    pub height: u32,
    pub guidance_scale: f32,
}

impl<'a> From<&'a ImageRequest> for ImageGenerationPayload<'a> {
    fn from(request: &'a ImageRequest) -> Self {
        Self {
            inputs: &request.prompt,
            parameters: ImageGenerationParameters {
                width: request.width,
                height: request.height,
                guidance_scale: request.guidance_scale,
            },
        }
    }
}

/// An in-memory raster returned by the text-to-image call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Decodes a base64 payload and guesses its type from the magic bytes,
    /// falling back to `application/octet-stream` for unrecognised formats.
    pub fn from_base64(encoded: &str) -> Result<Self, GenerationError> {
        // Some providers hand back a full data URL rather than bare base64.
        let raw = encoded
            .split_once(";base64,")
            .map_or(encoded, |(_, data)| data);

        let bytes = STANDARD.decode(raw.trim()).map_err(|e| {
            GenerationError::unexpected_response(format!("image payload is not valid base64: {}", e))
        })?;

        let mime_type = sniff_mime(&bytes).unwrap_or("application/octet-stream");

        Ok(Self::new(bytes, mime_type))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// What the gateway handed back for one text-to-image call.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    Single(GeneratedImage),
    Sequence(Vec<GeneratedImage>),
}

pub type ImageResult = Result<GeneratedImage, GenerationError>;

pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
