use crate::{
    inference::InferenceClient,
    models::{
        Capability, GenerationError, GenerationErrorKind, ImageRequest, ImageResult, TextRequest,
        TextResult, DEFAULT_GUIDANCE_SCALE, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_TOKENS, MAX_GUIDANCE_SCALE,
        MAX_IMAGE_SIZE, MAX_MAX_TOKENS, MIN_IMAGE_SIZE, MIN_MAX_TOKENS,
    },
    server::page,
};
use actix_web::{web, HttpResponse};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ImageForm {
    #[serde(default)]
    pub prompt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub guidance_scale: Option<f32>,
}

impl ImageForm {
    fn into_request(self) -> ImageRequest {
        ImageRequest::new(self.prompt)
            .with_size(
                self.width.unwrap_or(DEFAULT_IMAGE_SIZE),
                self.height.unwrap_or(DEFAULT_IMAGE_SIZE),
            )
            .with_guidance_scale(self.guidance_scale.unwrap_or(DEFAULT_GUIDANCE_SCALE))
    }
}

#[derive(Debug, Deserialize)]
pub struct TextForm {
    #[serde(default)]
    pub prompt: String,
    /// Sliders may post fractional values or numeric strings; both are
    /// truncated to a count.
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub max_tokens: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(value)) => Ok(Some(value)),
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("max_tokens must be a number, got '{}'", text))),
    }
}

impl TextForm {
    fn into_request(self) -> TextRequest {
        // `as` saturates and maps NaN to zero.
        let max_tokens = self
            .max_tokens
            .map_or(DEFAULT_MAX_TOKENS, |value| value.trunc() as u32);
        TextRequest::new(self.prompt).with_max_tokens(max_tokens)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImageResponse {
    Ok { image: String, mime_type: String },
    Error { kind: GenerationErrorKind, message: String },
}

impl From<ImageResult> for ImageResponse {
    fn from(result: ImageResult) -> Self {
        match result {
            Ok(image) => ImageResponse::Ok {
                image: image.to_data_url(),
                mime_type: image.mime_type,
            },
            Err(e) => ImageResponse::Error {
                kind: e.kind,
                message: e.render(Capability::Image),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TextResponse {
    Ok { text: String },
    Error { kind: GenerationErrorKind, message: String },
}

impl From<TextResult> for TextResponse {
    fn from(result: TextResult) -> Self {
        match result {
            Ok(text) => TextResponse::Ok { text },
            Err(e) => TextResponse::Error {
                kind: e.kind,
                message: e.render(Capability::Text),
            },
        }
    }
}

/// Rejects values the page's sliders could never produce.
fn check_image_bounds(request: &ImageRequest) -> Result<(), GenerationError> {
    let size_range = MIN_IMAGE_SIZE..=MAX_IMAGE_SIZE;
    if !size_range.contains(&request.width) || !size_range.contains(&request.height) {
        return Err(GenerationError::invalid_request(format!(
            "width and height must be between {} and {}, got {}x{}",
            MIN_IMAGE_SIZE, MAX_IMAGE_SIZE, request.width, request.height
        )));
    }

    if !(0.0..=MAX_GUIDANCE_SCALE).contains(&request.guidance_scale) {
        return Err(GenerationError::invalid_request(format!(
            "guidance_scale must be between 0 and {}, got {}",
            MAX_GUIDANCE_SCALE, request.guidance_scale
        )));
    }

    Ok(())
}

fn check_text_bounds(request: &TextRequest) -> Result<(), GenerationError> {
    if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&request.max_tokens) {
        return Err(GenerationError::invalid_request(format!(
            "max_tokens must be between {} and {}, got {}",
            MIN_MAX_TOKENS, MAX_MAX_TOKENS, request.max_tokens
        )));
    }
    Ok(())
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page::INDEX_HTML)
}

pub async fn health(client: web::Data<InferenceClient>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok", "model": client.model() }))
}

pub async fn text_to_image(
    client: web::Data<InferenceClient>,
    form: web::Json<ImageForm>,
) -> HttpResponse {
    let request = form.into_inner().into_request();

    let result = match check_image_bounds(&request) {
        Ok(()) => client.image().generate(request).await,
        Err(e) => {
            log::warn!("Rejected image request: {}", e);
            Err(e)
        }
    };

    HttpResponse::Ok().json(ImageResponse::from(result))
}

pub async fn text_generation(
    client: web::Data<InferenceClient>,
    form: web::Json<TextForm>,
) -> HttpResponse {
    let request = form.into_inner().into_request();

    let result = match check_text_bounds(&request) {
        Ok(()) => client.text().generate(request).await,
        Err(e) => {
            log::warn!("Rejected text request: {}", e);
            Err(e)
        }
    };

    HttpResponse::Ok().json(TextResponse::from(result))
}
