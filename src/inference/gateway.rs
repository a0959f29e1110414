use crate::{
    config::HfConfig,
    error::{HfError, Result},
    models::{
        sniff_mime, GeneratedImage, GenerationError, GenerationErrorKind, ImageGenerationPayload,
        ImagePayload, ImageRequest, TextGenerationPayload, TextRequest,
    },
};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Response, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

pub type GatewayResult<T> = std::result::Result<T, GenerationError>;

/// The hosted inference boundary. Each method is exactly one outbound call.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    async fn text_to_image(&self, model: &str, request: &ImageRequest) -> GatewayResult<ImagePayload>;

    /// Returns the decoded JSON body as-is; shaping it into text is the
    /// caller's job.
    async fn text_generation(&self, model: &str, request: &TextRequest) -> GatewayResult<Value>;
}

/// Hugging Face Inference API over HTTPS.
pub struct HfInferenceGateway {
    client: Client,
    base_url: String,
    token: SecretString,
    wait_for_model: bool,
}

impl HfInferenceGateway {
    pub fn new(config: &HfConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| HfError::ClientError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            wait_for_model: config.wait_for_model,
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model.trim_start_matches('/'))
    }

    fn build_headers(&self) -> GatewayResult<HeaderMap> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret()))
            .map_err(|_| {
                GenerationError::new(
                    GenerationErrorKind::Authentication,
                    "HF_TOKEN contains characters that are not valid in an HTTP header",
                )
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        if self.wait_for_model {
            headers.insert("x-wait-for-model", HeaderValue::from_static("true"));
        }
        Ok(headers)
    }

    async fn post<T: Serialize + ?Sized>(&self, model: &str, body: &T) -> GatewayResult<Response> {
        let url = self.model_url(model);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        log::debug!("Inference API returned {} for model {}", status, model);
        Err(status_error(status, &error_text))
    }
}

#[async_trait]
impl InferenceGateway for HfInferenceGateway {
    async fn text_to_image(&self, model: &str, request: &ImageRequest) -> GatewayResult<ImagePayload> {
        let response = self.post(model, &ImageGenerationPayload::from(request)).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase());

        let body = response.bytes().await.map_err(transport_error)?;
        parse_image_body(content_type.as_deref(), &body)
    }

    async fn text_generation(&self, model: &str, request: &TextRequest) -> GatewayResult<Value> {
        let response = self.post(model, &TextGenerationPayload::from(request)).await?;
        let body = response.bytes().await.map_err(transport_error)?;
        parse_text_body(&body)
    }
}

/// JSON bodies are decoded as-is; any other UTF-8 body is the raw generated
/// text and comes back as a JSON string.
pub(crate) fn parse_text_body(body: &[u8]) -> GatewayResult<Value> {
    if body.is_empty() {
        return Err(GenerationError::unexpected_response("inference API returned an empty body"));
    }

    if let Ok(json) = serde_json::from_slice(body) {
        return Ok(json);
    }

    String::from_utf8(body.to_vec())
        .map(Value::String)
        .map_err(|_| GenerationError::unexpected_response("response body is neither JSON nor UTF-8 text"))
}

fn transport_error(err: reqwest::Error) -> GenerationError {
    let kind = if err.is_timeout() {
        GenerationErrorKind::Timeout
    } else {
        GenerationErrorKind::Network
    };
    GenerationError::new(kind, err.to_string())
}

/// Builds the error for a non-success status, preferring the API's own
/// `error` field over the raw body.
pub(crate) fn status_error(status: StatusCode, body: &str) -> GenerationError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let detail = parsed
        .as_ref()
        .and_then(|json| match json.get("error")? {
            Value::String(message) => Some(message.clone()),
            Value::Array(messages) => Some(
                messages
                    .iter()
                    .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_string))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        })
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("no details").to_string());

    let mut message = format!("{}: {}", status, detail);
    if let Some(eta) = parsed
        .as_ref()
        .and_then(|json| json.get("estimated_time"))
        .and_then(Value::as_f64)
    {
        message.push_str(&format!(" (estimated time {:.0}s)", eta));
    }

    GenerationError::new(GenerationErrorKind::from_status(status.as_u16()), message)
}

pub(crate) fn parse_image_body(content_type: Option<&str>, body: &[u8]) -> GatewayResult<ImagePayload> {
    if body.is_empty() {
        return Err(GenerationError::unexpected_response("inference API returned an empty body"));
    }

    match content_type {
        Some(ct) if ct.starts_with("image/") => {
            Ok(ImagePayload::Single(GeneratedImage::new(body.to_vec(), ct)))
        }
        Some(ct) if ct.contains("json") => parse_image_json(body),
        _ => match sniff_mime(body) {
            Some(mime) => Ok(ImagePayload::Single(GeneratedImage::new(body.to_vec(), mime))),
            None => parse_image_json(body),
        },
    }
}

fn parse_image_json(body: &[u8]) -> GatewayResult<ImagePayload> {
    let json: Value = serde_json::from_slice(body).map_err(|_| {
        GenerationError::unexpected_response("response is neither an image nor a JSON document")
    })?;

    match json {
        Value::String(encoded) => Ok(ImagePayload::Single(GeneratedImage::from_base64(&encoded)?)),
        Value::Array(items) => decode_sequence(&items),
        Value::Object(ref map) => match (map.get("images"), map.get("error")) {
            (Some(Value::Array(items)), _) => decode_sequence(items),
            (_, Some(Value::String(message))) => {
                Err(GenerationError::new(GenerationErrorKind::Gateway, message.clone()))
            }
            _ => Err(unexpected_shape(&json)),
        },
        other => Err(unexpected_shape(&other)),
    }
}

fn decode_sequence(items: &[Value]) -> GatewayResult<ImagePayload> {
    items
        .iter()
        .map(|item| match item {
            Value::String(encoded) => GeneratedImage::from_base64(encoded),
            other => Err(unexpected_shape(other)),
        })
        .collect::<GatewayResult<Vec<_>>>()
        .map(ImagePayload::Sequence)
}

fn unexpected_shape(json: &Value) -> GenerationError {
    let mut preview = json.to_string();
    if preview.len() > 120 {
        let cut = (0..=120).rev().find(|i| preview.is_char_boundary(*i)).unwrap_or(0);
        preview.truncate(cut);
        preview.push('…');
    }
    GenerationError::unexpected_response(format!("unexpected image response shape: {}", preview))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const MODEL: &str = "fofr/sdxl-emoji";

    fn gateway(server: &MockServer) -> HfInferenceGateway {
        let config = HfConfig::new("hf_test").with_base_url(format!("{}/models/", server.uri()));
        HfInferenceGateway::new(&config).unwrap()
    }

    #[tokio::test]
    async fn text_to_image_posts_prompt_and_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/fofr/sdxl-emoji"))
            .and(header("authorization", "Bearer hf_test"))
            .and(body_json(json!({
                "inputs": "A cute red panda chef cooking sushi",
                "parameters": { "width": 1024, "height": 1024, "guidance_scale": 7.5 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PNG.to_vec(), "image/png"))
            .expect(1)
            .mount(&server)
            .await;

        let request = ImageRequest::new("A cute red panda chef cooking sushi");
        let payload = gateway(&server).text_to_image(MODEL, &request).await.unwrap();

        assert_eq!(payload, ImagePayload::Single(GeneratedImage::new(PNG.to_vec(), "image/png")));
    }

    #[tokio::test]
    async fn text_to_image_accepts_a_json_sequence() {
        let server = MockServer::start().await;
        let encoded = STANDARD.encode(PNG);

        Mock::given(method("POST"))
            .and(path("/models/fofr/sdxl-emoji"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([encoded, encoded])))
            .mount(&server)
            .await;

        let payload = gateway(&server)
            .text_to_image(MODEL, &ImageRequest::new("two pandas"))
            .await
            .unwrap();

        match payload {
            ImagePayload::Sequence(images) => {
                assert_eq!(images.len(), 2);
                assert_eq!(images[0].bytes, PNG.to_vec());
                assert_eq!(images[0].mime_type, "image/png");
            }
            other => panic!("expected a sequence, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn text_generation_sends_max_new_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gpt2"))
            .and(body_json(json!({
                "inputs": "Explain whether apples are healthy",
                "parameters": { "max_new_tokens": 150 }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "generated_text": "Apples are healthy." }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let value = gateway(&server)
            .text_generation("gpt2", &TextRequest::new("Explain whether apples are healthy"))
            .await
            .unwrap();

        assert_eq!(value, json!([{ "generated_text": "Apples are healthy." }]));
    }

    #[tokio::test]
    async fn wait_for_model_header_is_sent_when_enabled() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-wait-for-model", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let config = HfConfig::new("hf_test")
            .with_base_url(server.uri())
            .with_wait_for_model(true);
        let gateway = HfInferenceGateway::new(&config).unwrap();

        let value = gateway.text_generation("gpt2", &TextRequest::new("hi")).await.unwrap();
        assert_eq!(value, json!("ok"));
    }

    #[tokio::test]
    async fn error_statuses_map_to_kinds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/missing/model"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "error": "Model missing/model does not exist" })),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/models/busy/model"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let gw = gateway(&server);

        let err = gw
            .text_generation("missing/model", &TextRequest::new("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::ModelNotFound);
        assert!(err.message.contains("Model missing/model does not exist"));

        let err = gw
            .text_to_image("busy/model", &ImageRequest::new("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::RateLimited);
        assert!(err.message.ends_with("slow down"));
    }

    #[tokio::test]
    async fn slow_gateway_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = HfConfig::new("hf_test")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(100));
        let gateway = HfInferenceGateway::new(&config).unwrap();

        let err = gateway
            .text_generation("gpt2", &TextRequest::new("Explain whether apples are healthy"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Timeout);
    }

    #[tokio::test]
    async fn plain_text_body_passes_through_as_raw_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Apples are healthy."))
            .mount(&server)
            .await;

        let value = gateway(&server)
            .text_generation("gpt2", &TextRequest::new("Explain whether apples are healthy"))
            .await
            .unwrap();
        assert_eq!(value, json!("Apples are healthy."));
    }

    #[test]
    fn text_body_rejects_empty_and_non_utf8() {
        let err = parse_text_body(b"").unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::UnexpectedResponse);

        let err = parse_text_body(&[0xFF, 0xFE, 0x00, 0x9F]).unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::UnexpectedResponse);

        assert_eq!(
            parse_text_body(br#"[{"generated_text":"ok"}]"#).unwrap(),
            json!([{ "generated_text": "ok" }])
        );
    }

    #[test]
    fn status_error_reports_loading_eta() {
        let err = status_error(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":"Model fofr/sdxl-emoji is currently loading","estimated_time":20.0}"#,
        );
        assert_eq!(err.kind, GenerationErrorKind::ModelLoading);
        assert_eq!(
            err.message,
            "503 Service Unavailable: Model fofr/sdxl-emoji is currently loading (estimated time 20s)"
        );
    }

    #[test]
    fn status_error_joins_error_lists_and_handles_empty_bodies() {
        let err = status_error(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error":["bad width","bad height"]}"#);
        assert_eq!(err.kind, GenerationErrorKind::InvalidRequest);
        assert!(err.message.ends_with("bad width; bad height"));

        let err = status_error(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.kind, GenerationErrorKind::Authentication);
        assert_eq!(err.message, "401 Unauthorized: Unauthorized");
    }

    #[test]
    fn image_body_without_content_type_is_sniffed() {
        let payload = parse_image_body(None, &PNG).unwrap();
        assert_eq!(payload, ImagePayload::Single(GeneratedImage::new(PNG.to_vec(), "image/png")));
    }

    #[test]
    fn image_body_shapes_that_do_not_match_are_rejected() {
        let err = parse_image_body(Some("application/json"), br#"{"foo": 1}"#).unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::UnexpectedResponse);

        let err = parse_image_body(Some("text/plain"), b"definitely not an image").unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::UnexpectedResponse);

        let err = parse_image_body(Some("image/png"), b"").unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::UnexpectedResponse);

        let err = parse_image_body(Some("application/json"), b"[1, 2]").unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::UnexpectedResponse);
    }

    #[test]
    fn image_json_object_forms() {
        let encoded = STANDARD.encode(PNG);
        let body = serde_json::to_vec(&json!({ "images": [encoded] })).unwrap();
        assert!(matches!(
            parse_image_body(Some("application/json"), &body).unwrap(),
            ImagePayload::Sequence(images) if images.len() == 1
        ));

        let err = parse_image_body(Some("application/json"), br#"{"error":"NSFW content"}"#).unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Gateway);
        assert_eq!(err.message, "NSFW content");
    }
}
