pub mod handlers;
mod page;

use crate::{config::ServerConfig, error::Result, inference::InferenceClient};
use actix_web::{middleware, web, App, HttpServer};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .route("/api/text-to-image", web::post().to(handlers::text_to_image))
        .route("/api/text-generation", web::post().to(handlers::text_generation));
}

/// Serves the two panels until the process is stopped.
pub async fn run(client: InferenceClient, server: &ServerConfig) -> Result<()> {
    let data = web::Data::new(client);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(middleware::Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .bind(server.bind_address())?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::StubGateway;
    use crate::models::{GeneratedImage, GenerationError, GenerationErrorKind, ImagePayload};
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};
    use std::sync::Arc;

    const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn data(gateway: Arc<StubGateway>) -> web::Data<InferenceClient> {
        web::Data::new(InferenceClient::with_gateway(gateway, "fofr/sdxl-emoji"))
    }

    #[actix_web::test]
    async fn index_serves_both_panels() {
        let gateway = Arc::new(StubGateway::text(Ok(json!("unused"))));
        let app = test::init_service(App::new().app_data(data(gateway)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = String::from_utf8(body.to_vec()).unwrap();

        assert!(html.contains("Nutri-Coach HF Proxy Space"));
        assert!(html.contains("Text to Image"));
        assert!(html.contains("Text Generation"));
    }

    #[actix_web::test]
    async fn health_reports_the_model() {
        let gateway = Arc::new(StubGateway::text(Ok(json!("unused"))));
        let app = test::init_service(App::new().app_data(data(gateway)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "status": "ok", "model": "fofr/sdxl-emoji" }));
    }

    #[actix_web::test]
    async fn text_to_image_returns_a_data_url() {
        let image = GeneratedImage::new(PNG.to_vec(), "image/png");
        let gateway = Arc::new(StubGateway::image(Ok(ImagePayload::Single(image.clone()))));
        let app = test::init_service(App::new().app_data(data(gateway)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/text-to-image")
            .set_json(json!({
                "prompt": "A cute red panda chef cooking sushi",
                "width": 1024,
                "height": 1024,
                "guidance_scale": 7.5
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["mime_type"], "image/png");
        assert_eq!(body["image"], image.to_data_url());
    }

    #[actix_web::test]
    async fn gateway_failure_is_still_a_200() {
        let failure = GenerationError::new(GenerationErrorKind::ModelNotFound, "404 Not Found: no such model");
        let gateway = Arc::new(StubGateway::image(Err(failure)));
        let app = test::init_service(App::new().app_data(data(gateway)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/text-to-image")
            .set_json(json!({ "prompt": "a fox" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "status": "error",
                "kind": "model_not_found",
                "message": "Error generating image: 404 Not Found: no such model"
            })
        );
    }

    #[actix_web::test]
    async fn out_of_range_sizes_never_reach_the_gateway() {
        let gateway = Arc::new(StubGateway::image(Ok(ImagePayload::Sequence(Vec::new()))));
        let app =
            test::init_service(App::new().app_data(data(gateway.clone())).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/text-to-image")
            .set_json(json!({ "prompt": "huge", "width": 4096, "height": 1024 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "invalid_request");
        assert!(gateway.calls().is_empty());
    }

    #[actix_web::test]
    async fn text_generation_round_trip() {
        let gateway = Arc::new(StubGateway::text(Ok(json!([{ "generated_text": "Yes, in moderation." }]))));
        let app =
            test::init_service(App::new().app_data(data(gateway.clone())).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/text-generation")
            .set_json(json!({ "prompt": "Explain whether apples are healthy", "max_tokens": 150 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, json!({ "status": "ok", "text": "Yes, in moderation." }));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[actix_web::test]
    async fn text_generation_timeout_renders_error_text() {
        let timeout = GenerationError::new(GenerationErrorKind::Timeout, "operation timed out");
        let gateway = Arc::new(StubGateway::text(Err(timeout)));
        let app = test::init_service(App::new().app_data(data(gateway)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/text-generation")
            .set_json(json!({ "prompt": "Explain whether apples are healthy" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["kind"], "timeout");
        assert_eq!(body["message"], "Error generating text: operation timed out");
    }
}
