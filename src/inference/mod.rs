pub mod gateway;
pub mod image_client;
pub mod text_client;

use crate::{config::HfConfig, error::Result};
use std::sync::Arc;

pub use gateway::{GatewayResult, HfInferenceGateway, InferenceGateway};
pub use image_client::ImageClient;
pub use text_client::TextClient;

/// Both capabilities bound to one shared gateway and model.
#[derive(Clone)]
pub struct InferenceClient {
    text_client: TextClient,
    image_client: ImageClient,
    model: String,
}

impl InferenceClient {
    pub fn new(config: &HfConfig) -> Result<Self> {
        let gateway = Arc::new(HfInferenceGateway::new(config)?);
        Ok(Self::with_gateway(gateway, config.model.clone()))
    }

    pub fn with_gateway(gateway: Arc<dyn InferenceGateway>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            text_client: TextClient::new(gateway.clone(), model.clone()),
            image_client: ImageClient::new(gateway, model.clone()),
            model,
        }
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
