//! Hugging Face Inference API proxy: text-to-image and text generation
//! behind typed handlers, with an optional local web front-end.

pub mod config;
pub mod error;
pub mod inference;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;

pub use config::{HfConfig, ServerConfig};
pub use error::{HfError, Result};
pub use inference::{HfInferenceGateway, ImageClient, InferenceClient, InferenceGateway, TextClient};
pub use models::{
    Capability, GeneratedImage, GenerationError, GenerationErrorKind, ImagePayload, ImageRequest,
    ImageResult, TextRequest, TextResult,
};
