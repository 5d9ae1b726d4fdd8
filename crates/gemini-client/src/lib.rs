mod client;
mod error;
mod types;

pub use client::{GeminiClient, ModelBackend};
pub use error::GeminiError;
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    Role,
};
