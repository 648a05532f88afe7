//! Text generation provider abstraction.

use async_trait::async_trait;
use hueguide_core::Error;
use serde::{Deserialize, Serialize};

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for DecodingParams {
    /// Near-deterministic answers, capped at 800 tokens.
    fn default() -> Self {
        Self { temperature: 0.1, max_output_tokens: 800, top_p: 0.95, top_k: 40 }
    }
}

/// A single-turn generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Persona and standing rules for the model.
    pub system_instruction: String,
    /// The full user prompt.
    pub prompt: String,
    pub params: DecodingParams,
}

/// A generative text backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `request`.
    ///
    /// Safety refusals surface as [`Error::ContentBlocked`].
    async fn generate(&self, request: &GenerationRequest) -> Result<String, Error>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding_defaults() {
        let params = DecodingParams::default();
        assert_eq!(params.temperature, 0.1);
        assert_eq!(params.max_output_tokens, 800);
        assert_eq!(params.top_p, 0.95);
        assert_eq!(params.top_k, 40);
    }
}
