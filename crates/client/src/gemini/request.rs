//! Gemini `generateContent` request body.

use serde::Serialize;

use crate::generate::GenerationRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(req: &GenerationRequest) -> Self {
        let system_instruction = (!req.system_instruction.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![Part { text: req.system_instruction.clone() }],
        });

        Self {
            system_instruction,
            contents: vec![Content { role: Some("user"), parts: vec![Part { text: req.prompt.clone() }] }],
            generation_config: GenerationConfig {
                temperature: req.params.temperature,
                max_output_tokens: req.params.max_output_tokens,
                top_p: req.params.top_p,
                top_k: req.params.top_k,
            },
        }
    }
}
