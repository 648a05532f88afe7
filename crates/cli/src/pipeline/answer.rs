//! Grounded answer generation.
//!
//! Builds the reference-document prompt and calls the text generator once.
//! Generation never fails outward: provider errors come back as a
//! human-readable answer carrying the error detail.

use hueguide_client::{DecodingParams, GenerationRequest, TextGenerator};
use hueguide_core::Error;
use std::sync::Arc;

/// Standing persona for the guide.
pub const SYSTEM_INSTRUCTION: &str = "You are a knowledgeable local guide to the culture of Huế, Vietnam. \
You know its history, the Nguyễn dynasty, the Imperial City, royal tombs, pagodas, festivals, \
Nhã nhạc court music, cuisine, crafts and traditional dress. \
Answer in the language of the question, clearly and in a friendly tone. \
Keep answers concise and base them on the reference documents you are given. \
Leave out shopping and other commercial content unless the visitor asks for it. \
If the documents do not contain the answer, say so plainly instead of guessing.";

/// Prompt builder plus a generator handle.
#[derive(Clone)]
pub struct AnswerGenerator {
    generator: Arc<dyn TextGenerator>,
    system_instruction: String,
    params: DecodingParams,
}

impl AnswerGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator, system_instruction: SYSTEM_INSTRUCTION.to_string(), params: DecodingParams::default() }
    }

    /// Answer `question` from `context`, optionally informed by `history`.
    pub async fn generate(&self, question: &str, context: &str, history: &str) -> String {
        let request = GenerationRequest {
            system_instruction: self.system_instruction.clone(),
            prompt: build_prompt(question, context, history),
            params: self.params,
        };

        match self.generator.generate(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(provider = self.generator.name(), error = %e, "generation failed");
                failure_answer(&e)
            }
        }
    }
}

/// Assemble the user prompt.
///
/// Newlines in `context` and `history` are flattened to spaces; the history
/// block is omitted entirely when `history` is blank.
pub fn build_prompt(question: &str, context: &str, history: &str) -> String {
    let context = flatten(context);
    let history = flatten(history);

    let mut prompt = String::from(
        "Below are reference documents collected from reputable websites.\n\
         Read them carefully and answer the question using only information from these documents.\n",
    );

    if !history.is_empty() {
        prompt.push_str("\nPrevious conversation: ");
        prompt.push_str(&history);
        prompt.push('\n');
    }

    prompt.push_str("\n---\nREFERENCE DOCUMENTS:\n");
    prompt.push_str(&context);
    prompt.push_str("\n---\n\nQUESTION: ");
    prompt.push_str(question.trim());
    prompt.push_str("\n\nANSWER:");
    prompt
}

fn flatten(text: &str) -> String {
    text.split(['\n', '\r']).map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}

fn failure_answer(err: &Error) -> String {
    match err {
        Error::ContentBlocked(reason) => format!("The AI model declined to answer this question ({reason})."),
        other => format!("Error calling the AI model: {other}"),
    }
}
