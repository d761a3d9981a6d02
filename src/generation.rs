use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Decoding parameters for a generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    /// Sample from the distribution instead of decoding greedily
    pub do_sample: bool,
    pub repetition_penalty: f32,
    /// How many recent tokens the repetition penalty looks at
    pub repetition_range: u32,
    /// Whether the runtime echoes the prompt in front of the completion
    pub return_full_text: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            max_new_tokens: 150,
            temperature: 0.5,
            do_sample: false,
            repetition_penalty: 1.2,
            repetition_range: 50,
            return_full_text: true,
        }
    }
}

/// Result of a generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub generated_text: String,
}

impl GenerationOutput {
    /// The completion without an echoed prompt
    pub fn answer(&self, prompt: &str) -> &str {
        self.generated_text
            .strip_prefix(prompt)
            .unwrap_or(&self.generated_text)
            .trim()
    }
}

/// An external text generation model
#[allow(async_fn_in_trait)]
pub trait Generator {
    /// Complete a raw prompt
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<GenerationOutput>;

    /// Resolve once the model is loaded and can serve requests
    async fn ready(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_strips_echoed_prompt() {
        let output = GenerationOutput {
            generated_text: "PROMPT\n Paris is the capital. ".to_string(),
        };
        assert_eq!(output.answer("PROMPT\n"), "Paris is the capital.");
    }

    #[test]
    fn test_answer_without_echo() {
        let output = GenerationOutput {
            generated_text: "Just the answer\n".to_string(),
        };
        assert_eq!(output.answer("PROMPT"), "Just the answer");
    }

    #[test]
    fn test_default_params_decode_greedily() {
        let params = GenerationParams::default();
        assert!(!params.do_sample);
        assert_eq!(params.max_new_tokens, 150);
        assert_eq!(params.repetition_range, 50);
        assert!(params.return_full_text);
    }
}
