use crate::embeddings::{EmbedOptions, Embedder, Embedding};
use crate::generation::{GenerationOutput, GenerationParams, Generator};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_HOST: &str = "http://localhost:11434";
const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";
const DEFAULT_GENERATE_MODEL: &str = "gemma3:1b";

/// Configuration for a local Ollama runtime
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub embed_model: String,
    pub generate_model: String,
}

impl OllamaConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> Self {
        let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let embed_model =
            env::var("OLLAMA_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());
        let generate_model = env::var("OLLAMA_GENERATE_MODEL")
            .unwrap_or_else(|_| DEFAULT_GENERATE_MODEL.to_string());

        OllamaConfig {
            host: normalize_host(&host),
            embed_model,
            generate_model,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }
}

/// `OLLAMA_HOST` is often given as a bare `host:port`
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// Client for the Ollama HTTP API, serving both models
#[derive(Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: OllamaConfig) -> Self {
        let client = reqwest::Client::new();
        OllamaClient { config, client }
    }

    async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = self.config.url(path);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("API request failed: {} {}", status, error_text));
        }

        Ok(response.json().await?)
    }

    /// Check that `model` has been pulled into the runtime
    async fn ensure_model(&self, model: &str) -> Result<()> {
        let url = self.config.url("/api/tags");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("API request failed: {}", response.status()));
        }

        let tags: TagsResponse = response.json().await?;
        if tags.models.iter().any(|m| model_matches(&m.name, model)) {
            info!("Model {} is loaded", model);
            Ok(())
        } else {
            Err(anyhow!(
                "Model {} is not available at {}",
                model,
                self.config.host
            ))
        }
    }
}

/// Compare model names, treating a missing tag as `:latest`
fn model_matches(available: &str, wanted: &str) -> bool {
    fn with_tag(name: &str) -> String {
        if name.contains(':') {
            name.to_string()
        } else {
            format!("{}:latest", name)
        }
    }
    with_tag(available) == with_tag(wanted)
}

impl Embedder for OllamaClient {
    async fn embed(&self, text: &str, options: &EmbedOptions) -> Result<Embedding> {
        // Pooling is fixed by the model file; Ollama has no request option for it.
        debug!("Embedding {} chars with {:?}", text.len(), options);

        let request = EmbedRequest {
            model: &self.config.embed_model,
            input: text,
        };
        let response: EmbedResponse = self.post("/api/embed", &request).await?;

        let values = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No embedding returned"))?;

        let embedding = Embedding::new(values);
        Ok(if options.normalize {
            embedding.normalized()
        } else {
            embedding
        })
    }

    async fn ready(&self) -> Result<()> {
        self.ensure_model(&self.config.embed_model).await
    }
}

impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<GenerationOutput> {
        let request = GenerateRequest {
            model: &self.config.generate_model,
            prompt,
            raw: true,
            stream: false,
            options: GenerateOptions::from(params),
        };
        let response: GenerateResponse = self.post("/api/generate", &request).await?;

        let generated_text = if params.return_full_text {
            format!("{}{}", prompt, response.response)
        } else {
            response.response
        };

        Ok(GenerationOutput { generated_text })
    }

    async fn ready(&self) -> Result<()> {
        self.ensure_model(&self.config.generate_model).await
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize, Debug, PartialEq)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
    repeat_penalty: f32,
    repeat_last_n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

impl From<&GenerationParams> for GenerateOptions {
    fn from(params: &GenerationParams) -> Self {
        GenerateOptions {
            num_predict: params.max_new_tokens,
            temperature: params.temperature,
            repeat_penalty: params.repetition_penalty,
            repeat_last_n: params.repetition_range,
            // Greedy decoding: only the most likely token survives
            top_k: if params.do_sample { None } else { Some(1) },
        }
    }
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize, Debug)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize, Debug)]
struct ModelTag {
    name: String,
}
