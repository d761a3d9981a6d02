use crate::chunking::{split_into_chunks, TextChunk, DEFAULT_MAX_CHUNK_CHARS};
use crate::embeddings::{EmbedOptions, Embedder};
use crate::generation::{GenerationParams, Generator};
use crate::index::{ScoredChunk, VectorIndex};
use crate::prompt::{build_context, build_prompt};
use anyhow::Result;
use log::{debug, info};
use std::io::{BufRead, Write};

/// Number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 2;

/// Tunables for the RAG pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct RagSettings {
    pub max_chunk_chars: usize,
    pub top_k: usize,
    pub generation: GenerationParams,
}

impl Default for RagSettings {
    fn default() -> Self {
        RagSettings {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            top_k: DEFAULT_TOP_K,
            generation: GenerationParams::default(),
        }
    }
}

/// RAG (Retrieval-Augmented Generation) engine over a single document
pub struct RagEngine<E, G> {
    embedder: E,
    generator: G,
    settings: RagSettings,
    embed_options: EmbedOptions,
    chunks: Vec<TextChunk>,
    /// Only present when built from the current `chunks`
    index: Option<VectorIndex>,
}

impl<E: Embedder, G: Generator> RagEngine<E, G> {
    /// Wait for both models to report ready and create the engine
    pub async fn initialize(embedder: E, generator: G, settings: RagSettings) -> Result<Self> {
        embedder.ready().await?;
        generator.ready().await?;
        info!("Models ready");

        Ok(RagEngine {
            embedder,
            generator,
            settings,
            embed_options: EmbedOptions::default(),
            chunks: Vec::new(),
            index: None,
        })
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Chunk a new document, replacing the previous one and its index.
    /// Returns the number of chunks.
    pub fn load_text(&mut self, text: &str) -> usize {
        // The old index belongs to the old chunks
        self.index = None;
        self.chunks = split_into_chunks(text, self.settings.max_chunk_chars);
        info!("Split into {} chunks", self.chunks.len());
        self.chunks.len()
    }

    /// Embed the loaded chunks. On failure the engine is left without an index.
    pub async fn index_documents(&mut self) -> Result<usize> {
        // Never keep an index that may not match the chunks
        self.index = None;
        if self.chunks.is_empty() {
            info!("Nothing to index");
            return Ok(0);
        }

        info!("Embedding {} chunks...", self.chunks.len());
        let index =
            VectorIndex::build(self.chunks.clone(), &self.embedder, &self.embed_options).await?;
        let count = index.len();
        self.index = Some(index);

        Ok(count)
    }

    /// Find the chunks most similar to `query`. Empty when nothing is indexed.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        // No index means no context
        let Some(index) = &self.index else {
            return Ok(Vec::new());
        };

        // Get embedding for the question
        let query_embedding = self.embedder.embed(query, &self.embed_options).await?;
        index.search(&query_embedding, self.settings.top_k)
    }

    /// Answer a question using the retrieved context
    pub async fn generate_response(&self, query: &str) -> Result<String> {
        // Retrieve relevant chunks
        let found = self.retrieve(query).await?;
        let context = build_context(&found);
        debug!("Context: {}", context);
        debug!("User query: {}", query);

        // Generate answer from the raw prompt
        let prompt = build_prompt(&context, query);
        let output = self
            .generator
            .generate(&prompt, &self.settings.generation)
            .await?;

        // Drop the echoed prompt
        Ok(output.answer(&prompt).to_string())
    }

    /// Answer questions read line by line until `exit` or end of input
    pub async fn run_query_loop<R: BufRead, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<()> {
        let mut lines = input.lines();

        loop {
            write!(output, "\nYour question: ")?;
            output.flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let question = line.trim();

            if question.is_empty() {
                continue;
            }
            if question.eq_ignore_ascii_case("exit") {
                info!("Goodbye!");
                break;
            }

            // Failures are shown to the user, the loop keeps going
            match self.generate_response(question).await {
                Ok(answer) => writeln!(output, "\n{}", answer)?,
                Err(e) => writeln!(output, "\nError: {:#}", e)?,
            }
        }

        Ok(())
    }
}
