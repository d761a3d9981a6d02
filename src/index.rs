use crate::chunking::TextChunk;
use crate::embeddings::{EmbedOptions, Embedder, Embedding};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use ndarray::{Array2, ArrayView1};

/// A chunk returned by a similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    /// Dot product between the query and the chunk vector
    pub score: f32,
}

/// In-memory vector index over the chunks of one document.
///
/// Row `i` of the matrix is the embedding of `chunks[i]`.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    chunks: Vec<TextChunk>,
    vectors: Array2<f32>,
}

impl VectorIndex {
    /// Embed every chunk, one call at a time, and stack the vectors.
    ///
    /// Fails as a whole if any embedding call fails or the embedder returns
    /// vectors of inconsistent dimension.
    pub async fn build<E: Embedder>(
        chunks: Vec<TextChunk>,
        embedder: &E,
        options: &EmbedOptions,
    ) -> Result<Self> {
        if chunks.is_empty() {
            bail!("Cannot build an index without chunks");
        }

        let mut dimensions = 0;
        let mut flat = Vec::new();

        // One embedding call per chunk, in document order
        for chunk in &chunks {
            let embedding = embedder
                .embed(&chunk.text, options)
                .await
                .with_context(|| format!("Failed to embed chunk {}", chunk.position))?;

            if embedding.values.is_empty() {
                bail!("Embedder returned an empty vector for chunk {}", chunk.position);
            }
            // The first vector fixes the dimension of the whole index
            if dimensions == 0 {
                dimensions = embedding.dimensions();
            } else if embedding.dimensions() != dimensions {
                bail!(
                    "Embedding dimension mismatch for chunk {}: expected {}, got {}",
                    chunk.position,
                    dimensions,
                    embedding.dimensions()
                );
            }

            debug!("Embedded chunk {} ({} dims)", chunk.position, dimensions);
            flat.extend(embedding.values);
        }

        // Stack the vectors row by row, aligned with `chunks`
        let vectors = Array2::from_shape_vec((chunks.len(), dimensions), flat)?;
        info!("Indexed {} chunks.", chunks.len());

        Ok(VectorIndex { chunks, vectors })
    }

    #[cfg(test)]
    fn from_parts(chunks: Vec<TextChunk>, embeddings: Vec<Embedding>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            bail!(
                "Got {} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            );
        }
        let dimensions = embeddings.first().map(Embedding::dimensions).unwrap_or(0);
        if embeddings.iter().any(|e| e.dimensions() != dimensions) {
            bail!("Embeddings have inconsistent dimensions");
        }

        let flat = embeddings.into_iter().flat_map(|e| e.values).collect();
        let vectors = Array2::from_shape_vec((chunks.len(), dimensions), flat)?;

        Ok(VectorIndex { chunks, vectors })
    }

    pub(crate) fn len(&self) -> usize {
        self.chunks.len()
    }

    pub(crate) fn dimensions(&self) -> usize {
        self.vectors.ncols()
    }

    /// Rank all chunks by dot product with `query` and return the best `k`,
    /// highest score first. Equal scores keep document order and NaN scores
    /// rank below every real score.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<ScoredChunk>> {
        if query.dimensions() != self.dimensions() {
            bail!(
                "Query has {} dimensions but the index has {}",
                query.dimensions(),
                self.dimensions()
            );
        }

        // Vectors are normalized, so the dot product is the cosine similarity
        let scores = self.vectors.dot(&ArrayView1::from(&query.values[..]));
        let rank_key = |i: usize| {
            if scores[i].is_nan() {
                f32::NEG_INFINITY
            } else {
                scores[i]
            }
        };

        // Stable sort, best first
        let mut ranked: Vec<usize> = (0..self.chunks.len()).collect();
        ranked.sort_by(|&a, &b| rank_key(b).total_cmp(&rank_key(a)));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|i| ScoredChunk {
                chunk: self.chunks[i].clone(),
                score: scores[i],
            })
            .collect())
    }
}
