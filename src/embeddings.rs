use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Representation of a vector embedding
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Embedding { values }
    }

    /// Number of dimensions in the vector
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    /// Scale the vector to unit length. A zero vector is returned unchanged.
    pub fn normalized(self) -> Self {
        let norm = self.values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return self;
        }
        Embedding {
            values: self.values.into_iter().map(|v| v / norm).collect(),
        }
    }
}

/// How token vectors are pooled into a single text vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    Mean,
}

/// Options passed with every embedding call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedOptions {
    pub pooling: Pooling,
    pub normalize: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        EmbedOptions {
            pooling: Pooling::Mean,
            normalize: true,
        }
    }
}

/// An external model that turns text into a vector
#[allow(async_fn_in_trait)]
pub trait Embedder {
    /// Embed a single text
    async fn embed(&self, text: &str, options: &EmbedOptions) -> Result<Embedding>;

    /// Resolve once the model is loaded and can serve requests
    async fn ready(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_has_unit_length() {
        let embedding = Embedding::new(vec![3.0, 4.0]).normalized();
        assert_eq!(embedding.values, vec![0.6, 0.8]);
        let norm: f32 = embedding.values.iter().map(|v| v * v).sum();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_stays_zero() {
        let embedding = Embedding::new(vec![0.0, 0.0, 0.0]).normalized();
        assert_eq!(embedding.values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_options_serialize_lowercase_pooling() {
        let json = serde_json::to_value(EmbedOptions::default()).unwrap();
        assert_eq!(json, serde_json::json!({"pooling": "mean", "normalize": true}));
    }
}
