pub mod chunking;
pub mod document;
pub mod embeddings;
pub mod generation;
pub mod index;
pub mod ollama;
pub mod prompt;
pub mod rag;
