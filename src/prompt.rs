use crate::index::ScoredChunk;

/// Join retrieved chunks into the context block, best match first
pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Wrap context and question in Gemma's chat turn markers.
///
/// The prompt is sent raw, so the turn markers are written out here instead of
/// going through a chat template.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "<start_of_turn>user\n\
         Use the following context to answer the question.\n\
         Context: {}\n\n\
         Question: {}<end_of_turn>\n\
         <start_of_turn>model\n",
        context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunk;

    fn scored(text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: TextChunk {
                text: text.to_string(),
                position: 0,
            },
            score,
        }
    }

    #[test]
    fn test_context_is_newline_joined() {
        let chunks = vec![scored("first", 0.9), scored("second", 0.5)];
        assert_eq!(build_context(&chunks), "first\nsecond");
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("Paris is in France.", "Where is Paris?");
        assert_eq!(
            prompt,
            "<start_of_turn>user\nUse the following context to answer the question.\n\
             Context: Paris is in France.\n\nQuestion: Where is Paris?<end_of_turn>\n\
             <start_of_turn>model\n"
        );
    }

    #[test]
    fn test_prompt_with_empty_context() {
        let prompt = build_prompt("", "Anything?");
        assert!(prompt.contains("Context: \n\nQuestion: Anything?"));
    }
}
