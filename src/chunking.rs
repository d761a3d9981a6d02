/// Default maximum chunk length, in characters
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 400;

/// A text chunk, identified by its position in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The actual text content of this chunk
    pub text: String,
    /// Zero-based position of this chunk in the chunk sequence
    pub position: usize,
}

/// Split text into paragraphs and slice long paragraphs into fixed-size pieces.
///
/// Paragraphs are separated by blank lines (`"\n\n"`). Whitespace-only
/// paragraphs are dropped; the rest are kept verbatim. A paragraph longer than
/// `max_chars` characters is cut into consecutive `max_chars` slices with no
/// overlap.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<TextChunk> {
    let max_chars = max_chars.max(1);

    let mut pieces: Vec<&str> = Vec::new();
    for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
        if paragraph.chars().count() > max_chars {
            pieces.extend(slice_by_chars(paragraph, max_chars));
        } else {
            pieces.push(paragraph);
        }
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(position, text)| TextChunk {
            text: text.to_string(),
            position,
        })
        .collect()
}

/// Cut `text` into consecutive slices of at most `max_chars` characters
fn slice_by_chars(text: &str, max_chars: usize) -> Vec<&str> {
    let mut slices = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            slices.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        slices.push(&text[start..]);
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[TextChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_long_paragraph_is_sliced() {
        let text = format!("{}\n\nshort", "A".repeat(500));
        let chunks = split_into_chunks(&text, DEFAULT_MAX_CHUNK_CHARS);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "A".repeat(400));
        assert_eq!(chunks[1].text, "A".repeat(100));
        assert_eq!(chunks[2].text, "short");
        let positions: Vec<usize> = chunks.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_blank_paragraphs_are_dropped() {
        let text = "first\n\n   \n\n\n\nsecond\n\n";
        let chunks = split_into_chunks(text, 100);
        assert_eq!(texts(&chunks), vec!["first", "second"]);
    }

    #[test]
    fn test_paragraphs_are_not_trimmed() {
        let chunks = split_into_chunks("  indented\nline\n\ntail ", 100);
        assert_eq!(texts(&chunks), vec!["  indented\nline", "tail "]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_into_chunks("", 400).is_empty());
        assert!(split_into_chunks("\n\n\n\n", 400).is_empty());
    }

    #[test]
    fn test_chunks_respect_max_and_reassemble() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n\n\
                    Sed do eiusmod tempor incididunt ut labore.\n\n \n\n\
                    Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris.";
        for max in [1, 7, 16, 50, 400] {
            let chunks = split_into_chunks(text, max);
            assert!(chunks.iter().all(|c| c.text.chars().count() <= max));

            let cleaned: String = text
                .split("\n\n")
                .filter(|p| !p.trim().is_empty())
                .collect();
            let reassembled: String = chunks.iter().map(|c| c.text.as_str()).collect();
            assert_eq!(reassembled, cleaned);
        }
    }

    #[test]
    fn test_multibyte_text_is_sliced_on_char_boundaries() {
        let text = "héllo wörld ünïcode";
        let chunks = split_into_chunks(text, 5);
        assert_eq!(texts(&chunks), vec!["héllo", " wörl", "d üni", "code"]);
    }

    #[test]
    fn test_zero_max_is_treated_as_one() {
        let chunks = split_into_chunks("abc", 0);
        assert_eq!(texts(&chunks), vec!["a", "b", "c"]);
    }
}
