//! Sentence-greedy chunking of extracted text.
//!
//! Text is split on the sentence delimiter `". "` and sentences are packed into segments while
//! the running word count stays strictly below the budget. Word count stands in for model tokens;
//! it drifts for scripts that do not separate words with whitespace.

use super::types::Segment;

/// Default word budget of a single segment.
pub const DEFAULT_MAX_TOKENS: usize = 900;

/// Sentence delimiter shared by the chunker and the section parser.
pub(crate) const SENTENCE_DELIMITER: &str = ". ";

/// Split `text` into ordered segments of roughly `max_tokens` words.
///
/// A sentence that alone exceeds the budget forms its own oversized segment. The final
/// in-progress segment is always emitted, so empty input yields one empty segment.
pub fn chunk_text(text: &str, max_tokens: usize) -> Vec<Segment> {
    let sentences: Vec<&str> = text.split(SENTENCE_DELIMITER).collect();
    let last = sentences.len() - 1;

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_words = 0usize;

    for (position, sentence) in sentences.into_iter().enumerate() {
        let sentence_words = count_words(sentence);
        if current_words + sentence_words >= max_tokens && !current.trim().is_empty() {
            segments.push(Segment::new(current.trim().to_string()));
            current.clear();
            current_words = 0;
        }

        current.push_str(sentence);
        if position != last {
            current.push_str(SENTENCE_DELIMITER);
        }
        current_words += sentence_words;
    }

    segments.push(Segment::new(current.trim().to_string()));
    segments
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejoin(segments: &[Segment]) -> String {
        segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_text_stays_in_one_segment() {
        let segments = chunk_text("Sentence one. Sentence two. Sentence three.", 1000);
        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0].text,
            "Sentence one. Sentence two. Sentence three."
        );
    }

    #[test]
    fn text_without_delimiter_is_single_segment() {
        let segments = chunk_text("no sentence delimiter here", 2);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "no sentence delimiter here");
    }

    #[test]
    fn empty_input_yields_one_empty_segment() {
        let segments = chunk_text("", DEFAULT_MAX_TOKENS);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_blank());
    }

    #[test]
    fn segments_stay_below_budget() {
        let text = "one two three. four five. six seven eight. nine. ten eleven";
        let segments = chunk_text(text, 6);
        for segment in &segments {
            assert!(segment.word_count < 6, "{segment:?}");
        }
        assert_eq!(
            segments
                .iter()
                .map(|segment| segment.text.as_str())
                .collect::<Vec<_>>(),
            vec![
                "one two three. four five.",
                "six seven eight. nine.",
                "ten eleven"
            ]
        );
    }

    #[test]
    fn oversized_sentence_forms_its_own_segment() {
        let text = "a b c d e f g. short one. another short";
        let segments = chunk_text(text, 4);
        assert_eq!(segments[0].text, "a b c d e f g.");
        assert!(segments[0].word_count >= 4);
        for segment in &segments[1..] {
            assert!(segment.word_count < 4);
        }
        assert!(segments.iter().all(|segment| !segment.is_blank()));
    }

    #[test]
    fn sentences_are_neither_lost_nor_duplicated() {
        let original = "Alpha beta. Gamma delta epsilon. Zeta. Eta theta iota kappa. Lambda mu";
        let segments = chunk_text(original, 4);
        assert_eq!(segments.len(), 5);
        let rejoined = rejoin(&segments);
        assert_eq!(
            rejoined.split(SENTENCE_DELIMITER).collect::<Vec<_>>(),
            original.split(SENTENCE_DELIMITER).collect::<Vec<_>>()
        );
    }
}
