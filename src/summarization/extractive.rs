use async_trait::async_trait;

use super::{SummarizationClient, SummarizationClientError, SummarizationRequest};

/// Deterministic summarizer that keeps leading sentences within the word budget.
///
/// Used when no model is configured and as the stand-in adapter in tests. The minimum bound is
/// not enforced; a short chunk yields a short summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizationClient;

#[async_trait]
impl SummarizationClient for ExtractiveSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        Ok(build_extractive_summary(&request.text, request.max_words))
    }
}

fn build_extractive_summary(text: &str, max_words: usize) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut used_words = 0usize;

    for sentence in sentences(text) {
        let words = sentence.split_whitespace().count();
        if words == 0 {
            continue;
        }
        if used_words + words > max_words {
            if kept.is_empty() {
                return truncate_words(sentence, max_words);
            }
            break;
        }
        used_words += words;
        kept.push(sentence);
    }

    kept.join(" ")
}

/// Split text after sentence-ending punctuation, keeping the punctuation.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
}

fn truncate_words(sentence: &str, max_words: usize) -> String {
    sentence
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
