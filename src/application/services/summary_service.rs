use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::application::ports::LlmClient;

use super::text_cleanup::{normalize_bullets, split_sentences};

static WORD_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}']+").unwrap());
static NON_WORD_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Fraction of candidate sentences that may appear verbatim in the
/// source before the summary is rejected as a copy.
const SIMILARITY_THRESHOLD: f64 = 0.6;
/// Sentences shorter than this (normalized) are ignored by the
/// similarity check; they match trivially.
const MIN_SENTENCE_CHARS: usize = 20;
const FALLBACK_SENTENCES: usize = 5;

/// Produces an abstractive summary via the language model, verifies it
/// is not a thinly-disguised copy of the transcript, and degrades to a
/// deterministic extractive summary instead of ever failing. The
/// transcript is the product; the summary is best-effort.
pub struct SummaryService {
    llm: Arc<dyn LlmClient>,
    max_input_chars: usize,
}

impl SummaryService {
    pub fn new(llm: Arc<dyn LlmClient>, max_input_chars: usize) -> Self {
        Self {
            llm,
            max_input_chars,
        }
    }

    /// Never errors. Empty input yields an empty summary.
    pub async fn summarize(&self, transcript: &str, language: &str) -> String {
        let cleaned = dedupe_lines(transcript);
        if cleaned.is_empty() {
            return String::new();
        }

        let input = truncate_chars(&cleaned, self.max_input_chars);

        for strengthened in [false, true] {
            let system = system_prompt(language, strengthened);
            match self.llm.complete(&system, input).await {
                Ok(candidate) => {
                    let candidate = candidate.trim();
                    if candidate.is_empty() {
                        tracing::warn!(retry = strengthened, "Summarizer returned empty output");
                        continue;
                    }
                    if too_similar(candidate, &cleaned) {
                        tracing::warn!(
                            retry = strengthened,
                            "Summary rejected: too close to the source text"
                        );
                        continue;
                    }
                    return normalize_bullets(candidate);
                }
                Err(e) => {
                    tracing::warn!(retry = strengthened, error = %e, "Summarizer call failed");
                }
            }
        }

        tracing::info!("Falling back to extractive summary");
        extractive_summary(&cleaned, FALLBACK_SENTENCES)
    }
}

fn system_prompt(language: &str, strengthened: bool) -> String {
    let mut prompt = format!(
        "You summarize transcripts in '{}'. Return 3-6 abstractive bullet points. \
         Be abstract: never copy a verbatim run of more than 6 words from the source.",
        language
    );
    if strengthened {
        prompt.push_str(
            " Do not repeat phrases from the source at all; synthesize the themes in your own words.",
        );
    }
    prompt
}

/// Drop near-identical lines before summarizing; ASR output often
/// repeats itself on silence or music.
pub fn dedupe_lines(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let key = NON_WORD_RX
            .replace_all(&line.to_lowercase(), " ")
            .trim()
            .to_string();
        if seen.insert(key) {
            out.push(line);
        }
    }
    out.join("\n")
}

/// A candidate is too similar when ≥ 60% of its substantive sentences
/// appear verbatim (after case/whitespace/punctuation normalization)
/// inside the source.
pub fn too_similar(candidate: &str, source: &str) -> bool {
    let normalized_source = normalize_for_match(source);
    let mut checked = 0usize;
    let mut matched = 0usize;

    for sentence in split_sentences(&strip_bullet_markers(candidate)) {
        let normalized = normalize_for_match(&sentence);
        if normalized.len() < MIN_SENTENCE_CHARS {
            continue;
        }
        checked += 1;
        if normalized_source.contains(&normalized) {
            matched += 1;
        }
    }

    checked > 0 && (matched as f64 / checked as f64) >= SIMILARITY_THRESHOLD
}

/// Deterministic fallback: score each sentence by the corpus frequency
/// of its tokens over the square root of its length (a cheap TF
/// centrality heuristic), keep the top scorers, and restore original
/// order for readability.
pub fn extractive_summary(text: &str, max_sentences: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return String::new();
    }

    let mut freq: HashMap<String, u32> = HashMap::new();
    for word in WORD_RX.find_iter(text) {
        let token = word.as_str().to_lowercase();
        if token.chars().count() <= 2 {
            continue;
        }
        *freq.entry(token).or_insert(0) += 1;
    }

    let score = |sentence: &str| -> f64 {
        let tokens: Vec<String> = WORD_RX
            .find_iter(sentence)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        if tokens.is_empty() {
            return 0.0;
        }
        let total: u32 = tokens.iter().map(|t| freq.get(t).copied().unwrap_or(0)).sum();
        f64::from(total) / (tokens.len() as f64).sqrt()
    };

    let mut ranked: Vec<(f64, usize, &String)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (score(s), i, s))
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(max_sentences);
    ranked.sort_by_key(|(_, i, _)| *i);

    ranked
        .into_iter()
        .map(|(_, _, s)| format!("- {}", s.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_bullet_markers(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.trim_start_matches(|c: char| {
                c.is_whitespace() || matches!(c, '-' | '*' | '•' | '–' | '—')
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_for_match(text: &str) -> String {
    NON_WORD_RX
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_collapses_case_and_punctuation_variants() {
        let input = "Hello world.\nhello, world\nSomething else.";
        assert_eq!(dedupe_lines(input), "Hello world.\nSomething else.");
    }

    #[test]
    fn verbatim_copy_is_flagged_too_similar() {
        let source = "The quarterly revenue grew by twelve percent over last year. \
                      The team shipped the new onboarding flow in March. \
                      Customer churn remained flat across all regions.";
        let copy = "- The quarterly revenue grew by twelve percent over last year.\n\
                    - The team shipped the new onboarding flow in March.";
        assert!(too_similar(copy, source));
    }

    #[test]
    fn paraphrase_passes_the_similarity_gate() {
        let source = "The quarterly revenue grew by twelve percent over last year. \
                      The team shipped the new onboarding flow in March.";
        let paraphrase = "- Revenue saw double-digit annual growth this quarter.\n\
                          - A redesigned signup experience launched in early spring.";
        assert!(!too_similar(paraphrase, source));
    }

    #[test]
    fn extractive_summary_keeps_original_sentence_order() {
        let text = "Budget planning dominated the discussion about budget limits. \
                    An intern mentioned lunch. \
                    The budget committee approved the revised budget proposal. \
                    Weather was nice. \
                    Final budget numbers will be published next week.";
        let summary = extractive_summary(text, 3);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Budget planning"));
        assert!(lines[2].contains("published next week"));
    }

    #[test]
    fn extractive_summary_of_empty_text_is_empty() {
        assert_eq!(extractive_summary("", 5), "");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "día y noche";
        assert_eq!(truncate_chars(text, 3), "día");
        assert_eq!(truncate_chars(text, 100), text);
    }
}
