use std::sync::Arc;

use polyscribe::application::services::{extractive_summary, SummaryService};
use polyscribe::infrastructure::llm::MockLlmClient;

const MAX_INPUT_CHARS: usize = 12_000;

const TRANSCRIPT: &str = "The board reviewed the migration plan for the data platform. \
Engineering flagged a dependency on the legacy billing exporter. \
Marketing asked for a two week delay to finish the campaign assets. \
The chief financial officer approved the revised infrastructure budget. \
Everyone agreed to reconvene after the holiday break.";

fn service(llm: Arc<MockLlmClient>) -> SummaryService {
    SummaryService::new(llm, MAX_INPUT_CHARS)
}

#[tokio::test]
async fn given_distinct_model_output_when_summarizing_then_first_answer_is_kept() {
    let llm = Arc::new(MockLlmClient::new());
    llm.push_response(
        "- Leadership signed off on updated platform spending.\n\
         - A legacy export pipeline blocks part of the rollout.",
    );

    let summary = service(Arc::clone(&llm)).summarize(TRANSCRIPT, "en").await;

    assert!(summary.contains("Leadership signed off"));
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn given_verbatim_model_output_when_summarizing_then_one_strengthened_retry_happens() {
    let llm = Arc::new(MockLlmClient::new());
    // First answer copies the source wholesale; the retry paraphrases.
    llm.push_response(
        "- The board reviewed the migration plan for the data platform.\n\
         - Engineering flagged a dependency on the legacy billing exporter.",
    );
    llm.push_response(
        "- Leadership advanced a platform overhaul despite an export blocker.\n\
         - Teams negotiated timing around a marketing campaign.",
    );

    let summary = service(Arc::clone(&llm)).summarize(TRANSCRIPT, "en").await;

    assert_eq!(llm.call_count(), 2);
    assert!(summary.contains("platform overhaul"));
}

#[tokio::test]
async fn given_two_verbatim_answers_when_summarizing_then_extractive_fallback_is_used() {
    let llm = Arc::new(MockLlmClient::new());
    let copy = "- The board reviewed the migration plan for the data platform.\n\
                - Engineering flagged a dependency on the legacy billing exporter.";
    llm.push_response(copy);
    llm.push_response(copy);

    let summary = service(Arc::clone(&llm)).summarize(TRANSCRIPT, "en").await;

    assert_eq!(llm.call_count(), 2);
    // Fallback is extractive bullets from the source itself; it is
    // exempt from the similarity gate and never empty for real input.
    assert!(!summary.is_empty());
    assert!(summary.lines().all(|line| line.starts_with("- ")));
}

#[tokio::test]
async fn given_model_failures_when_summarizing_then_fallback_never_errors() {
    let llm = Arc::new(MockLlmClient::new());
    llm.push_failure("upstream 500");
    llm.push_failure("upstream 500 again");

    let summary = service(llm).summarize(TRANSCRIPT, "en").await;

    assert!(!summary.is_empty());
}

#[tokio::test]
async fn given_empty_transcript_when_summarizing_then_no_model_call_is_made() {
    let llm = Arc::new(MockLlmClient::new());

    let summary = service(Arc::clone(&llm)).summarize("", "en").await;

    assert!(summary.is_empty());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn given_repeated_asr_lines_when_summarizing_then_model_sees_deduped_text() {
    let llm = Arc::new(MockLlmClient::new());
    llm.push_response("- Only one topic came up at all.");

    let noisy = "Thanks for watching.\nthanks for watching\nThanks for watching!\n\
                 The release ships on Friday.";
    let summary = service(llm).summarize(noisy, "en").await;

    assert!(summary.contains("Only one topic"));
}

#[test]
fn extractive_fallback_caps_sentence_count() {
    let text = "Shipping costs rose sharply this shipping quarter. \
                Shipping delays affected every shipping region badly. \
                The shipping team hired two new shipping planners. \
                A new shipping contract was signed this shipping week. \
                Shipping volume is expected to double by shipping season. \
                Lunch was served at noon.";
    let summary = extractive_summary(text, 3);
    assert_eq!(summary.lines().count(), 3);
}
