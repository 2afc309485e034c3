use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,;:.!?)])").unwrap());
static MISSING_SPACE_AFTER_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([,;:.!?])([^\s\d.])").unwrap());
static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([•\-–—*·]|\d+\.)\s+").unwrap());

/// Light normalization for transcripts before persisting: NFKC, smart
/// quotes and dash variants unified, whitespace compacted, lines that
/// were broken mid-sentence rejoined. Content is never added or
/// removed.
pub fn clean_transcript(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let normalized: String = raw.nfkc().collect();
    let s = normalize_quotes_and_dashes(&normalized);
    let s = compact_whitespace(&s);
    let s = join_soft_linebreaks(&s);
    let s = tidy_punctuation(&s);
    compact_whitespace(&s)
}

/// Normalization for summaries: same character cleanup, plus bullet
/// markers unified to `- `.
pub fn clean_summary(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let normalized: String = raw.nfkc().collect();
    let s = normalize_quotes_and_dashes(&normalized);
    let s = compact_whitespace(&s);
    let s = normalize_bullets(&s);
    let s = tidy_punctuation(&s);
    compact_whitespace(&s)
}

/// Unify heterogeneous bullet markers (`•`, `*`, numbered) to `- ` and
/// drop empty bullet lines. Does not invent bullets.
pub fn normalize_bullets(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        if let Some(m) = BULLET_PREFIX.find(line) {
            let rest = line[m.end()..].trim();
            if !rest.is_empty() {
                out.push(format!("- {}", rest));
            }
        } else {
            let trimmed = line.trim();
            let marker_only = !trimmed.is_empty()
                && trimmed
                    .chars()
                    .all(|c| matches!(c, '-' | '*' | '•' | '–' | '—' | '·'));
            if !trimmed.is_empty() && !marker_only {
                out.push(line.trim_end().to_string());
            }
        }
    }
    out.join("\n")
}

/// Split on sentence-terminating punctuation followed by whitespace.
/// Hand-rolled because the regex crate has no lookbehind.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            // Consume trailing closers so ") or quotes stay attached.
            while let Some(&next) = chars.peek() {
                if matches!(next, '"' | '\'' | ')' | ']') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if chars.peek().map(|n| n.is_whitespace()).unwrap_or(true) {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

fn normalize_quotes_and_dashes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2039}' | '\u{203A}' => '\'',
            '\u{2013}' | '\u{2014}' | '\u{2212}' | '\u{2011}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect()
}

fn compact_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut blank_run = 0usize;
    for line in s.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let mut compacted = String::with_capacity(line.len());
        let mut prev_space = false;
        for c in line.trim().chars() {
            if c.is_whitespace() {
                if !prev_space {
                    compacted.push(' ');
                    prev_space = true;
                }
            } else {
                compacted.push(c);
                prev_space = false;
            }
        }
        if compacted.is_empty() {
            blank_run += 1;
            // Runs of blank lines collapse to one paragraph break.
            if blank_run == 1 && !out.is_empty() {
                out.push('\n');
            }
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&compacted);
            blank_run = 0;
        }
    }
    out.trim().to_string()
}

/// Rejoin lines that were broken mid-sentence: line A does not end a
/// sentence and line B starts lowercase.
fn join_soft_linebreaks(s: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in s.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push(String::new());
            continue;
        }
        let continues = out
            .last()
            .map(|prev| {
                !prev.is_empty()
                    && !prev.ends_with(['.', '!', '?', ':', '…'])
                    && trimmed.chars().next().map(|c| c.is_lowercase()).unwrap_or(false)
            })
            .unwrap_or(false);
        if continues {
            let prev = out.last_mut().unwrap();
            prev.push(' ');
            prev.push_str(trimmed);
        } else {
            out.push(trimmed.to_string());
        }
    }
    out.join("\n")
}

fn tidy_punctuation(s: &str) -> String {
    let s = SPACE_BEFORE_PUNCT.replace_all(s, "$1");
    MISSING_SPACE_AFTER_PUNCT
        .replace_all(&s, "$1 $2")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_quotes_and_dashes_are_unified() {
        let cleaned = clean_transcript("\u{201C}hola\u{201D} \u{2014} dijo");
        assert_eq!(cleaned, "\"hola\" - dijo");
    }

    #[test]
    fn soft_linebreaks_are_rejoined() {
        let cleaned = clean_transcript("The meeting started\nlate because of traffic.");
        assert_eq!(cleaned, "The meeting started late because of traffic.");
    }

    #[test]
    fn sentence_boundaries_are_preserved_across_lines() {
        let cleaned = clean_transcript("First point.\nSecond point.");
        assert_eq!(cleaned, "First point.\nSecond point.");
    }

    #[test]
    fn punctuation_spacing_is_tidied() {
        let cleaned = clean_transcript("Well , yes .Indeed");
        assert_eq!(cleaned, "Well, yes. Indeed");
    }

    #[test]
    fn heterogeneous_bullets_normalize_to_dashes() {
        let cleaned = clean_summary("• first\n* second\n1. third\n-   ");
        assert_eq!(cleaned, "- first\n- second\n- third");
    }

    #[test]
    fn splits_sentences_on_terminators() {
        let sentences = split_sentences("One. Two! Three? Four");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "Four"]);
    }

    #[test]
    fn abbreviation_like_runs_do_not_split_mid_token() {
        let sentences = split_sentences("Version 2.5 shipped. Done.");
        assert_eq!(sentences, vec!["Version 2.5 shipped.", "Done."]);
    }
}
