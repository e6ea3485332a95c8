// Text Processing Service
// Sentence splitting, contraction tables and cleanup shared by the pipeline stages

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Abbreviations whose trailing period never ends a sentence.
const ABBREVIATIONS: &[&str] = &["Mr.", "Mrs.", "Dr.", "vs.", "etc.", "i.e.", "e.g."];

/// Stand-in for an abbreviation period while splitting.
const PROTECTED_DOT: char = '\u{2024}';

/// Expanded phrase and its contracted form. Order matters when reversing:
/// a contracted form shared by several phrases expands to the last one listed.
pub const CONTRACTIONS: &[(&str, &str)] = &[
    ("it is", "it's"),
    ("that is", "that's"),
    ("what is", "what's"),
    ("there is", "there's"),
    ("here is", "here's"),
    ("do not", "don't"),
    ("does not", "doesn't"),
    ("did not", "didn't"),
    ("cannot", "can't"),
    ("could not", "couldn't"),
    ("would not", "wouldn't"),
    ("should not", "shouldn't"),
    ("will not", "won't"),
    ("is not", "isn't"),
    ("are not", "aren't"),
    ("was not", "wasn't"),
    ("were not", "weren't"),
    ("have not", "haven't"),
    ("has not", "hasn't"),
    ("had not", "hadn't"),
    ("they are", "they're"),
    ("we are", "we're"),
    ("you are", "you're"),
    ("I am", "I'm"),
    ("I have", "I've"),
    ("I had", "I'd"),
    ("I would", "I'd"),
    ("I will", "I'll"),
    ("you have", "you've"),
    ("you will", "you'll"),
    ("we have", "we've"),
    ("we will", "we'll"),
    ("they have", "they've"),
    ("they will", "they'll"),
    ("let us", "let's"),
];

fn horizontal_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\x0C\x0B\u{00A0}\u{3000}]+").expect("horizontal space regex"))
}

fn whitespace_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

fn sentence_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("sentence break regex"))
}

fn space_before_punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+([.,!?])").expect("punctuation spacing regex"))
}

fn glued_sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([.,!?])([A-Z])").expect("glued sentence regex"))
}

struct ContractionRule {
    expanded: &'static str,
    contracted: &'static str,
    expanded_re: Regex,
    contracted_re: Regex,
}

fn phrase_re(phrase: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase))).expect("contraction regex")
}

fn contraction_rules() -> &'static [ContractionRule] {
    static RULES: OnceLock<Vec<ContractionRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        CONTRACTIONS
            .iter()
            .map(|(expanded, contracted)| ContractionRule {
                expanded,
                contracted,
                expanded_re: phrase_re(expanded),
                contracted_re: phrase_re(contracted),
            })
            .collect()
    })
}

/// Normalize quotes, dashes, spaces and line endings from pasted document text.
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let s = text
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let s = horizontal_space_re().replace_all(&s, " ");

    s.lines()
        .map(|ln| ln.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Replace every whitespace run with a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_run_re().replace_all(text, " ").trim().to_string()
}

fn protect_abbreviations(text: &str) -> String {
    let mut s = text.to_string();
    for abbr in ABBREVIATIONS {
        if s.contains(abbr) {
            s = s.replace(abbr, &abbr.replace('.', &PROTECTED_DOT.to_string()));
        }
    }
    s
}

fn restore_abbreviations(text: &str) -> String {
    text.replace(PROTECTED_DOT, ".")
}

/// Split on runs of terminal punctuation, dropping the punctuation itself.
/// Common abbreviations ("Dr.", "e.g.") do not end a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![];
    }

    let protected = protect_abbreviations(text);
    sentence_break_re()
        .split(&protected)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(restore_abbreviations)
        .collect()
}

pub fn sentence_word_counts(text: &str) -> Vec<usize> {
    split_sentences(text).iter().map(|s| word_count(s)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceOffset {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

fn ends_with_abbreviation(buffer: &str) -> bool {
    let last_word = buffer.split_whitespace().last().unwrap_or("");
    ABBREVIATIONS.contains(&last_word)
}

/// Sentence splitting that keeps terminal punctuation and tracks byte offsets.
pub fn split_sentences_advanced(text: &str) -> Vec<SentenceOffset> {
    if text.is_empty() {
        return vec![];
    }

    let quote_chars: HashSet<char> = ['"', '\u{201c}', '\u{201d}'].into_iter().collect();
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    let mut sentences = Vec::new();
    let mut current_start: usize = 0;
    let mut in_quote = false;
    let mut i = 0;

    while i < chars.len() {
        let (_, ch) = chars[i];

        if quote_chars.contains(&ch) {
            in_quote = !in_quote;
        }

        if ['.', '!', '?'].contains(&ch) && !in_quote {
            // Decimal numbers
            if ch == '.' && i > 0 && i + 1 < chars.len() && chars[i - 1].1.is_ascii_digit() && chars[i + 1].1.is_ascii_digit() {
                i += 1;
                continue;
            }

            // Consume runs such as "?!" or "..."
            while i + 1 < chars.len() && ['.', '!', '?'].contains(&chars[i + 1].1) {
                i += 1;
            }

            let end = chars.get(i + 1).map(|(idx, _)| *idx).unwrap_or(text.len());
            let slice = &text[current_start..end];

            if ch == '.' && ends_with_abbreviation(slice) {
                i += 1;
                continue;
            }

            // Sentence ends only before whitespace or end of text
            let at_boundary = chars.get(i + 1).map(|(_, c)| c.is_whitespace()).unwrap_or(true);
            if at_boundary {
                let sentence_text = slice.trim();
                if !sentence_text.is_empty() {
                    let lead = slice.len() - slice.trim_start().len();
                    sentences.push(SentenceOffset {
                        text: sentence_text.to_string(),
                        start: current_start + lead,
                        end,
                    });
                }
                current_start = end;
            }
        }

        i += 1;
    }

    let remaining = &text[current_start..];
    if !remaining.trim().is_empty() {
        let lead = remaining.len() - remaining.trim_start().len();
        sentences.push(SentenceOffset {
            text: remaining.trim().to_string(),
            start: current_start + lead,
            end: text.len(),
        });
    }

    sentences
}

/// Difference in words between the longest and shortest period-delimited
/// sentence.
pub fn length_spread(text: &str) -> usize {
    let lengths: Vec<usize> = text
        .split('.')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(word_count)
        .collect();
    match (lengths.iter().max(), lengths.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}

/// Collapse whitespace, tighten spacing around punctuation and make sure the
/// text ends on terminal punctuation.
pub fn polish_text(text: &str) -> String {
    let mut result = whitespace_run_re().replace_all(text, " ").to_string();
    result = space_before_punct_re().replace_all(&result, "$1").to_string();
    result = glued_sentence_re().replace_all(&result, "$1 $2").to_string();

    let mut result = result.trim().to_string();
    if !result.is_empty() && !result.ends_with(['.', '!', '?']) {
        result.push('.');
    }
    result
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// "civic duty" -> "Civic Duty"
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|w| capitalize_first(&w.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn match_leading_case(matched: &str, replacement: &str) -> String {
    if matched.chars().next().is_some_and(|c| c.is_uppercase()) {
        capitalize_first(replacement)
    } else {
        replacement.to_string()
    }
}

/// Replace every match, carrying the capitalization of the first letter over.
pub fn replace_preserving_case(re: &Regex, text: &str, replacement: &str) -> String {
    re.replace_all(text, |caps: &Captures| match_leading_case(&caps[0], replacement))
        .to_string()
}

/// Contract every expanded phrase from the table. Returns the rewritten text
/// and the `(expanded, contracted)` pairs that fired.
pub fn apply_contractions(text: &str) -> (String, Vec<(&'static str, &'static str)>) {
    let mut result = text.to_string();
    let mut applied = Vec::new();

    for rule in contraction_rules() {
        if rule.expanded_re.is_match(&result) {
            result = replace_preserving_case(&rule.expanded_re, &result, rule.contracted);
            applied.push((rule.expanded, rule.contracted));
        }
    }

    (result, applied)
}

/// Inverse of [`apply_contractions`].
pub fn expand_contractions(text: &str) -> String {
    let mut result = text.to_string();
    let mut seen: HashSet<&str> = HashSet::new();

    for rule in contraction_rules().iter().rev() {
        if !seen.insert(rule.contracted) {
            continue;
        }
        result = replace_preserving_case(&rule.contracted_re, &result, rule.expanded);
    }

    result
}

/// Clamp a score into the unit interval, mapping NaN to zero.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        let input = "Hello\u{201c}World\u{201d} it\u{2019}s  here \u{2013} now\r\nnext";
        let output = normalize_punctuation(input);
        assert_eq!(output, "Hello\"World\" it's here - now\nnext");
    }

    #[test]
    fn test_split_sentences_drops_punctuation() {
        let sentences = split_sentences("Rights matter. They protect us daily! Think about it?");
        assert_eq!(sentences, vec!["Rights matter", "They protect us daily", "Think about it"]);
    }

    #[test]
    fn test_split_sentences_keeps_abbreviations() {
        let sentences = split_sentences("Dr. Smith met Mr. Jones. They talked.");
        assert_eq!(sentences, vec!["Dr. Smith met Mr. Jones", "They talked"]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("   ").is_empty());
        assert!(sentence_word_counts("").is_empty());
    }

    #[test]
    fn test_split_sentences_advanced_offsets() {
        let text = "First one. Second one?! Third";
        let sentences = split_sentences_advanced(text);
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].text, "First one.");
        assert_eq!(sentences[1].text, "Second one?!");
        assert_eq!(sentences[2].text, "Third");
        assert_eq!(&text[sentences[1].start..sentences[1].end], "Second one?!");
    }

    #[test]
    fn test_split_sentences_advanced_decimal_and_quotes() {
        let text = "It costs 3.5 dollars. She said \"stop. now\" and left.";
        let sentences = split_sentences_advanced(text);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "It costs 3.5 dollars.");
        assert_eq!(sentences[1].text, "She said \"stop. now\" and left.");
    }

    #[test]
    fn test_length_spread() {
        assert_eq!(length_spread("One two. One two three four five six seven eight."), 6);
        assert_eq!(length_spread(""), 0);
    }

    #[test]
    fn test_polish_text() {
        assert_eq!(polish_text("hello   world ,friend"), "hello world,friend.");
        assert_eq!(polish_text("Done.Next thing"), "Done. Next thing.");
        assert_eq!(polish_text("Already done!"), "Already done!");
        assert_eq!(polish_text(""), "");
    }

    #[test]
    fn test_apply_contractions_preserves_case() {
        let (out, applied) = apply_contractions("It is fine. We are sure it is not broken.");
        assert_eq!(out, "It's fine. We're sure it's not broken.");
        assert!(applied.contains(&("it is", "it's")));
        assert!(applied.contains(&("we are", "we're")));
    }

    #[test]
    fn test_apply_contractions_respects_word_boundaries() {
        let (out, applied) = apply_contractions("The habit is strong.");
        assert_eq!(out, "The habit is strong.");
        assert!(applied.is_empty());
    }

    #[test]
    fn test_expand_contractions_prefers_last_entry() {
        assert_eq!(expand_contractions("I'd say it's fine"), "I would say it is fine");
        assert_eq!(expand_contractions("Don't go"), "Do not go");
    }

    #[test]
    fn test_title_case_and_clamp() {
        assert_eq!(title_case("civic duty"), "Civic Duty");
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }
}
