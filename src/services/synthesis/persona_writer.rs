// Persona Writer
// Rewrites synthesized text in the voice of a named persona

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::pick;
use crate::models::{HumanizationResult, Persona, RhetoricalStyle, ToneType};
use crate::services::text_processor::{
    apply_contractions, capitalize_first, collapse_whitespace, expand_contractions, lowercase_first,
    polish_text, split_sentences_advanced,
};

pub const DEFAULT_PERSONA: &str = "conversational";

/// (pattern, replacement) pairs; one of them may fire per humanize pass.
const IMPERFECTIONS: &[(&str, &str)] = &[
    (" - ", " — "),
    (". ", ". And "),
    (", and ", " — and "),
    (". This ", ". (This "),
    ("because ", "because — "),
];

pub const VARIED_STARTERS: &[&str] = &[
    "And ",
    "But ",
    "So ",
    "Now ",
    "See, ",
    "Thing is, ",
    "Point being, ",
    "Here's what: ",
    "Quick note: ",
    "Real talk: ",
];

const FILLERS: &[&str] = &[
    "basically",
    "actually",
    "essentially",
    "fundamentally",
    "in terms of",
    "at this point in time",
    "in order to",
    "due to the fact that",
];

const CASUAL_TRANSITIONS: &[(&str, &str)] = &[
    ("However,", "But"),
    ("Therefore,", "So"),
    ("Furthermore,", "Also,"),
    ("Nevertheless,", "Still,"),
    ("Additionally,", "Plus,"),
];

const FORMAL_TRANSITIONS: &[(&str, &str)] = &[
    ("But ", "However, "),
    ("So ", "Therefore, "),
    ("Also,", "Furthermore,"),
    ("Plus,", "Additionally,"),
];

const SOCRATIC_QUESTIONS: &[&str] = &[
    "But what does this really mean?",
    "Consider: what are the implications?",
    "Ask yourself: when would this matter?",
    "The question becomes: how does this apply?",
];

const NARRATIVE_OPENERS: &[&str] = &[
    "Picture this: ",
    "Here's how it plays out: ",
    "The story goes like this: ",
    "Imagine the scenario: ",
];

const PROVOCATIVE_OPENERS: &[&str] = &[
    "Here's what nobody's telling you: ",
    "Uncomfortable truth: ",
    "Let's be real here: ",
    "The part they leave out: ",
];

const SPLIT_CONJUNCTIONS: &[&str] = &["and", "but", "which", "that"];

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn build_catalog() -> Vec<Persona> {
    vec![
        Persona {
            key: "conversational".to_string(),
            name: "Conversational Educator".to_string(),
            tone: ToneType::Conversational,
            formality_level: 0.3,
            uses_contractions: true,
            rhetorical_style: RhetoricalStyle::Exploratory,
            preferred_vocabulary: words(&["actually", "here's the thing", "so", "look", "honestly"]),
            avoided_vocabulary: words(&["furthermore", "moreover", "thus", "hence", "whereby"]),
            prefers_short_sentences: true,
            uses_rhetorical_questions: true,
            uses_em_dashes: true,
            uses_parentheticals: true,
            varies_sentence_starts: true,
        },
        Persona {
            key: "thoughtful".to_string(),
            name: "Thoughtful Analyst".to_string(),
            tone: ToneType::Thoughtful,
            formality_level: 0.5,
            uses_contractions: true,
            rhetorical_style: RhetoricalStyle::Socratic,
            preferred_vocabulary: words(&["consider", "perhaps", "interestingly", "notably", "worth noting"]),
            avoided_vocabulary: words(&["obviously", "clearly", "undoubtedly"]),
            prefers_short_sentences: false,
            uses_rhetorical_questions: true,
            uses_em_dashes: true,
            uses_parentheticals: true,
            varies_sentence_starts: true,
        },
        Persona {
            key: "energetic".to_string(),
            name: "Energetic Advocate".to_string(),
            tone: ToneType::Energetic,
            formality_level: 0.2,
            uses_contractions: true,
            rhetorical_style: RhetoricalStyle::Provocative,
            preferred_vocabulary: words(&["wow", "seriously", "huge", "game-changer", "wild"]),
            avoided_vocabulary: words(&["perhaps", "maybe", "somewhat", "rather"]),
            prefers_short_sentences: true,
            uses_rhetorical_questions: true,
            uses_em_dashes: true,
            uses_parentheticals: false,
            varies_sentence_starts: true,
        },
        Persona {
            key: "serious".to_string(),
            name: "Serious Scholar".to_string(),
            tone: ToneType::Serious,
            formality_level: 0.7,
            uses_contractions: false,
            rhetorical_style: RhetoricalStyle::Direct,
            preferred_vocabulary: words(&["significant", "essential", "critical", "fundamental"]),
            avoided_vocabulary: words(&["kind of", "sort of", "basically", "like"]),
            prefers_short_sentences: false,
            uses_rhetorical_questions: false,
            uses_em_dashes: false,
            uses_parentheticals: false,
            varies_sentence_starts: true,
        },
        Persona {
            key: "warm".to_string(),
            name: "Warm Guide".to_string(),
            tone: ToneType::Warm,
            formality_level: 0.4,
            uses_contractions: true,
            rhetorical_style: RhetoricalStyle::Narrative,
            preferred_vocabulary: words(&["together", "we", "our", "let's", "imagine"]),
            avoided_vocabulary: words(&["you must", "you should", "failure", "wrong"]),
            prefers_short_sentences: false,
            uses_rhetorical_questions: true,
            uses_em_dashes: true,
            uses_parentheticals: true,
            varies_sentence_starts: true,
        },
        Persona {
            key: "direct".to_string(),
            name: "Direct Communicator".to_string(),
            tone: ToneType::Direct,
            formality_level: 0.5,
            uses_contractions: true,
            rhetorical_style: RhetoricalStyle::Direct,
            preferred_vocabulary: words(&["here's", "bottom line", "simply", "plain"]),
            avoided_vocabulary: words(&["perhaps", "maybe", "might", "could be"]),
            prefers_short_sentences: true,
            uses_rhetorical_questions: false,
            uses_em_dashes: false,
            uses_parentheticals: false,
            varies_sentence_starts: true,
        },
    ]
}

/// Built-in persona catalog, in display order.
pub fn personas() -> &'static [Persona] {
    static CATALOG: OnceLock<Vec<Persona>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

pub fn find_persona(key: &str) -> Option<&'static Persona> {
    let key = key.trim().to_lowercase();
    personas().iter().find(|p| p.key == key)
}

/// Look up a persona, falling back to the conversational one for unknown keys.
pub fn persona_by_name(key: &str) -> &'static Persona {
    match find_persona(key) {
        Some(persona) => persona,
        None => {
            tracing::debug!(requested = key, "persona.unknown");
            &personas()[0]
        }
    }
}

pub fn list_personas() -> Vec<&'static str> {
    personas().iter().map(|p| p.key.as_str()).collect()
}

/// Replace the first `pattern`; an opened parenthetical is closed before
/// the end of its sentence.
fn insert_imperfection(text: &str, pattern: &str, replacement: &str) -> String {
    let Some(pos) = text.find(pattern) else {
        return text.to_string();
    };
    let head = &text[..pos];
    let tail = &text[pos + pattern.len()..];

    if !replacement.contains('(') {
        return format!("{}{}{}", head, replacement, tail);
    }

    match tail.find(['.', '!', '?']) {
        Some(end) => format!("{}{}{}){}", head, replacement, &tail[..end], &tail[end..]),
        None => format!("{}{}{})", head, replacement, tail),
    }
}

fn whole_phrase_re(phrase: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase))).expect("phrase regex")
}

fn filler_res() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| FILLERS.iter().map(|f| (*f, whole_phrase_re(f))).collect())
}

/// Strip every whole-word occurrence of the persona's avoided terms.
pub fn remove_avoided_vocabulary(text: &str, persona: &Persona) -> (String, Vec<String>) {
    let mut result = text.to_string();
    let mut changes = Vec::new();

    for term in &persona.avoided_vocabulary {
        let re = whole_phrase_re(term);
        if re.is_match(&result) {
            result = re.replace_all(&result, "").to_string();
            changes.push(format!("Removed avoided word: '{}'", term));
        }
    }

    (collapse_whitespace(&result), changes)
}

pub fn remove_fillers(text: &str) -> (String, Vec<String>) {
    let mut result = text.to_string();
    let mut changes = Vec::new();

    for (filler, re) in filler_res() {
        if re.is_match(&result) {
            result = re.replace_all(&result, "").to_string();
            changes.push(format!("Removed filler: '{}'", filler));
        }
    }

    (collapse_whitespace(&result), changes)
}

fn starts_with_pronoun_i(sentence: &str) -> bool {
    let first = sentence.split_whitespace().next().unwrap_or("");
    first == "I" || first.starts_with("I'")
}

pub struct PersonaWriter {
    default_persona: &'static Persona,
    rng: StdRng,
}

impl Default for PersonaWriter {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA)
    }
}

impl PersonaWriter {
    pub fn new(default_persona: &str) -> Self {
        Self::with_seed(default_persona, rand::random())
    }

    pub fn with_seed(default_persona: &str, seed: u64) -> Self {
        Self {
            default_persona: persona_by_name(default_persona),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn default_persona(&self) -> &'static Persona {
        self.default_persona
    }

    /// Full persona pass: contractions, starter variety, imperfections,
    /// vocabulary, fillers, polish. Each step runs only if the persona allows it.
    pub fn humanize_content(&mut self, text: &str, persona: Option<&Persona>) -> HumanizationResult {
        let persona = persona.unwrap_or(self.default_persona);
        let mut changes = Vec::new();
        let mut result = text.to_string();

        if persona.uses_contractions {
            let (contracted, applied) = apply_contractions(&result);
            result = contracted;
            changes.extend(
                applied
                    .into_iter()
                    .map(|(full, short)| format!("Contracted '{}' → '{}'", full, short)),
            );
        }

        if persona.varies_sentence_starts {
            result = self.vary_sentence_starts(&result, &mut changes);
        }

        if persona.uses_em_dashes || persona.uses_parentheticals {
            result = self.add_imperfection(&result, persona, &mut changes);
        }

        let (result, vocab_changes) = remove_avoided_vocabulary(&result, persona);
        changes.extend(vocab_changes);

        let (result, filler_changes) = remove_fillers(&result);
        changes.extend(filler_changes);

        let transformed = capitalize_first(&polish_text(&result));

        tracing::debug!(persona = %persona.key, changes = changes.len(), "persona.humanized");

        HumanizationResult {
            original: text.to_string(),
            transformed,
            changes_made: changes,
            persona_applied: persona.name.clone(),
        }
    }

    fn vary_sentence_starts(&mut self, text: &str, changes: &mut Vec<String>) -> String {
        let sentences = split_sentences_advanced(text);
        if sentences.len() < 3 {
            return text.to_string();
        }

        let mut start_counts: HashMap<String, usize> = HashMap::new();
        for sentence in &sentences {
            let first = sentence.text.split_whitespace().next().unwrap_or("").to_lowercase();
            *start_counts.entry(first).or_insert(0) += 1;
        }
        if !start_counts.values().any(|&count| count > 2) {
            return text.to_string();
        }

        let mut rewritten = Vec::with_capacity(sentences.len());
        for (i, sentence) in sentences.iter().enumerate() {
            let mut current = sentence.text.clone();
            if i > 0 && self.rng.random_bool(0.2) {
                let starter = pick(&mut self.rng, VARIED_STARTERS).copied().unwrap_or("And ");
                let already_lower = current.chars().next().is_some_and(|c| c.is_lowercase());
                if !already_lower {
                    let rest = if starts_with_pronoun_i(&current) {
                        current.clone()
                    } else {
                        lowercase_first(&current)
                    };
                    current = format!("{}{}", starter, rest);
                    changes.push(format!("Added varied starter: '{}'", starter));
                }
            }
            rewritten.push(current);
        }
        rewritten.join(" ")
    }

    fn add_imperfection(&mut self, text: &str, persona: &Persona, changes: &mut Vec<String>) -> String {
        if !self.rng.random_bool(0.4) {
            return text.to_string();
        }
        let Some(&(pattern, replacement)) = pick(&mut self.rng, IMPERFECTIONS) else {
            return text.to_string();
        };

        if replacement.contains('—') && !persona.uses_em_dashes {
            return text.to_string();
        }
        if replacement.contains('(') && !persona.uses_parentheticals {
            return text.to_string();
        }
        if !text.contains(pattern) {
            return text.to_string();
        }

        changes.push(format!("Added imperfection: '{}' → '{}'", pattern, replacement));
        insert_imperfection(text, pattern, replacement)
    }

    /// Coarser transform: formality shift plus one rhetorical-style flourish.
    pub fn apply_voice(&mut self, text: &str, persona: Option<&Persona>) -> String {
        let persona = persona.unwrap_or(self.default_persona);
        let mut result = text.to_string();

        if persona.formality_level < 0.4 {
            result = apply_contractions(&result).0;
            for (formal, casual) in CASUAL_TRANSITIONS {
                result = result.replace(formal, casual);
            }
        } else if persona.formality_level > 0.6 {
            result = expand_contractions(&result);
            for (casual, formal) in FORMAL_TRANSITIONS {
                result = result.replace(casual, formal);
            }
        }

        match persona.rhetorical_style {
            RhetoricalStyle::Socratic => self.add_socratic_question(&result),
            RhetoricalStyle::Narrative => self.prepend_opener(&result, NARRATIVE_OPENERS),
            RhetoricalStyle::Provocative => self.prepend_opener(&result, PROVOCATIVE_OPENERS),
            RhetoricalStyle::Direct | RhetoricalStyle::Exploratory => result,
        }
    }

    fn add_socratic_question(&mut self, text: &str) -> String {
        if SOCRATIC_QUESTIONS.iter().any(|q| text.contains(q)) {
            return text.to_string();
        }
        let mut sentences: Vec<String> = split_sentences_advanced(text).into_iter().map(|s| s.text).collect();
        if sentences.len() < 2 {
            return text.to_string();
        }
        let question = pick(&mut self.rng, SOCRATIC_QUESTIONS).copied().unwrap_or(SOCRATIC_QUESTIONS[0]);
        let insert_at = sentences.len().min(2);
        sentences.insert(insert_at, question.to_string());
        sentences.join(" ")
    }

    fn prepend_opener(&mut self, text: &str, openers: &[&str]) -> String {
        if openers.iter().any(|o| text.contains(o.trim_end())) {
            return text.to_string();
        }
        match pick(&mut self.rng, openers) {
            Some(opener) => format!("{}{}", opener, text),
            None => text.to_string(),
        }
    }

    /// Split an overlong sentence at a conjunction near its middle, or join
    /// two short neighbours with a dash.
    pub fn vary_sentence_structure(&mut self, text: &str) -> String {
        let sentences: Vec<String> = split_sentences_advanced(text).into_iter().map(|s| s.text).collect();
        if sentences.len() < 2 {
            return text.to_string();
        }

        let mut result: Vec<String> = Vec::new();
        let mut skip_next = false;

        for (i, sentence) in sentences.iter().enumerate() {
            if skip_next {
                skip_next = false;
                continue;
            }
            let tokens: Vec<&str> = sentence.split_whitespace().collect();

            if tokens.len() > 15 && self.rng.random_bool(0.3) {
                let midpoint = tokens.len() / 2;
                let split_at = (midpoint.saturating_sub(3)..midpoint + 3)
                    .filter(|&j| j > 0 && j + 1 < tokens.len())
                    .find(|&j| SPLIT_CONJUNCTIONS.contains(&tokens[j]));
                match split_at {
                    Some(j) => {
                        let first = tokens[..j].join(" ");
                        result.push(format!("{}.", first.trim_end_matches(',')));
                        result.push(capitalize_first(&tokens[j + 1..].join(" ")));
                    }
                    None => result.push(sentence.clone()),
                }
            } else if tokens.len() < 8 && i + 1 < sentences.len() {
                let next = &sentences[i + 1];
                if next.split_whitespace().count() < 8 {
                    let head = sentence.trim_end_matches('.');
                    let tail = if starts_with_pronoun_i(next) { next.clone() } else { lowercase_first(next) };
                    result.push(format!("{} — {}", head, tail));
                    skip_next = true;
                } else {
                    result.push(sentence.clone());
                }
            } else {
                result.push(sentence.clone());
            }
        }

        result.join(" ")
    }
}
