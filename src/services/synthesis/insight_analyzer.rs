// Insight Analyzer
// Lexical extraction of principles, meanings and tensions from document sections

use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use crate::models::{
    AnalysisResult, ConnectionType, DocumentSection, Insight, InsightConnection, TensionPair,
};
use crate::services::providers::{extract_json, CompletionProvider};
use crate::services::text_processor::{clamp_unit, normalize_punctuation, title_case};

pub const PRINCIPLE_KEYWORDS: &[&str] = &[
    "right", "freedom", "protect", "guarantee", "ensure", "entitle", "shall", "must", "duty",
    "obligation", "prohibit", "forbid",
];

pub const APPLICATION_KEYWORDS: &[&str] = &[
    "apply", "enforce", "implement", "exercise", "practice", "access", "use", "benefit", "claim",
    "seek",
];

pub const LIMITATION_KEYWORDS: &[&str] = &[
    "limit", "restrict", "except", "unless", "subject to", "provided that", "in accordance with",
    "reasonable",
];

pub const TENSION_KEYWORDS: &[&str] = &[
    "balance", "weigh", "consider", "competing", "conflicting", "reconcile", "versus", "against",
    "between",
];

/// First matching trigger wins.
const PRACTICAL_MEANINGS: &[(&[&str], &str)] = &[
    (&["access"], "Ensures people can obtain necessary services or information"),
    (&["protect"], "Shields individuals from harm or interference"),
    (&["equality", "equal"], "Ensures fair and equal treatment regardless of differences"),
    (&["dignity"], "Requires respectful treatment of all persons"),
    (&["property"], "Governs what people own and how they can use it"),
    (&["vote", "election"], "Enables participation in democratic processes"),
    (&["speech", "expression"], "Allows people to share ideas and opinions openly"),
];

const GENERIC_PRACTICAL_MEANING: &str = "Affects how citizens interact with government and each other";

/// Every matching trigger contributes its analogy.
const ANALOGIES: &[(&[&str], &str)] = &[
    (
        &["freedom of speech", "expression"],
        "Like having a voice in a town square - you can speak, but not shout 'fire' in a crowded theater",
    ),
    (&["privacy"], "Like curtains on your windows - you choose what others see"),
    (&["property"], "Like your home - it's yours, but you still can't ignore building codes"),
    (&["equality"], "Like rules in a game - everyone plays by the same ones"),
    (&["dignity"], "Like basic respect - something everyone deserves regardless of status"),
    (&["access"], "Like a public library - open to all, not just the privileged few"),
];

const MISCONCEPTIONS: &[(&str, &str)] = &[
    ("right", "Rights are not absolute - they can be limited in reasonable ways"),
    ("freedom", "Freedom doesn't mean freedom from consequences"),
    ("equality", "Equal treatment doesn't always mean identical treatment"),
    ("property", "Property rights don't override all other considerations"),
];

const SECTION_TENSIONS: &[(&[&str], &str)] = &[
    (&["subject to"], "Right is qualified by reasonable limitations"),
    (&["except", "unless"], "Exceptions create boundaries around the right"),
    (&["balance"], "Multiple interests must be weighed"),
];

const TENSION_PAIRS: &[(&str, &str, &str)] = &[
    ("freedom", "security", "The classic balance between liberty and safety"),
    ("privacy", "transparency", "Individual privacy vs public accountability"),
    ("equality", "freedom", "Equal treatment vs freedom of choice"),
    ("property", "public interest", "Private ownership vs collective needs"),
    ("speech", "dignity", "Expression vs protection from harm"),
];

const RIGHT_WORDS: &[&str] = &["right", "freedom", "entitle"];
const ENFORCE_WORDS: &[&str] = &["enforce", "protect", "remedy", "court"];

const MAX_ENRICHED_ITEMS: usize = 5;

fn keyword_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PRINCIPLE_KEYWORDS
            .iter()
            .chain(APPLICATION_KEYWORDS)
            .chain(LIMITATION_KEYWORDS)
            .chain(TENSION_KEYWORDS)
            .map(|kw| {
                let re = Regex::new(&format!(r"(?i)\b{}", regex::escape(kw))).expect("keyword regex");
                (*kw, re)
            })
            .collect()
    })
}

fn right_to_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"right to\s+([^.,;]+)").expect("right-to regex"))
}

fn freedom_of_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"freedom of\s+([^.,;]+)").expect("freedom-of regex"))
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Every keyword from the four groups that starts a word in `text`.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    keyword_patterns()
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(kw, _)| kw.to_string())
        .collect()
}

fn derive_core_principle(text_lower: &str) -> String {
    if let Some(caps) = right_to_re().captures(text_lower) {
        return format!("Guarantees the right to {}", caps[1].trim());
    }
    if let Some(caps) = freedom_of_re().captures(text_lower) {
        return format!("Protects freedom of {}", caps[1].trim());
    }
    if text_lower.contains("shall not") || text_lower.contains("prohibit") {
        return "Protection against specific government actions".to_string();
    }
    if text_lower.contains("duty") {
        return "Establishes an obligation or responsibility".to_string();
    }
    "Establishes a framework or procedure".to_string()
}

fn derive_practical_meaning(text_lower: &str) -> String {
    PRACTICAL_MEANINGS
        .iter()
        .find(|(triggers, _)| contains_any(text_lower, triggers))
        .map(|(_, meaning)| meaning.to_string())
        .unwrap_or_else(|| GENERIC_PRACTICAL_MEANING.to_string())
}

fn collect_matching(text_lower: &str, table: &[(&[&str], &str)]) -> Vec<String> {
    table
        .iter()
        .filter(|(triggers, _)| contains_any(text_lower, triggers))
        .map(|(_, note)| note.to_string())
        .collect()
}

fn derive_misconceptions(text_lower: &str) -> Vec<String> {
    MISCONCEPTIONS
        .iter()
        .filter(|(trigger, _)| text_lower.contains(trigger))
        .map(|(_, note)| note.to_string())
        .collect()
}

fn implications_for_text(text_lower: &str) -> Vec<String> {
    let mut implications = Vec::new();

    if contains_any(text_lower, &["right to", "entitled to", "freedom of"]) {
        implications.push("Citizens can exercise this right in their daily interactions".to_string());
        implications.push("Government must respect and protect this entitlement".to_string());
    }
    if contains_any(text_lower, LIMITATION_KEYWORDS) {
        implications.push("This right has boundaries that must be understood".to_string());
        implications.push("Context matters when applying this provision".to_string());
    }
    if contains_any(text_lower, &["duty", "obligation"]) {
        implications.push("There are responsibilities attached to this provision".to_string());
    }

    implications
}

/// Practical consequences implied by the insight's source text.
pub fn extract_implications(insight: &Insight) -> Vec<String> {
    implications_for_text(&insight.section_text.to_lowercase())
}

pub fn calculate_quality_score(insight: &Insight) -> f64 {
    let mut score = 0.0;
    if !insight.core_principle.is_empty() {
        score += 0.25;
    }
    if !insight.practical_meaning.is_empty() {
        score += 0.25;
    }
    if !insight.analogies.is_empty() {
        score += 0.2;
    }
    if !insight.implications.is_empty() {
        score += 0.15;
    }
    if !insight.common_misconceptions.is_empty() {
        score += 0.15;
    }
    clamp_unit(score)
}

fn are_complementary(a: &str, b: &str) -> bool {
    let (right_a, right_b) = (contains_any(a, RIGHT_WORDS), contains_any(b, RIGHT_WORDS));
    let (enforce_a, enforce_b) = (contains_any(a, ENFORCE_WORDS), contains_any(b, ENFORCE_WORDS));
    (right_a && enforce_b) || (right_b && enforce_a)
}

/// Pairwise keyword overlap and rights/enforcement links.
pub fn find_connections(insights: &[Insight]) -> Vec<InsightConnection> {
    let mut connections = Vec::new();

    for (i, first) in insights.iter().enumerate() {
        for second in &insights[i + 1..] {
            let common: Vec<&str> = first
                .keywords
                .intersection(&second.keywords)
                .map(String::as_str)
                .collect();
            if !common.is_empty() {
                connections.push(InsightConnection {
                    source_section: first.section_number,
                    target_section: second.section_number,
                    connection_type: ConnectionType::Related,
                    description: format!("Share concepts: {}", common.join(", ")),
                    strength: clamp_unit(common.len() as f64 / 3.0),
                });
            }

            if are_complementary(&first.section_text.to_lowercase(), &second.section_text.to_lowercase()) {
                connections.push(InsightConnection {
                    source_section: first.section_number,
                    target_section: second.section_number,
                    connection_type: ConnectionType::Supports,
                    description: "These provisions work together".to_string(),
                    strength: 0.7,
                });
            }
        }
    }

    connections
}

/// Top five keywords by frequency, kept only when shared by several insights.
pub fn extract_themes(insights: &[Insight]) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for kw in insights.iter().flat_map(|i| i.keywords.iter()) {
        let count = counts.entry(kw.as_str()).or_insert(0);
        if *count == 0 {
            order.push(kw.as_str());
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));

    order
        .into_iter()
        .take(5)
        .filter(|kw| counts[kw] > 1)
        .map(title_case)
        .collect()
}

pub fn calculate_synthesis_potential(insights: &[Insight], connections: &[InsightConnection]) -> f64 {
    if insights.is_empty() {
        return 0.0;
    }

    let n = insights.len();
    let avg_quality = insights.iter().map(|i| i.quality_score).sum::<f64>() / n as f64;
    let density = if n < 2 {
        0.0
    } else {
        let max_connections = (n * (n - 1) / 2) as f64;
        (connections.len() as f64 / max_connections).min(1.0)
    };

    clamp_unit(avg_quality * 0.6 + density * 0.4)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnrichmentReply {
    misconceptions: Vec<String>,
    implications: Vec<String>,
    analogies: Vec<String>,
    edge_cases: Vec<String>,
    related_concepts: Vec<String>,
}

fn merge_unique(target: &mut Vec<String>, extra: Vec<String>) {
    for item in extra {
        if target.len() >= MAX_ENRICHED_ITEMS {
            break;
        }
        let item = item.trim();
        if item.is_empty() || target.iter().any(|t| t.eq_ignore_ascii_case(item)) {
            continue;
        }
        target.push(item.to_string());
    }
}

fn enrichment_prompt(insight: &Insight) -> String {
    format!(
        "{context}\n\nPASSAGE:\n{text}\n\n\
         Return a JSON object with these optional string arrays: \
         \"misconceptions\" (what people commonly get wrong), \
         \"implications\" (practical consequences in daily life), \
         \"analogies\" (short everyday comparisons), \
         \"edge_cases\" (situations where the provision is hard to apply), \
         \"related_concepts\" (other ideas this connects to). \
         At most {max} items per array.",
        context = insight.to_prompt_context(),
        text = insight.section_text,
        max = MAX_ENRICHED_ITEMS,
    )
}

#[derive(Default, Clone)]
pub struct InsightAnalyzer {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl InsightAnalyzer {
    pub fn new() -> Self {
        Self { provider: None }
    }

    pub fn with_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider: Some(provider) }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Heuristic-only analysis; never touches the completion provider.
    pub fn analyze_section_lexical(&self, section: &DocumentSection) -> Insight {
        let title = section.display_title();
        let content = normalize_punctuation(&section.content);
        let mut insight = Insight::empty(section.section_number, &title, &content);

        let keywords = extract_keywords(&content);
        if keywords.is_empty() {
            return insight;
        }

        let text_lower = content.to_lowercase();
        insight.keywords = keywords;
        insight.core_principle = derive_core_principle(&text_lower);
        insight.practical_meaning = derive_practical_meaning(&text_lower);
        insight.tensions = collect_matching(&text_lower, SECTION_TENSIONS);
        insight.analogies = collect_matching(&text_lower, ANALOGIES);
        insight.common_misconceptions = derive_misconceptions(&text_lower);
        insight.implications = implications_for_text(&text_lower);
        insight.quality_score = calculate_quality_score(&insight);
        insight
    }

    /// Analyze one section, optionally enriching it through the provider.
    /// Enrichment failures leave the heuristic fields untouched.
    pub async fn analyze_section(&self, section: &DocumentSection, use_enrichment: bool) -> Insight {
        let mut insight = self.analyze_section_lexical(section);

        if use_enrichment && !insight.keywords.is_empty() {
            if let Some(provider) = &self.provider {
                self.enrich(provider.as_ref(), &mut insight).await;
                insight.quality_score = calculate_quality_score(&insight);
            }
        }

        tracing::debug!(
            section = insight.section_number,
            keywords = insight.keywords.len(),
            quality = insight.quality_score,
            "insight.analyzed"
        );
        insight
    }

    async fn enrich(&self, provider: &dyn CompletionProvider, insight: &mut Insight) {
        let reply = match provider.complete(&enrichment_prompt(insight)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(section = insight.section_number, provider = provider.name(), error = %e, "enrichment.failed");
                return;
            }
        };

        let parsed: EnrichmentReply = match serde_json::from_str(&extract_json(&reply)) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(section = insight.section_number, error = %e, "enrichment.unparseable");
                return;
            }
        };

        merge_unique(&mut insight.common_misconceptions, parsed.misconceptions);
        merge_unique(&mut insight.implications, parsed.implications);
        merge_unique(&mut insight.analogies, parsed.analogies);
        merge_unique(&mut insight.edge_cases, parsed.edge_cases);
        merge_unique(&mut insight.related_concepts, parsed.related_concepts);
        tracing::debug!(section = insight.section_number, "enrichment.applied");
    }

    pub async fn analyze_multiple_sections(&self, sections: &[DocumentSection], use_enrichment: bool) -> AnalysisResult {
        let mut insights = Vec::with_capacity(sections.len());
        for section in sections {
            insights.push(self.analyze_section(section, use_enrichment).await);
        }
        Self::summarize(insights)
    }

    /// Connections, themes and synthesis potential for already analyzed insights.
    pub fn summarize(insights: Vec<Insight>) -> AnalysisResult {
        let connections = find_connections(&insights);
        let themes = extract_themes(&insights);
        let synthesis_potential = calculate_synthesis_potential(&insights, &connections);
        AnalysisResult {
            insights,
            connections,
            themes,
            synthesis_potential,
        }
    }

    pub fn identify_tensions(&self, insights: &[Insight]) -> Vec<TensionPair> {
        let mut tensions = Vec::new();

        for (i, first) in insights.iter().enumerate() {
            let text_a = first.section_text.to_lowercase();
            for second in &insights[i + 1..] {
                let text_b = second.section_text.to_lowercase();
                for (left, right, description) in TENSION_PAIRS {
                    let forward = text_a.contains(left) && text_b.contains(right);
                    let backward = text_a.contains(right) && text_b.contains(left);
                    if forward || backward {
                        tensions.push(TensionPair {
                            first_section: first.section_number,
                            second_section: second.section_number,
                            description: description.to_string(),
                        });
                    }
                }
            }
        }

        tensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockProvider;

    fn section(n: i32, text: &str) -> DocumentSection {
        DocumentSection::new(n, &format!("Title {}", n), text)
    }

    #[test]
    fn test_freedom_of_expression_example() {
        let analyzer = InsightAnalyzer::new();
        let insight = analyzer.analyze_section_lexical(&section(16, "Everyone has the right to freedom of expression."));
        assert!(insight.core_principle.contains("freedom of expression"));
        assert!(insight.keywords.contains("freedom") || insight.keywords.contains("expression"));
        assert_eq!(insight.practical_meaning, "Allows people to share ideas and opinions openly");
        assert!(insight.has_sufficient_depth());
    }

    #[test]
    fn test_pasted_punctuation_is_normalized_before_matching() {
        let analyzer = InsightAnalyzer::new();
        let section = DocumentSection::new(
            14,
            "Privacy",
            "  Everyone\u{2019}s got the right\u{00A0}to privacy \u{2013} subject\u{00A0}to reasonable limits.\r\n",
        );
        let insight = analyzer.analyze_section_lexical(&section);

        assert_eq!(insight.section_text, "Everyone's got the right to privacy - subject to reasonable limits.");
        assert_eq!(insight.core_principle, "Guarantees the right to privacy - subject to reasonable limits");
        assert!(insight
            .implications
            .contains(&"Citizens can exercise this right in their daily interactions".to_string()));
        assert!(insight
            .implications
            .contains(&"This right has boundaries that must be understood".to_string()));
    }

    #[test]
    fn test_no_keywords_yields_empty_insight() {
        let analyzer = InsightAnalyzer::new();
        let insight = analyzer.analyze_section_lexical(&section(3, "The flag is green and gold."));
        assert!(insight.keywords.is_empty());
        assert!(insight.core_principle.is_empty());
        assert!(insight.practical_meaning.is_empty());
        assert_eq!(insight.quality_score, 0.0);
        assert!(!insight.has_sufficient_depth());

        let empty = analyzer.analyze_section_lexical(&section(4, ""));
        assert_eq!(empty.quality_score, 0.0);
    }

    #[test]
    fn test_keywords_match_word_starts_only() {
        let keywords = extract_keywords("Because the user rights are limited");
        assert!(keywords.contains("use"));
        assert!(keywords.contains("right"));
        assert!(keywords.contains("limit"));
        assert!(!extract_keywords("because").contains("use"));
        assert!(extract_keywords("Interests compete, versus the state").contains("versus"));
    }

    #[test]
    fn test_core_principle_priority() {
        assert_eq!(derive_core_principle("the state shall not detain anyone"), "Protection against specific government actions");
        assert_eq!(derive_core_principle("every citizen has a duty to vote"), "Establishes an obligation or responsibility");
        assert_eq!(derive_core_principle("parliament must meet"), "Establishes a framework or procedure");
        assert_eq!(derive_core_principle("right to vote; shall not"), "Guarantees the right to vote");
    }

    #[test]
    fn test_practical_meaning_priority() {
        assert_eq!(derive_practical_meaning("access to information and protection"), "Ensures people can obtain necessary services or information");
        assert_eq!(derive_practical_meaning("equal before the law"), "Ensures fair and equal treatment regardless of differences");
        assert_eq!(derive_practical_meaning("nothing relevant"), GENERIC_PRACTICAL_MEANING);
    }

    #[test]
    fn test_rich_section_fields() {
        let analyzer = InsightAnalyzer::new();
        let insight = analyzer.analyze_section_lexical(&section(
            25,
            "Everyone has the right to property, subject to reasonable limits, except where the public interest requires a balance.",
        ));
        assert_eq!(insight.tensions.len(), 3);
        assert!(insight.analogies.iter().any(|a| a.contains("your home")));
        assert!(insight.common_misconceptions.iter().any(|m| m.contains("Property rights")));
        assert!(insight.implications.contains(&"Context matters when applying this provision".to_string()));
        assert!((insight.quality_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_matching_analogies_are_kept() {
        let text = "The right to dignity and equality, and access to courts.";
        let analogies = collect_matching(text, ANALOGIES);
        assert_eq!(analogies.len(), 3);
    }

    #[test]
    fn test_quality_score_bounds() {
        let analyzer = InsightAnalyzer::new();
        for text in ["", "shall", "The right to privacy.", "duty duty duty", "access property dignity equality freedom of speech"] {
            let insight = analyzer.analyze_section_lexical(&section(1, text));
            assert!((0.0..=1.0).contains(&insight.quality_score));
            if insight.has_sufficient_depth() {
                assert!(!insight.core_principle.is_empty() && !insight.practical_meaning.is_empty());
            }
        }
    }

    #[test]
    fn test_extract_implications_duty() {
        let insight = Insight::empty(9, "Duties", "Every person has a duty to respect others.");
        assert_eq!(extract_implications(&insight), vec!["There are responsibilities attached to this provision".to_string()]);
    }

    #[test]
    fn test_summarize_connections_and_themes() {
        let analyzer = InsightAnalyzer::new();
        let a = analyzer.analyze_section_lexical(&section(14, "Everyone has the right to privacy, subject to reasonable limits."));
        let b = analyzer.analyze_section_lexical(&section(34, "Courts shall enforce the right to privacy and protect every person."));
        let result = InsightAnalyzer::summarize(vec![a, b]);

        assert_eq!(result.connections.len(), 2);
        let related = &result.connections[0];
        assert_eq!(related.connection_type, ConnectionType::Related);
        assert_eq!(related.description, "Share concepts: right");
        assert!((related.strength - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.connections[1].connection_type, ConnectionType::Supports);
        assert_eq!(result.themes, vec!["Right".to_string()]);
        assert!((0.0..=1.0).contains(&result.synthesis_potential));
        assert!(result.synthesis_potential > 0.4);
    }

    #[test]
    fn test_single_insight_has_no_density() {
        let analyzer = InsightAnalyzer::new();
        let a = analyzer.analyze_section_lexical(&section(1, "The right to privacy."));
        let expected = a.quality_score * 0.6;
        let result = InsightAnalyzer::summarize(vec![a]);
        assert!(result.connections.is_empty());
        assert!(result.themes.is_empty());
        assert!((result.synthesis_potential - expected).abs() < 1e-9);
        assert_eq!(calculate_synthesis_potential(&[], &[]), 0.0);
    }

    #[test]
    fn test_identify_tensions() {
        let analyzer = InsightAnalyzer::new();
        let a = Insight::empty(1, "Privacy", "Everyone has the right to privacy.");
        let b = Insight::empty(2, "Access", "Transparency in government must be ensured.");
        let c = Insight::empty(3, "Flag", "The flag is green.");
        let tensions = analyzer.identify_tensions(&[a, b, c]);
        assert_eq!(tensions.len(), 1);
        assert_eq!(tensions[0].first_section, 1);
        assert_eq!(tensions[0].second_section, 2);
        assert_eq!(tensions[0].description, "Individual privacy vs public accountability");
    }

    #[tokio::test]
    async fn test_enrichment_merges_without_duplicates() {
        let reply = r#"Here you go: {"misconceptions": ["Rights are not absolute - they can be limited in reasonable ways", "Privacy covers only the home"],
            "edge_cases": ["Public figures"], "related_concepts": ["Data protection"]}"#;
        let provider = Arc::new(MockProvider::with_reply(reply));
        let analyzer = InsightAnalyzer::with_provider(provider.clone());

        let insight = analyzer.analyze_section(&section(14, "Everyone has the right to privacy."), true).await;
        assert_eq!(provider.call_count(), 1);
        assert_eq!(insight.common_misconceptions.len(), 2);
        assert!(insight.common_misconceptions.contains(&"Privacy covers only the home".to_string()));
        assert_eq!(insight.edge_cases, vec!["Public figures".to_string()]);
        assert_eq!(insight.related_concepts, vec!["Data protection".to_string()]);
    }

    #[tokio::test]
    async fn test_enrichment_failure_keeps_heuristics() {
        let analyzer = InsightAnalyzer::with_provider(Arc::new(MockProvider::failing()));
        let heuristic = analyzer.analyze_section_lexical(&section(14, "Everyone has the right to privacy."));
        let enriched = analyzer.analyze_section(&section(14, "Everyone has the right to privacy."), true).await;
        assert_eq!(heuristic, enriched);

        let garbage = InsightAnalyzer::with_provider(Arc::new(MockProvider::with_reply("not json at all")));
        let parsed = garbage.analyze_section(&section(14, "Everyone has the right to privacy."), true).await;
        assert_eq!(heuristic, parsed);
    }

    #[tokio::test]
    async fn test_enrichment_disabled_skips_provider() {
        let provider = Arc::new(MockProvider::with_reply("{}"));
        let analyzer = InsightAnalyzer::with_provider(provider.clone());
        let result = analyzer
            .analyze_multiple_sections(&[section(1, "The right to privacy."), section(2, "Courts enforce rights.")], false)
            .await;
        assert_eq!(provider.call_count(), 0);
        assert_eq!(result.insights.len(), 2);
    }
}
