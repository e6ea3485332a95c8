// Synthpost Data Models
// Shared types for the content synthesis pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ============ Document Input ============

/// A section as handed over by the document-retrieval collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSection {
    pub section_number: i32,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub subsections: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl DocumentSection {
    pub fn new(section_number: i32, title: &str, content: &str) -> Self {
        Self {
            section_number,
            title: Some(title.to_string()).filter(|t| !t.trim().is_empty()),
            content: content.to_string(),
            subsections: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Section {}", self.section_number))
    }
}

// ============ Insight ============

/// Structured meaning extracted from one document section.
///
/// Produced once by the analyzer and handed out by value; downstream
/// stages only ever borrow it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub section_number: i32,
    pub section_title: String,
    pub section_text: String,

    pub core_principle: String,
    pub practical_meaning: String,
    #[serde(default)]
    pub common_misconceptions: Vec<String>,
    #[serde(default)]
    pub edge_cases: Vec<String>,
    #[serde(default)]
    pub related_concepts: Vec<String>,

    #[serde(default)]
    pub tensions: Vec<String>,
    #[serde(default)]
    pub analogies: Vec<String>,
    #[serde(default)]
    pub implications: Vec<String>,

    pub quality_score: f64,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl Insight {
    /// An insight with identity fields only; every derived field empty.
    pub fn empty(section_number: i32, section_title: &str, section_text: &str) -> Self {
        Self {
            section_number,
            section_title: section_title.to_string(),
            section_text: section_text.to_string(),
            ..Default::default()
        }
    }

    pub fn has_sufficient_depth(&self) -> bool {
        let has_core = !self.core_principle.is_empty();
        let has_practical = !self.practical_meaning.is_empty();
        let has_details = !self.implications.is_empty() || !self.analogies.is_empty();
        has_core && has_practical && has_details
    }

    /// Title used as the `{topic}` of hooks and frames.
    pub fn topic(&self) -> String {
        if self.section_title.trim().is_empty() {
            format!("Section {}", self.section_number)
        } else {
            self.section_title.clone()
        }
    }

    /// Flat text rendering used when building completion prompts.
    pub fn to_prompt_context(&self) -> String {
        let mut out = format!("SECTION {}: {}", self.section_number, self.topic());
        if !self.core_principle.is_empty() {
            out.push_str(&format!("\nCORE PRINCIPLE: {}", self.core_principle));
        }
        if !self.practical_meaning.is_empty() {
            out.push_str(&format!("\nPRACTICAL MEANING: {}", self.practical_meaning));
        }
        let lists = [
            ("COMMON MISCONCEPTIONS", &self.common_misconceptions),
            ("TENSIONS", &self.tensions),
            ("ANALOGIES", &self.analogies),
            ("IMPLICATIONS", &self.implications),
        ];
        for (label, items) in lists {
            if !items.is_empty() {
                out.push_str(&format!("\n{}: {}", label, items.join("; ")));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Related,
    Supports,
}

/// A link between two analyzed sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsightConnection {
    pub source_section: i32,
    pub target_section: i32,
    pub connection_type: ConnectionType,
    pub description: String,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub insights: Vec<Insight>,
    pub connections: Vec<InsightConnection>,
    pub themes: Vec<String>,
    pub synthesis_potential: f64,
}

/// Two sections whose texts pull against each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TensionPair {
    pub first_section: i32,
    pub second_section: i32,
    pub description: String,
}

// ============ Scenarios ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCategory {
    Workplace,
    Family,
    Community,
    Commerce,
    Government,
    Digital,
    Healthcare,
    Education,
    Housing,
    Transport,
}

impl ScenarioCategory {
    pub const ALL: [ScenarioCategory; 10] = [
        ScenarioCategory::Workplace,
        ScenarioCategory::Family,
        ScenarioCategory::Community,
        ScenarioCategory::Commerce,
        ScenarioCategory::Government,
        ScenarioCategory::Digital,
        ScenarioCategory::Healthcare,
        ScenarioCategory::Education,
        ScenarioCategory::Housing,
        ScenarioCategory::Transport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workplace => "workplace",
            Self::Family => "family",
            Self::Community => "community",
            Self::Commerce => "commerce",
            Self::Government => "government",
            Self::Digital => "digital",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Housing => "housing",
            Self::Transport => "transport",
        }
    }

    pub fn from_name(val: &str) -> Option<Self> {
        let wanted = val.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == wanted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub category: ScenarioCategory,
    pub setup: String,
    pub characters: Vec<String>,
    pub setting: String,
    pub conflict: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Scenario {
    pub fn to_prompt_context(&self) -> String {
        let mut parts = vec![
            format!("SCENARIO ({}):", self.category.as_str()),
            format!("Setting: {}", self.setting),
            format!("Situation: {}", self.setup),
        ];
        if let Some(conflict) = &self.conflict {
            parts.push(format!("Issue: {}", conflict));
        }
        parts.join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemporalHook {
    pub date: NaiveDate,
    pub occasion: String,
    pub relevance: String,
    pub suggested_angle: String,
}

// ============ Synthesis ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMode {
    Explain,
    Contrast,
    Challenge,
    Apply,
    Story,
    MythBust,
    Implications,
}

impl SynthesisMode {
    pub const ALL: [SynthesisMode; 7] = [
        SynthesisMode::Explain,
        SynthesisMode::Contrast,
        SynthesisMode::Challenge,
        SynthesisMode::Apply,
        SynthesisMode::Story,
        SynthesisMode::MythBust,
        SynthesisMode::Implications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explain => "explain",
            Self::Contrast => "contrast",
            Self::Challenge => "challenge",
            Self::Apply => "apply",
            Self::Story => "story",
            Self::MythBust => "myth_bust",
            Self::Implications => "implications",
        }
    }

    /// Lenient lookup; anything unrecognized falls back to `Explain`.
    pub fn from_name(val: &str) -> Self {
        let wanted = val.trim().to_lowercase().replace(['-', ' '], "_");
        match wanted.as_str() {
            "contrast" => Self::Contrast,
            "challenge" => Self::Challenge,
            "apply" => Self::Apply,
            "story" => Self::Story,
            "myth_bust" | "mythbust" => Self::MythBust,
            "implications" => Self::Implications,
            _ => Self::Explain,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisContext {
    pub insights: Vec<Insight>,
    pub mode: SynthesisMode,
    #[serde(default)]
    pub scenario_category: Option<String>,
    #[serde(default)]
    pub persona_description: Option<String>,
}

impl SynthesisContext {
    pub fn new(insights: Vec<Insight>, mode: SynthesisMode) -> Self {
        Self {
            insights,
            mode,
            scenario_category: None,
            persona_description: None,
        }
    }

    /// Highest-quality insight; the first one wins ties.
    pub fn primary_insight(&self) -> Option<&Insight> {
        let mut best: Option<&Insight> = None;
        for insight in &self.insights {
            match best {
                Some(b) if insight.quality_score <= b.quality_score => {}
                _ => best = Some(insight),
            }
        }
        best
    }
}

pub const INSUFFICIENT_INSIGHTS_TEXT: &str = "Insufficient insights for synthesis";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedContent {
    pub raw_text: String,
    pub mode: SynthesisMode,
    pub hook: String,
    pub main_body: String,
    pub closing: String,
    pub source_sections: Vec<i32>,
    pub synthesis_score: f64,
    pub perspective_angle: String,
}

impl SynthesizedContent {
    /// Sentinel returned when there is nothing to synthesize from.
    pub fn insufficient(mode: SynthesisMode) -> Self {
        Self {
            raw_text: INSUFFICIENT_INSIGHTS_TEXT.to_string(),
            mode,
            hook: String::new(),
            main_body: String::new(),
            closing: String::new(),
            source_sections: Vec::new(),
            synthesis_score: 0.0,
            perspective_angle: String::new(),
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.raw_text == INSUFFICIENT_INSIGHTS_TEXT && self.source_sections.is_empty()
    }

    pub fn full_content(&self) -> String {
        if !self.hook.is_empty() && !self.main_body.is_empty() {
            let mut parts = vec![self.hook.as_str(), self.main_body.as_str()];
            if !self.closing.is_empty() {
                parts.push(self.closing.as_str());
            }
            return parts.join(" ");
        }
        self.raw_text.clone()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeStructure {
    ProblemDiscoverySolution,
    BeforeEventAfter,
    OrdinaryDisruptionNewNormal,
    QuestionExplorationInsight,
}

impl NarrativeStructure {
    pub const ALL: [NarrativeStructure; 4] = [
        NarrativeStructure::ProblemDiscoverySolution,
        NarrativeStructure::BeforeEventAfter,
        NarrativeStructure::OrdinaryDisruptionNewNormal,
        NarrativeStructure::QuestionExplorationInsight,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeFrame {
    pub setup: String,
    pub tension: String,
    pub insight: String,
    pub resolution: String,
}

impl NarrativeFrame {
    pub fn to_narrative(&self) -> String {
        format!("{} {} {} {}", self.setup, self.tension, self.insight, self.resolution)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub thesis: String,
    pub evidence: Vec<String>,
    pub conclusion: String,
}

// ============ Personas ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToneType {
    Conversational,
    Thoughtful,
    Energetic,
    Serious,
    Warm,
    Direct,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RhetoricalStyle {
    Socratic,
    Narrative,
    Direct,
    Exploratory,
    Provocative,
}

impl RhetoricalStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Socratic => "socratic",
            Self::Narrative => "narrative",
            Self::Direct => "direct",
            Self::Exploratory => "exploratory",
            Self::Provocative => "provocative",
        }
    }
}

impl ToneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversational => "conversational",
            Self::Thoughtful => "thoughtful",
            Self::Energetic => "energetic",
            Self::Serious => "serious",
            Self::Warm => "warm",
            Self::Direct => "direct",
        }
    }
}

/// A named bundle of writing preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Catalog key, e.g. `conversational`.
    pub key: String,
    /// Display name, e.g. `Conversational Educator`.
    pub name: String,
    pub tone: ToneType,
    pub formality_level: f64,
    pub uses_contractions: bool,
    pub rhetorical_style: RhetoricalStyle,
    pub preferred_vocabulary: Vec<String>,
    pub avoided_vocabulary: Vec<String>,
    pub prefers_short_sentences: bool,
    pub uses_rhetorical_questions: bool,
    pub uses_em_dashes: bool,
    pub uses_parentheticals: bool,
    pub varies_sentence_starts: bool,
}

impl Persona {
    pub fn to_prompt_description(&self) -> String {
        let formality = if self.formality_level > 0.6 {
            "formal"
        } else if self.formality_level < 0.4 {
            "casual"
        } else {
            "balanced"
        };
        let mut parts = vec![
            format!("Voice: {}", self.tone.as_str()),
            format!("Formality: {}", formality),
            format!("Style: {}", self.rhetorical_style.as_str()),
        ];
        if self.uses_contractions {
            parts.push("Uses contractions naturally".to_string());
        } else {
            parts.push("Avoids contractions".to_string());
        }
        if !self.preferred_vocabulary.is_empty() {
            let words: Vec<&str> = self.preferred_vocabulary.iter().take(5).map(String::as_str).collect();
            parts.push(format!("Characteristic vocabulary: {}", words.join(", ")));
        }
        if !self.avoided_vocabulary.is_empty() {
            let words: Vec<&str> = self.avoided_vocabulary.iter().take(5).map(String::as_str).collect();
            parts.push(format!("Never uses: {}", words.join(", ")));
        }
        parts.join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HumanizationResult {
    pub original: String,
    pub transformed: String,
    pub changes_made: Vec<String>,
    pub persona_applied: String,
}

// ============ AI Pattern Analysis ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    ClicheOpener,
    ClichePhrase,
    Hedging,
    ListStructure,
    CorporateSpeak,
    FillerWords,
}

impl PatternCategory {
    pub fn severity(&self) -> f64 {
        match self {
            Self::ClicheOpener => 0.8,
            Self::ClichePhrase => 0.6,
            Self::Hedging => 0.4,
            Self::ListStructure => 0.5,
            Self::CorporateSpeak => 0.7,
            Self::FillerWords => 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternSpan {
    /// UTF-8 byte offset (0-based) into the analyzed text.
    pub start: usize,
    /// UTF-8 byte offset (0-based, end-exclusive) into the analyzed text.
    pub end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPattern {
    pub category: PatternCategory,
    pub matched_text: String,
    pub span: PatternSpan,
    pub severity: f64,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AIPatternReport {
    pub content: String,
    pub patterns: Vec<DetectedPattern>,
    pub ai_score: f64,
    pub sentence_variance: f64,
    pub suggestions: Vec<String>,
}

impl AIPatternReport {
    pub fn is_human_like(&self) -> bool {
        self.ai_score < 0.5
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn count_of(&self, category: PatternCategory) -> usize {
        self.patterns.iter().filter(|p| p.category == category).count()
    }
}

// ============ Pipeline Output ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionResult {
    pub run_id: Uuid,
    pub content: SynthesizedContent,
    pub ai_score: f64,
    pub humanized: bool,
    /// Number of scoring passes performed.
    pub attempts: u32,
    pub report: AIPatternReport,
    #[serde(default)]
    pub changes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(hook: &str, body: &str, closing: &str) -> SynthesizedContent {
        SynthesizedContent {
            raw_text: "raw".to_string(),
            mode: SynthesisMode::Explain,
            hook: hook.to_string(),
            main_body: body.to_string(),
            closing: closing.to_string(),
            source_sections: vec![1],
            synthesis_score: 0.5,
            perspective_angle: "basic".to_string(),
        }
    }

    #[test]
    fn test_mode_from_name_is_lenient() {
        assert_eq!(SynthesisMode::from_name("Challenge"), SynthesisMode::Challenge);
        assert_eq!(SynthesisMode::from_name(" MYTH-BUST "), SynthesisMode::MythBust);
        assert_eq!(SynthesisMode::from_name("myth bust"), SynthesisMode::MythBust);
        assert_eq!(SynthesisMode::from_name("sonnet"), SynthesisMode::Explain);
        assert_eq!(SynthesisMode::from_name(""), SynthesisMode::Explain);
        for mode in SynthesisMode::ALL {
            assert_eq!(SynthesisMode::from_name(mode.as_str()), mode);
        }
        assert_eq!(serde_json::to_string(&SynthesisMode::MythBust).unwrap(), "\"myth_bust\"");
    }

    #[test]
    fn test_category_from_name() {
        assert_eq!(ScenarioCategory::from_name(" Housing "), Some(ScenarioCategory::Housing));
        assert_eq!(ScenarioCategory::from_name("space travel"), None);
        for category in ScenarioCategory::ALL {
            assert_eq!(ScenarioCategory::from_name(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_full_content() {
        assert_eq!(content("Hook.", "Body.", "Close.").full_content(), "Hook. Body. Close.");
        assert_eq!(content("Hook.", "Body.", "").full_content(), "Hook. Body.");
        assert_eq!(content("", "Body.", "Close.").full_content(), "raw");
        assert_eq!(content("Hook.", "", "Close.").full_content(), "raw");
    }

    #[test]
    fn test_insufficient_sentinel() {
        let sentinel = SynthesizedContent::insufficient(SynthesisMode::Story);
        assert!(sentinel.is_insufficient());
        assert_eq!(sentinel.full_content(), INSUFFICIENT_INSIGHTS_TEXT);
        assert!(!content("", "", "").is_insufficient());
    }

    #[test]
    fn test_primary_insight_prefers_first_on_ties() {
        let mut a = Insight::empty(1, "A", "a");
        a.quality_score = 0.4;
        let mut b = Insight::empty(2, "B", "b");
        b.quality_score = 0.7;
        let mut c = Insight::empty(3, "C", "c");
        c.quality_score = 0.7;

        let context = SynthesisContext::new(vec![a, b, c], SynthesisMode::Explain);
        assert_eq!(context.primary_insight().map(|i| i.section_number), Some(2));
        assert!(SynthesisContext::new(vec![], SynthesisMode::Explain).primary_insight().is_none());
    }

    #[test]
    fn test_insight_topic_and_section_title_fallbacks() {
        let insight = Insight::empty(7, "  ", "text");
        assert_eq!(insight.topic(), "Section 7");
        assert!(insight.to_prompt_context().starts_with("SECTION 7: Section 7"));
        assert_eq!(DocumentSection::new(3, "", "x").display_title(), "Section 3");
    }
}
