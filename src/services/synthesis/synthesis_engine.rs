// Synthesis Engine
// Turns analyzed insights into hook / body / closing content for one of seven modes

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::pick;
use crate::models::{
    Argument, Insight, NarrativeFrame, NarrativeStructure, SynthesisContext, SynthesisMode,
    SynthesizedContent,
};
use crate::services::text_processor::{clamp_unit, length_spread, lowercase_first};

const EXPLAIN_HOOKS: &[&str] = &[
    "Here's what {topic} actually means in plain terms:",
    "Breaking down {topic} - no jargon:",
    "The simplest way to understand {topic}:",
    "{topic} sounds complicated. It's not.",
];

const CONTRAST_HOOKS: &[&str] = &[
    "You'd think {topic} works one way. It doesn't.",
    "Common sense says one thing. {topic} says otherwise.",
    "What most people assume about {topic} vs reality:",
    "The gap between intuition and {topic}:",
];

const CHALLENGE_HOOKS: &[&str] = &[
    "Unpopular take on {topic}:",
    "What if we're thinking about {topic} all wrong?",
    "The uncomfortable truth about {topic}:",
    "Here's the {topic} conversation nobody wants to have:",
];

const APPLY_HOOKS: &[&str] = &[
    "How {topic} shows up in your daily life:",
    "That moment when {topic} actually matters:",
    "Real scenario: {topic} in action:",
    "When {topic} stops being abstract:",
];

const STORY_HOOKS: &[&str] = &[
    "Picture this:",
    "There's this moment when",
    "It starts like this:",
    "Small scene, big meaning:",
];

const MYTH_BUST_HOOKS: &[&str] = &[
    "Myth: {misconception}. Reality:",
    "Stop believing this about {topic}:",
    "That thing everyone gets wrong about {topic}:",
    "Let's kill a myth about {topic}:",
];

const IMPLICATIONS_HOOKS: &[&str] = &[
    "What {topic} really means for you:",
    "The ripple effects of {topic} nobody talks about:",
    "Follow the thread: {topic} leads to...",
    "Beyond the text: what {topic} actually changes:",
];

pub fn hook_templates(mode: SynthesisMode) -> &'static [&'static str] {
    match mode {
        SynthesisMode::Explain => EXPLAIN_HOOKS,
        SynthesisMode::Contrast => CONTRAST_HOOKS,
        SynthesisMode::Challenge => CHALLENGE_HOOKS,
        SynthesisMode::Apply => APPLY_HOOKS,
        SynthesisMode::Story => STORY_HOOKS,
        SynthesisMode::MythBust => MYTH_BUST_HOOKS,
        SynthesisMode::Implications => IMPLICATIONS_HOOKS,
    }
}

pub const CHALLENGE_ANGLES: &[&str] = &[
    "The limitation nobody mentions",
    "What this right actually costs",
    "Why this is harder than it sounds",
    "The trade-off hidden in plain sight",
    "Who this doesn't protect (and why)",
    "The enforcement gap",
    "Paper rights vs real rights",
];

/// Naive belief people bring to a provision, by trigger word. First match wins.
const EXPECTATIONS: &[(&str, &str)] = &[
    ("right", "rights are absolute and unlimited"),
    ("freedom", "freedom means no restrictions at all"),
    ("equality", "equality means treating everyone identically"),
    ("property", "property rights are unconditional"),
];

const DEFAULT_EXPECTATION: &str = "this provision is straightforward";

const CONTRAST_CLOSING: &str = "The gap matters more than you'd think.";
const CHALLENGE_CLOSING: &str = "Worth sitting with that for a moment.";
const IMPLICATIONS_CLOSING: &str = "Follow the thread far enough and the pattern becomes clear.";
const APPLY_REASSURANCE: &str = "When this comes up, know that this provision has your back.";
const MYTH_WHY_IT_MATTERS: &str = "Understanding the difference changes how you approach this.";

/// Append a period unless the text already ends a sentence.
fn as_sentence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.ends_with(['.', '!', '?', ':']) {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}

pub fn common_expectation(insight: &Insight) -> &'static str {
    let text = insight.section_text.to_lowercase();
    EXPECTATIONS
        .iter()
        .find(|(trigger, _)| text.contains(trigger))
        .map(|(_, belief)| *belief)
        .unwrap_or(DEFAULT_EXPECTATION)
}

/// 0.3 hook + 0.4 substantial body + 0.2 closing + 0.1 sentence-length spread.
pub fn calculate_synthesis_score(hook: &str, main_body: &str, closing: &str) -> f64 {
    let mut score = 0.0;
    if !hook.is_empty() {
        score += 0.3;
    }
    if main_body.chars().count() > 50 {
        score += 0.4;
    }
    if !closing.is_empty() {
        score += 0.2;
    }
    if length_spread(&format!("{} {} {}", hook, main_body, closing)) > 5 {
        score += 0.1;
    }
    clamp_unit(score)
}

/// Mode handler output before it is wrapped into `SynthesizedContent`.
struct Composition {
    hook: String,
    main_body: String,
    closing: String,
    perspective_angle: String,
}

type ModeHandler = fn(&mut SynthesisEngine, &SynthesisContext, &Insight) -> Composition;

fn handler_for(mode: SynthesisMode) -> ModeHandler {
    match mode {
        SynthesisMode::Explain => SynthesisEngine::compose_explanation,
        SynthesisMode::Contrast => SynthesisEngine::compose_contrast,
        SynthesisMode::Challenge => SynthesisEngine::compose_challenge,
        SynthesisMode::Apply => SynthesisEngine::compose_application,
        SynthesisMode::Story => SynthesisEngine::compose_story,
        SynthesisMode::MythBust => SynthesisEngine::compose_myth_bust,
        SynthesisMode::Implications => SynthesisEngine::compose_implications,
    }
}

pub struct SynthesisEngine {
    rng: StdRng,
}

impl Default for SynthesisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisEngine {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    fn choose(&mut self, items: &[String]) -> Option<String> {
        pick(&mut self.rng, items).cloned()
    }

    pub fn synthesize(&mut self, context: &SynthesisContext) -> SynthesizedContent {
        let Some(primary) = context.primary_insight() else {
            tracing::debug!(mode = context.mode.as_str(), "synthesis.insufficient");
            return SynthesizedContent::insufficient(context.mode);
        };

        let composition = handler_for(context.mode)(self, context, primary);

        let mut source_sections = vec![primary.section_number];
        for insight in &context.insights {
            if !source_sections.contains(&insight.section_number) {
                source_sections.push(insight.section_number);
            }
        }

        let raw_text = [&composition.hook, &composition.main_body, &composition.closing]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let synthesis_score =
            calculate_synthesis_score(&composition.hook, &composition.main_body, &composition.closing);

        tracing::info!(
            mode = context.mode.as_str(),
            primary = primary.section_number,
            sources = source_sections.len(),
            score = synthesis_score,
            "synthesis.completed"
        );

        SynthesizedContent {
            raw_text,
            mode: context.mode,
            hook: composition.hook,
            main_body: composition.main_body,
            closing: composition.closing,
            source_sections,
            synthesis_score,
            perspective_angle: composition.perspective_angle,
        }
    }

    /// Opener for the insight, drawn from the mode's template bank.
    pub fn generate_hook(&mut self, insight: &Insight, mode: SynthesisMode) -> String {
        let has_misconceptions = !insight.common_misconceptions.is_empty();
        let templates: Vec<&str> = hook_templates(mode)
            .iter()
            .copied()
            .filter(|t| has_misconceptions || !t.contains("{misconception}"))
            .collect();

        let template = pick(&mut self.rng, &templates).copied().unwrap_or("{topic}:");
        let mut hook = template.replace("{topic}", &insight.topic());
        if hook.contains("{misconception}") {
            let misconception = self.choose(&insight.common_misconceptions).unwrap_or_default();
            hook = hook.replace("{misconception}", misconception.trim_end_matches('.'));
        }
        hook
    }

    pub fn create_narrative_frame(&mut self, insight: &Insight, structure: Option<NarrativeStructure>) -> NarrativeFrame {
        let structure = match structure {
            Some(s) => s,
            None => *pick(&mut self.rng, &NarrativeStructure::ALL).unwrap_or(&NarrativeStructure::QuestionExplorationInsight),
        };
        let topic = insight.topic().to_lowercase();
        let core = (!insight.core_principle.is_empty()).then(|| insight.core_principle.clone());
        let practical = (!insight.practical_meaning.is_empty()).then(|| insight.practical_meaning.clone());

        match structure {
            NarrativeStructure::ProblemDiscoverySolution => NarrativeFrame {
                setup: format!("Someone runs into a problem with {}.", topic),
                tension: format!(
                    "They don't realize {}.",
                    practical.as_deref().map(|p| p.to_lowercase()).unwrap_or_else(|| "what their rights actually are".to_string())
                ),
                insight: format!("Then they discover: {}.", core.as_deref().unwrap_or("the provision that protects them")),
                resolution: "Suddenly the situation looks different.".to_string(),
            },
            NarrativeStructure::BeforeEventAfter => NarrativeFrame {
                setup: "Before understanding this provision, things seemed one way.".to_string(),
                tension: format!("Then came the realization about {}.", topic),
                insight: as_sentence(core.as_deref().unwrap_or("The principle changes the calculation")),
                resolution: "After: a clearer picture of what's actually at stake.".to_string(),
            },
            NarrativeStructure::OrdinaryDisruptionNewNormal => NarrativeFrame {
                setup: "Ordinary day. Nothing special happening.".to_string(),
                tension: format!("Until {} suddenly becomes relevant.", topic),
                insight: as_sentence(practical.as_deref().unwrap_or("This is when the provision matters")),
                resolution: "New normal: knowing this right exists and when to invoke it.".to_string(),
            },
            NarrativeStructure::QuestionExplorationInsight => NarrativeFrame {
                setup: format!("Question: What does {} actually mean?", topic),
                tension: "Dig past the surface language.".to_string(),
                insight: as_sentence(core.as_deref().unwrap_or("The deeper principle emerges")),
                resolution: as_sentence(practical.as_deref().unwrap_or("Now it makes practical sense")),
            },
        }
    }

    /// Thesis, supporting evidence and a conclusion for the insight.
    pub fn build_argument(&self, insight: &Insight, thesis: Option<&str>) -> Argument {
        let thesis = match thesis {
            Some(t) => t.to_string(),
            None if !insight.core_principle.is_empty() => {
                format!("The core of {}: {}", insight.topic(), insight.core_principle)
            }
            None => format!("{} matters more than commonly understood", insight.topic()),
        };

        let mut evidence = Vec::new();
        if !insight.practical_meaning.is_empty() {
            evidence.push(format!("Practical impact: {}", insight.practical_meaning));
        }
        evidence.extend(insight.implications.iter().take(2).cloned());
        if let Some(analogy) = insight.analogies.first() {
            evidence.push(format!("Comparison: {}", analogy));
        }

        let conclusion = match insight.tensions.first() {
            Some(tension) => format!("The balance to maintain: {}", tension),
            None => "Understanding this provision equips you to navigate real situations.".to_string(),
        };

        Argument { thesis, evidence, conclusion }
    }

    /// One-sentence take on the insight through the lens of `mode`.
    pub fn synthesize_perspective(&mut self, insight: &Insight, mode: SynthesisMode, scenario: Option<&str>) -> String {
        match mode {
            SynthesisMode::Challenge => {
                let angle = pick(&mut self.rng, CHALLENGE_ANGLES).copied().unwrap_or(CHALLENGE_ANGLES[0]);
                let mut parts = vec![format!("Looking at {} through the lens of '{}':", insight.topic(), angle)];
                if let Some(tension) = self.choose(&insight.tensions) {
                    parts.push(as_sentence(&tension));
                }
                if let Some(implication) = self.choose(&insight.implications) {
                    parts.push(as_sentence(&implication));
                }
                parts.join(" ")
            }
            SynthesisMode::Contrast => {
                let reality = [&insight.core_principle, &insight.practical_meaning]
                    .into_iter()
                    .find(|s| !s.is_empty())
                    .map(|s| as_sentence(s))
                    .unwrap_or_else(|| "Different.".to_string());
                format!("Expectation: {}. Reality: {}", common_expectation(insight), reality)
            }
            SynthesisMode::Apply => {
                let mut text = format!(
                    "In {}, {} means:",
                    scenario.unwrap_or("everyday situations"),
                    insight.topic().to_lowercase()
                );
                if !insight.practical_meaning.is_empty() {
                    text.push(' ');
                    text.push_str(&as_sentence(&insight.practical_meaning));
                }
                text
            }
            _ => [&insight.core_principle, &insight.practical_meaning]
                .into_iter()
                .find(|s| !s.is_empty())
                .cloned()
                .unwrap_or_else(|| insight.topic()),
        }
    }

    fn compose_explanation(&mut self, _context: &SynthesisContext, primary: &Insight) -> Composition {
        let hook = self.generate_hook(primary, SynthesisMode::Explain);

        let mut parts = Vec::new();
        if !primary.core_principle.is_empty() {
            parts.push(format!("At its core: {}.", primary.core_principle));
        }
        if !primary.practical_meaning.is_empty() {
            parts.push(format!("In practice, this means {}.", lowercase_first(&primary.practical_meaning)));
        }
        if let Some(analogy) = self.choose(&primary.analogies) {
            parts.push(as_sentence(&format!("Think of it {}", lowercase_first(&analogy))));
        }

        Composition {
            hook,
            main_body: parts.join(" "),
            closing: self.choose(&primary.implications).map(|i| as_sentence(&i)).unwrap_or_default(),
            perspective_angle: "explanation".to_string(),
        }
    }

    fn compose_contrast(&mut self, _context: &SynthesisContext, primary: &Insight) -> Composition {
        let hook = self.generate_hook(primary, SynthesisMode::Contrast);

        let mut parts = vec![format!("Most people assume {}.", common_expectation(primary))];
        if !primary.core_principle.is_empty() {
            parts.push(format!("But the actual principle: {}.", primary.core_principle));
        }
        if let Some(misconception) = self.choose(&primary.common_misconceptions) {
            parts.push(as_sentence(&format!("Key difference: {}", misconception)));
        }

        Composition {
            hook,
            main_body: parts.join(" "),
            closing: CONTRAST_CLOSING.to_string(),
            perspective_angle: "contrast".to_string(),
        }
    }

    fn compose_challenge(&mut self, _context: &SynthesisContext, primary: &Insight) -> Composition {
        let hook = self.generate_hook(primary, SynthesisMode::Challenge);
        let angle = pick(&mut self.rng, CHALLENGE_ANGLES).copied().unwrap_or(CHALLENGE_ANGLES[0]);

        let mut parts = Vec::new();
        if let Some(tension) = self.choose(&primary.tensions) {
            parts.push(as_sentence(&format!("Here's the tension: {}", tension)));
        } else if let Some(edge) = self.choose(&primary.edge_cases) {
            parts.push(as_sentence(&format!("Edge case to consider: {}", edge)));
        } else {
            parts.push(format!("The angle nobody discusses: {}.", angle.to_lowercase()));
        }
        if let Some(implication) = self.choose(&primary.implications) {
            parts.push(as_sentence(&implication));
        }

        Composition {
            hook,
            main_body: parts.join(" "),
            closing: CHALLENGE_CLOSING.to_string(),
            perspective_angle: angle.to_string(),
        }
    }

    fn compose_application(&mut self, context: &SynthesisContext, primary: &Insight) -> Composition {
        let hook = self.generate_hook(primary, SynthesisMode::Apply);
        let setting = context.scenario_category.as_deref().unwrap_or("daily life");

        let mut parts = Vec::new();
        if !primary.practical_meaning.is_empty() {
            parts.push(as_sentence(&format!("In {}: {}", setting, primary.practical_meaning)));
        }
        if let Some(analogy) = self.choose(&primary.analogies) {
            parts.push(as_sentence(&format!("Real example: {}", analogy)));
        }
        parts.push(APPLY_REASSURANCE.to_string());

        Composition {
            hook,
            main_body: parts.join(" "),
            closing: String::new(),
            perspective_angle: "application".to_string(),
        }
    }

    fn compose_story(&mut self, _context: &SynthesisContext, primary: &Insight) -> Composition {
        let frame = self.create_narrative_frame(primary, None);
        Composition {
            hook: frame.setup,
            main_body: format!("{} {}", frame.tension, frame.insight),
            closing: frame.resolution,
            perspective_angle: "narrative".to_string(),
        }
    }

    fn compose_myth_bust(&mut self, _context: &SynthesisContext, primary: &Insight) -> Composition {
        let hook = self.generate_hook(primary, SynthesisMode::MythBust);

        let mut parts = Vec::new();
        match self.choose(&primary.common_misconceptions) {
            Some(myth) => parts.push(as_sentence(&format!("The myth: {}", myth))),
            None => parts.push("The common assumption is wrong.".to_string()),
        }
        if !primary.core_principle.is_empty() {
            parts.push(as_sentence(&format!("The reality: {}", primary.core_principle)));
        }
        parts.push(MYTH_WHY_IT_MATTERS.to_string());

        Composition {
            hook,
            main_body: parts.join(" "),
            closing: String::new(),
            perspective_angle: "myth_bust".to_string(),
        }
    }

    fn compose_implications(&mut self, context: &SynthesisContext, primary: &Insight) -> Composition {
        let hook = self.generate_hook(primary, SynthesisMode::Implications);

        let mut parts: Vec<String> = primary.implications.iter().take(2).map(|i| as_sentence(i)).collect();
        if parts.is_empty() {
            parts.push("This provision creates ripple effects most people don't notice.".to_string());
        }

        let related = match self.choose(&primary.related_concepts) {
            Some(concept) => Some(concept),
            None => context
                .insights
                .iter()
                .find(|i| i.section_number != primary.section_number)
                .map(|i| i.topic()),
        };
        if let Some(concept) = related {
            parts.push(as_sentence(&format!("Connected to: {}", concept)));
        }

        Composition {
            hook,
            main_body: parts.join(" "),
            closing: IMPLICATIONS_CLOSING.to_string(),
            perspective_angle: "implications".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::INSUFFICIENT_INSIGHTS_TEXT;

    fn rich_insight(section: i32, quality: f64) -> Insight {
        Insight {
            section_number: section,
            section_title: "Privacy".to_string(),
            section_text: "Everyone has the right to privacy, subject to reasonable limits.".to_string(),
            core_principle: "Guarantees the right to privacy".to_string(),
            practical_meaning: "Shields individuals from harm or interference".to_string(),
            common_misconceptions: vec!["Rights are not absolute - they can be limited in reasonable ways".to_string()],
            tensions: vec!["Right is qualified by reasonable limitations".to_string()],
            analogies: vec!["Like curtains on your windows - you choose what others see".to_string()],
            implications: vec![
                "Citizens can exercise this right in their daily interactions".to_string(),
                "Government must respect and protect this entitlement".to_string(),
            ],
            quality_score: quality,
            ..Default::default()
        }
    }

    fn bare_insight(section: i32) -> Insight {
        Insight {
            section_number: section,
            section_title: "Flag".to_string(),
            section_text: "The flag has six colours.".to_string(),
            core_principle: "Establishes a framework or procedure".to_string(),
            quality_score: 0.25,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_insights_yield_sentinel_for_every_mode() {
        let mut engine = SynthesisEngine::with_seed(1);
        for mode in SynthesisMode::ALL {
            let content = engine.synthesize(&SynthesisContext::new(vec![], mode));
            assert_eq!(content.raw_text, INSUFFICIENT_INSIGHTS_TEXT);
            assert!(content.is_insufficient());
            assert_eq!(content.mode, mode);
            assert_eq!(content.synthesis_score, 0.0);
        }
    }

    #[test]
    fn test_every_mode_produces_bounded_content() {
        for seed in 0..10 {
            let mut engine = SynthesisEngine::with_seed(seed);
            for mode in SynthesisMode::ALL {
                let context = SynthesisContext::new(vec![bare_insight(2), rich_insight(14, 1.0)], mode);
                let content = engine.synthesize(&context);
                assert!(!content.hook.is_empty(), "{:?}", mode);
                assert!(!content.main_body.is_empty(), "{:?}", mode);
                assert_eq!(content.source_sections, vec![14, 2]);
                assert!((0.0..=1.0).contains(&content.synthesis_score));
                assert!(content.raw_text.starts_with(&content.hook));
                assert!(!content.raw_text.contains("{topic}"));
            }
        }
    }

    #[test]
    fn test_primary_is_highest_quality_first_on_tie() {
        let context = SynthesisContext::new(vec![rich_insight(1, 0.5), rich_insight(2, 0.9), rich_insight(3, 0.9)], SynthesisMode::Explain);
        assert_eq!(context.primary_insight().map(|i| i.section_number), Some(2));
    }

    #[test]
    fn test_explain_structure() {
        let mut engine = SynthesisEngine::with_seed(4);
        let content = engine.synthesize(&SynthesisContext::new(vec![rich_insight(14, 1.0)], SynthesisMode::Explain));
        assert!(content.main_body.starts_with("At its core: Guarantees the right to privacy."));
        assert!(content.main_body.contains("In practice, this means shields individuals"));
        assert!(content.main_body.contains("Think of it like curtains"));
        assert!(content.closing.starts_with("Citizens") || content.closing.starts_with("Government"));
        assert_eq!(content.perspective_angle, "explanation");
        assert!(content.synthesis_score >= 0.9 - 1e-9);
    }

    #[test]
    fn test_contrast_uses_expectation_table() {
        let mut engine = SynthesisEngine::with_seed(4);
        let content = engine.synthesize(&SynthesisContext::new(vec![rich_insight(14, 1.0)], SynthesisMode::Contrast));
        assert!(content.main_body.starts_with("Most people assume rights are absolute and unlimited."));
        assert_eq!(content.closing, CONTRAST_CLOSING);
        assert_eq!(common_expectation(&bare_insight(1)), DEFAULT_EXPECTATION);
    }

    #[test]
    fn test_challenge_falls_back_to_angle() {
        let mut engine = SynthesisEngine::with_seed(8);
        let content = engine.synthesize(&SynthesisContext::new(vec![bare_insight(3)], SynthesisMode::Challenge));
        assert!(content.main_body.starts_with("The angle nobody discusses:"));
        assert!(CHALLENGE_ANGLES.contains(&content.perspective_angle.as_str()));

        let mut edge = bare_insight(3);
        edge.edge_cases = vec!["Public figures".to_string()];
        let content = engine.synthesize(&SynthesisContext::new(vec![edge], SynthesisMode::Challenge));
        assert!(content.main_body.starts_with("Edge case to consider: Public figures."));

        let content = engine.synthesize(&SynthesisContext::new(vec![rich_insight(1, 1.0)], SynthesisMode::Challenge));
        assert!(content.main_body.starts_with("Here's the tension:"));
    }

    #[test]
    fn test_apply_uses_scenario_category() {
        let mut engine = SynthesisEngine::with_seed(2);
        let mut context = SynthesisContext::new(vec![rich_insight(14, 1.0)], SynthesisMode::Apply);
        context.scenario_category = Some("healthcare".to_string());
        let content = engine.synthesize(&context);
        assert!(content.main_body.starts_with("In healthcare: Shields individuals"));
        assert!(content.main_body.ends_with(APPLY_REASSURANCE));
        assert!(content.closing.is_empty());
    }

    #[test]
    fn test_myth_bust_without_misconceptions_skips_myth_template() {
        for seed in 0..30 {
            let mut engine = SynthesisEngine::with_seed(seed);
            let content = engine.synthesize(&SynthesisContext::new(vec![bare_insight(5)], SynthesisMode::MythBust));
            assert!(!content.hook.starts_with("Myth:"));
            assert!(!content.hook.contains("{misconception}"));
            assert!(content.main_body.starts_with("The common assumption is wrong."));
        }
    }

    #[test]
    fn test_myth_hook_substitutes_misconception() {
        let insight = rich_insight(14, 1.0);
        let mut seen_myth = false;
        for seed in 0..40 {
            let mut engine = SynthesisEngine::with_seed(seed);
            let hook = engine.generate_hook(&insight, SynthesisMode::MythBust);
            if hook.starts_with("Myth:") {
                seen_myth = true;
                assert!(hook.contains("Rights are not absolute"));
            }
        }
        assert!(seen_myth);
    }

    #[test]
    fn test_implications_related_concept_from_other_insight() {
        let mut engine = SynthesisEngine::with_seed(6);
        let content = engine.synthesize(&SynthesisContext::new(vec![rich_insight(14, 1.0), bare_insight(2)], SynthesisMode::Implications));
        assert!(content.main_body.contains("Connected to: Flag."));
        assert_eq!(content.closing, IMPLICATIONS_CLOSING);

        let mut with_concepts = rich_insight(14, 1.0);
        with_concepts.related_concepts = vec!["Data protection".to_string()];
        let content = engine.synthesize(&SynthesisContext::new(vec![with_concepts], SynthesisMode::Implications));
        assert!(content.main_body.contains("Connected to: Data protection."));
    }

    #[test]
    fn test_story_frame() {
        let mut engine = SynthesisEngine::with_seed(3);
        let frame = engine.create_narrative_frame(&rich_insight(14, 1.0), Some(NarrativeStructure::QuestionExplorationInsight));
        assert_eq!(frame.setup, "Question: What does privacy actually mean?");
        assert_eq!(frame.resolution, "Shields individuals from harm or interference.");
        assert_eq!(
            frame.to_narrative(),
            "Question: What does privacy actually mean? Dig past the surface language. Guarantees the right to privacy. Shields individuals from harm or interference."
        );

        let content = engine.synthesize(&SynthesisContext::new(vec![rich_insight(14, 1.0)], SynthesisMode::Story));
        assert_eq!(content.perspective_angle, "narrative");
        assert!(!content.closing.is_empty());
    }

    #[test]
    fn test_build_argument() {
        let engine = SynthesisEngine::with_seed(0);
        let argument = engine.build_argument(&rich_insight(14, 1.0), None);
        assert_eq!(argument.thesis, "The core of Privacy: Guarantees the right to privacy");
        assert_eq!(argument.evidence.len(), 4);
        assert!(argument.conclusion.starts_with("The balance to maintain:"));

        let custom = engine.build_argument(&bare_insight(1), Some("Flags matter"));
        assert_eq!(custom.thesis, "Flags matter");
        assert!(custom.evidence.is_empty());
    }

    #[test]
    fn test_synthesize_perspective() {
        let mut engine = SynthesisEngine::with_seed(12);
        let insight = rich_insight(14, 1.0);
        let contrast = engine.synthesize_perspective(&insight, SynthesisMode::Contrast, None);
        assert_eq!(contrast, "Expectation: rights are absolute and unlimited. Reality: Guarantees the right to privacy.");
        let apply = engine.synthesize_perspective(&insight, SynthesisMode::Apply, Some("the workplace"));
        assert!(apply.starts_with("In the workplace, privacy means:"));
        let challenge = engine.synthesize_perspective(&insight, SynthesisMode::Challenge, None);
        assert!(challenge.starts_with("Looking at Privacy through the lens of '"));
        assert_eq!(engine.synthesize_perspective(&insight, SynthesisMode::Story, None), insight.core_principle);
    }

    #[test]
    fn test_synthesis_score() {
        assert_eq!(calculate_synthesis_score("", "", ""), 0.0);
        let body = "This body is comfortably longer than fifty characters in total length.";
        assert!((calculate_synthesis_score("Hook:", body, "") - 0.7).abs() < 1e-9);
        let score = calculate_synthesis_score("Hi.", "One two three four five six seven eight nine ten eleven twelve.", "Bye.");
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_content() {
        let mut engine = SynthesisEngine::with_seed(1);
        let content = engine.synthesize(&SynthesisContext::new(vec![rich_insight(14, 1.0)], SynthesisMode::Contrast));
        assert_eq!(content.full_content(), content.raw_text);
        let sentinel = SynthesizedContent::insufficient(SynthesisMode::Apply);
        assert_eq!(sentinel.full_content(), INSUFFICIENT_INSIGHTS_TEXT);
    }
}
