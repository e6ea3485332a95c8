// Prompt Variants
// Rotating openings, thread shapes and style hints for generation prompts

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::pick;
use crate::models::SynthesisMode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OpeningStyle {
    SurprisingFact,
    Question,
    Scenario,
    Misconception,
    Provocative,
    Observation,
    Contrast,
}

impl OpeningStyle {
    pub const ALL: [OpeningStyle; 7] = [
        OpeningStyle::SurprisingFact,
        OpeningStyle::Question,
        OpeningStyle::Scenario,
        OpeningStyle::Misconception,
        OpeningStyle::Provocative,
        OpeningStyle::Observation,
        OpeningStyle::Contrast,
    ];

    fn templates(self) -> &'static [&'static str] {
        match self {
            OpeningStyle::SurprisingFact => &[
                "Most people don't realize: {insight}",
                "Here's what surprised me about {topic}: {insight}",
                "The part nobody talks about: {insight}",
                "Little-known fact about {topic}: {insight}",
                "Plot twist about {topic}: {insight}",
            ],
            OpeningStyle::Question => &[
                "Ever wondered why {topic} works this way?",
                "What happens when {scenario}?",
                "Why does {topic} matter more than you think?",
                "When was the last time you thought about {topic}?",
                "What if I told you {insight}?",
            ],
            OpeningStyle::Scenario => &[
                "You're in {scenario}. Here's what protects you:",
                "Picture this: {scenario}",
                "Imagine: {scenario}",
                "Real situation: {scenario}",
                "It happens more than you'd think: {scenario}",
            ],
            OpeningStyle::Misconception => &[
                "Common myth about {topic}: {misconception}. Reality:",
                "What people get wrong about {topic}:",
                "Everyone assumes {misconception}. Here's the truth:",
                "Stop believing this about {topic}:",
                "The {topic} misconception that won't die:",
            ],
            OpeningStyle::Provocative => &[
                "Hot take on {topic}:",
                "Unpopular opinion: {topic} isn't what you think",
                "Let's be uncomfortable about {topic} for a second:",
                "The {topic} conversation no one wants to have:",
                "Brace yourself: {insight}",
            ],
            OpeningStyle::Observation => &[
                "Something I've noticed about {topic}:",
                "Been thinking about {topic} lately. Here's what stands out:",
                "Small observation with big implications about {topic}:",
                "Quiet truth about {topic}:",
                "The thing about {topic} that keeps coming up:",
            ],
            OpeningStyle::Contrast => &[
                "On paper: {expectation}. In reality: {reality}",
                "What we say about {topic} vs what actually happens:",
                "The gap between the ideal and reality of {topic}:",
                "{topic} in theory vs {topic} in practice:",
                "Expectation: {expectation}. Reality: {reality}",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStructure {
    ProblemSolution,
    MythReality,
    StoryArc,
    Countdown,
    Layers,
    Journey,
    Comparison,
}

impl ThreadStructure {
    pub const ALL: [ThreadStructure; 7] = [
        ThreadStructure::ProblemSolution,
        ThreadStructure::MythReality,
        ThreadStructure::StoryArc,
        ThreadStructure::Countdown,
        ThreadStructure::Layers,
        ThreadStructure::Journey,
        ThreadStructure::Comparison,
    ];

    pub fn template(self) -> ThreadTemplate {
        let (intro, beats, tone): (&'static str, &'static [&'static str], &'static str) = match self {
            ThreadStructure::ProblemSolution => (
                "There's a problem with how we think about {topic}. Thread 🧵",
                &[
                    "THE PROBLEM: {problem_statement}",
                    "WHY IT MATTERS: {impact}",
                    "WHAT MOST PEOPLE MISS: {hidden_aspect}",
                    "THE SOLUTION: {solution}",
                    "KEY TAKEAWAY: {takeaway}",
                ],
                "Analytical and constructive",
            ),
            ThreadStructure::MythReality => (
                "5 myths about {topic} that need to die. Thread 🧵",
                &[
                    "MYTH 1: {myth}. REALITY: {reality}",
                    "MYTH 2: {myth}. REALITY: {reality}",
                    "MYTH 3: {myth}. REALITY: {reality}",
                    "MYTH 4: {myth}. REALITY: {reality}",
                    "MYTH 5: {myth}. REALITY: {reality}",
                    "WHY THESE MYTHS PERSIST: {explanation}",
                ],
                "Corrective but not condescending",
            ),
            ThreadStructure::StoryArc => (
                "Let me tell you about {topic}. A thread 🧵",
                &[
                    "THE BEGINNING: {setup}",
                    "THE TENSION: {conflict}",
                    "THE TURNING POINT: {pivot}",
                    "THE RESOLUTION: {resolution}",
                    "THE LESSON: {lesson}",
                ],
                "Narrative and engaging",
            ),
            ThreadStructure::Countdown => (
                "5 things everyone should know about {topic}. Thread 🧵",
                &[
                    "5. {point}",
                    "4. {point}",
                    "3. {point}",
                    "2. {point}",
                    "1. The most important: {key_point}",
                    "BONUS: {bonus}",
                ],
                "Punchy and memorable",
            ),
            ThreadStructure::Layers => (
                "Let's go deeper on {topic}. Thread 🧵",
                &[
                    "SURFACE LEVEL: What most people see about {topic}",
                    "ONE LAYER DOWN: The mechanics behind it",
                    "DEEPER STILL: The tensions and trade-offs",
                    "THE FOUNDATION: The core principle",
                    "THE IMPLICATION: What this means for you",
                ],
                "Progressive revelation",
            ),
            ThreadStructure::Journey => (
                "Come with me on a journey through {topic}. Thread 🧵",
                &[
                    "WHERE WE START: Common understanding of {topic}",
                    "FIRST STOP: The interesting twist",
                    "DETOUR: What people often miss",
                    "THE DESTINATION: Deeper understanding",
                    "LOOKING BACK: How the view has changed",
                ],
                "Exploratory and inviting",
            ),
            ThreadStructure::Comparison => (
                "{topic}: Expectation vs Reality. Thread 🧵",
                &[
                    "What people EXPECT: {expectation}",
                    "What actually HAPPENS: {reality}",
                    "WHY the gap exists: {explanation}",
                    "What this MEANS: {implication}",
                    "How to BRIDGE the gap: {action}",
                ],
                "Clarifying and practical",
            ),
        };
        ThreadTemplate { structure: self, intro, beats, tone }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadTemplate {
    pub structure: ThreadStructure,
    pub intro: &'static str,
    pub beats: &'static [&'static str],
    pub tone: &'static str,
}

impl ThreadTemplate {
    pub fn intro_for(&self, topic: &str) -> String {
        self.intro.replace("{topic}", topic)
    }
}

const CLOSINGS: &[&str] = &[
    "Something to sit with.",
    "Worth thinking about.",
    "That's the thing about {topic}.",
    "More than you expected from {topic}, right?",
    "The more you know.",
    "Food for thought on {topic}.",
    "And that changes things.",
    "{topic}. Not so simple after all.",
    "Now you know.",
    "Pass it on.",
    "Thoughts?",
    "Agree or disagree?",
];

const TRANSITIONS: &[&str] = &[
    "But here's the thing:",
    "And it gets more interesting:",
    "Plot twist:",
    "Here's where it gets real:",
    "The kicker?",
    "Now, consider this:",
    "But wait:",
    "Here's the part nobody mentions:",
    "The nuance:",
    "Digging deeper:",
];

pub const HUMANIZATION_HINTS: &[&str] = &[
    "Write like you're explaining to a smart friend over coffee",
    "Use contractions naturally - 'it's' not 'it is'",
    "Start with a specific observation, not a general statement",
    "Avoid 'First... Second... Third...' structure",
    "Mix short punchy sentences with longer flowing ones",
    "Don't start with 'It's important to note' or similar cliches",
    "End with something thought-provoking, not a generic CTA",
    "Use one dash or parenthetical for texture",
    "Don't use 'delve', 'unpack', 'robust', or 'leverage'",
    "Sound like a real person, not a press release",
];

/// Values substituted into opening templates. Empty fields are treated as missing.
#[derive(Debug, Clone, Default)]
pub struct OpeningParams<'a> {
    pub topic: &'a str,
    pub insight: &'a str,
    pub scenario: &'a str,
    pub misconception: &'a str,
    pub expectation: &'a str,
    pub reality: &'a str,
}

impl<'a> OpeningParams<'a> {
    pub fn topic(topic: &'a str) -> Self {
        Self { topic, ..Default::default() }
    }

    fn slots(&self) -> [(&'static str, &'a str); 6] {
        [
            ("{topic}", self.topic),
            ("{insight}", self.insight),
            ("{scenario}", self.scenario),
            ("{misconception}", self.misconception),
            ("{expectation}", self.expectation),
            ("{reality}", self.reality),
        ]
    }

    /// Every placeholder in `template` has a non-empty value.
    fn fills(&self, template: &str) -> bool {
        self.slots()
            .iter()
            .all(|(slot, value)| !template.contains(slot) || !value.is_empty())
    }

    fn render(&self, template: &str) -> String {
        let insight = if self.insight.is_empty() { self.topic } else { self.insight };
        let mut out = template.to_string();
        for (slot, value) in self.slots() {
            let value = if slot == "{insight}" { insight } else { value };
            out = out.replace(slot, value);
        }
        out
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariant {
    pub name: String,
    pub opening: String,
    pub structure_hint: Vec<String>,
    pub tone_guidance: String,
    pub closing: String,
}

fn mode_mapping(mode: SynthesisMode) -> (OpeningStyle, ThreadStructure) {
    match mode {
        SynthesisMode::Explain => (OpeningStyle::Observation, ThreadStructure::Layers),
        SynthesisMode::Contrast => (OpeningStyle::Contrast, ThreadStructure::Comparison),
        SynthesisMode::Challenge => (OpeningStyle::Provocative, ThreadStructure::MythReality),
        SynthesisMode::Apply => (OpeningStyle::Scenario, ThreadStructure::ProblemSolution),
        SynthesisMode::Story => (OpeningStyle::Scenario, ThreadStructure::StoryArc),
        SynthesisMode::MythBust => (OpeningStyle::Misconception, ThreadStructure::MythReality),
        SynthesisMode::Implications => (OpeningStyle::SurprisingFact, ThreadStructure::Layers),
    }
}

/// Randomized prompt fragments that avoid repeating themselves within one instance.
pub struct PromptVariants {
    rng: StdRng,
    used_openings: HashMap<OpeningStyle, HashSet<&'static str>>,
    used_structures: HashSet<ThreadStructure>,
}

impl Default for PromptVariants {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptVariants {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            used_openings: HashMap::new(),
            used_structures: HashSet::new(),
        }
    }

    /// An opening line in `style` (random when absent). Templates whose
    /// placeholders cannot be filled from `params` are skipped while others remain.
    pub fn opening(&mut self, style: Option<OpeningStyle>, params: &OpeningParams) -> String {
        let style = match style {
            Some(s) => s,
            None => *pick(&mut self.rng, &OpeningStyle::ALL).unwrap_or(&OpeningStyle::Observation),
        };
        let templates = style.templates();

        let used = self.used_openings.entry(style).or_default();
        let mut available: Vec<&'static str> = templates.iter().copied().filter(|t| !used.contains(t)).collect();
        if available.is_empty() {
            used.clear();
            available = templates.to_vec();
        }

        let fillable: Vec<&'static str> = available.iter().copied().filter(|t| params.fills(t)).collect();
        let candidates = if fillable.is_empty() { available } else { fillable };

        let template = pick(&mut self.rng, &candidates).copied().unwrap_or(templates[0]);
        self.used_openings.entry(style).or_default().insert(template);

        params.render(template)
    }

    pub fn thread_structure(&mut self, structure: Option<ThreadStructure>, avoid_recent: bool) -> ThreadTemplate {
        let structure = match structure {
            Some(s) => s,
            None => {
                let mut available: Vec<ThreadStructure> = if avoid_recent {
                    ThreadStructure::ALL
                        .iter()
                        .copied()
                        .filter(|s| !self.used_structures.contains(s))
                        .collect()
                } else {
                    ThreadStructure::ALL.to_vec()
                };
                if available.is_empty() {
                    self.used_structures.clear();
                    available = ThreadStructure::ALL.to_vec();
                }
                *pick(&mut self.rng, &available).unwrap_or(&ThreadStructure::Layers)
            }
        };

        self.used_structures.insert(structure);
        structure.template()
    }

    pub fn closing(&mut self, topic: &str) -> String {
        let closing = pick(&mut self.rng, CLOSINGS).copied().unwrap_or(CLOSINGS[0]);
        closing.replace("{topic}", topic)
    }

    pub fn transition(&mut self) -> &'static str {
        pick(&mut self.rng, TRANSITIONS).copied().unwrap_or(TRANSITIONS[0])
    }

    /// Up to `count` distinct hints.
    pub fn humanization_hints(&mut self, count: usize) -> Vec<&'static str> {
        let mut hints = HUMANIZATION_HINTS.to_vec();
        hints.shuffle(&mut self.rng);
        hints.truncate(count.min(HUMANIZATION_HINTS.len()));
        hints
    }

    pub fn variant_for_mode(&mut self, mode: SynthesisMode, topic: &str) -> PromptVariant {
        let (style, structure) = mode_mapping(mode);
        let thread = self.thread_structure(Some(structure), true);

        PromptVariant {
            name: format!("{}_variant", mode.as_str()),
            opening: self.opening(Some(style), &OpeningParams::topic(topic)),
            structure_hint: thread.beats.iter().map(|b| b.to_string()).collect(),
            tone_guidance: thread.tone.to_string(),
            closing: self.closing(topic),
        }
    }

    /// Style-guidance block appended to a generation prompt.
    pub fn synthesis_prompt_additions(&mut self, mode: SynthesisMode, topic: &str) -> String {
        let variant = self.variant_for_mode(mode, topic);
        let hints = self.humanization_hints(3);

        let mut lines = vec![
            String::new(),
            "## Writing Style Guidance:".to_string(),
            format!("- Tone: {}", variant.tone_guidance),
            format!("- Consider opening with: '{}'", variant.opening),
            format!("- Closing style: {}", variant.closing),
            String::new(),
            "## Human-Like Writing Tips:".to_string(),
        ];
        lines.extend(hints.iter().map(|h| format!("- {}", h)));
        lines.join("\n")
    }

    pub fn clear(&mut self) {
        self.used_openings.clear();
        self.used_structures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_style_has_five_templates() {
        for style in OpeningStyle::ALL {
            assert_eq!(style.templates().len(), 5);
        }
        for structure in ThreadStructure::ALL {
            let template = structure.template();
            assert!(template.intro.contains("{topic}"));
            assert!(template.beats.len() >= 5);
        }
    }

    #[test]
    fn test_openings_do_not_repeat_until_exhausted() {
        let mut variants = PromptVariants::with_seed(17);
        let params = OpeningParams::topic("privacy");
        let mut seen = HashSet::new();
        for _ in 0..5 {
            assert!(seen.insert(variants.opening(Some(OpeningStyle::Observation), &params)));
        }
        let sixth = variants.opening(Some(OpeningStyle::Observation), &params);
        assert!(seen.contains(&sixth));
    }

    #[test]
    fn test_opening_prefers_fillable_templates() {
        for seed in 0..20 {
            let mut variants = PromptVariants::with_seed(seed);
            let out = variants.opening(Some(OpeningStyle::Question), &OpeningParams::topic("voting"));
            assert!(!out.contains('{'));
            assert!(!out.contains("when ?"));
        }
    }

    #[test]
    fn test_opening_renders_all_params() {
        let mut variants = PromptVariants::with_seed(2);
        let params = OpeningParams {
            topic: "property",
            expectation: "ownership is absolute",
            reality: "it has limits",
            ..Default::default()
        };
        for _ in 0..5 {
            let out = variants.opening(Some(OpeningStyle::Contrast), &params);
            assert!(!out.contains('{'), "{}", out);
        }
    }

    #[test]
    fn test_thread_structures_rotate() {
        let mut variants = PromptVariants::with_seed(4);
        let picked: HashSet<ThreadStructure> = (0..7).map(|_| variants.thread_structure(None, true).structure).collect();
        assert_eq!(picked.len(), 7);
        let explicit = variants.thread_structure(Some(ThreadStructure::Countdown), true);
        assert_eq!(explicit.structure, ThreadStructure::Countdown);
        assert_eq!(explicit.intro_for("rights"), "5 things everyone should know about rights. Thread 🧵");
    }

    #[test]
    fn test_hints_are_distinct() {
        let mut variants = PromptVariants::with_seed(8);
        let hints = variants.humanization_hints(4);
        assert_eq!(hints.len(), 4);
        assert_eq!(hints.iter().collect::<HashSet<_>>().len(), 4);
        assert_eq!(variants.humanization_hints(50).len(), HUMANIZATION_HINTS.len());
    }

    #[test]
    fn test_closing_and_transition() {
        let mut variants = PromptVariants::with_seed(1);
        for _ in 0..20 {
            assert!(!variants.closing("equality").contains("{topic}"));
            assert!(TRANSITIONS.contains(&variants.transition()));
        }
    }

    #[test]
    fn test_variant_for_mode() {
        let mut variants = PromptVariants::with_seed(6);
        let variant = variants.variant_for_mode(SynthesisMode::MythBust, "privacy");
        assert_eq!(variant.name, "myth_bust_variant");
        assert_eq!(variant.tone_guidance, "Corrective but not condescending");
        assert!(!variant.opening.contains('{'));

        let additions = variants.synthesis_prompt_additions(SynthesisMode::Contrast, "equality");
        assert!(additions.contains("## Writing Style Guidance:"));
        assert!(additions.contains("- Tone: Clarifying and practical"));
        assert_eq!(additions.lines().filter(|l| l.starts_with("- ")).count(), 6);
    }

    #[test]
    fn test_clear_resets_history() {
        let mut variants = PromptVariants::with_seed(3);
        variants.opening(Some(OpeningStyle::Provocative), &OpeningParams::topic("x"));
        variants.thread_structure(None, true);
        variants.clear();
        assert!(variants.used_openings.is_empty());
        assert!(variants.used_structures.is_empty());
    }
}
