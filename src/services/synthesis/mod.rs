// Synthesis Pipeline
// Insight extraction, scenario matching, composition and humanization

pub mod ai_pattern_filter;
pub mod insight_analyzer;
pub mod orchestrator;
pub mod persona_writer;
pub mod prompt_variants;
pub mod scenario_generator;
pub mod synthesis_engine;

use rand::rngs::StdRng;
use rand::Rng;

pub use ai_pattern_filter::{cliche_catalog, sentence_variance, AIPatternFilter, ClicheCatalog};
pub use insight_analyzer::{extract_keywords, InsightAnalyzer};
pub use orchestrator::Orchestrator;
pub use persona_writer::{find_persona, list_personas, persona_by_name, personas, PersonaWriter};
pub use prompt_variants::{OpeningParams, OpeningStyle, PromptVariant, PromptVariants, ThreadStructure, ThreadTemplate};
pub use scenario_generator::ScenarioGenerator;
pub use synthesis_engine::{calculate_synthesis_score, SynthesisEngine};

/// Uniform choice; `None` for an empty slice.
pub(crate) fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len()))
}
