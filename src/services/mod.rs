// Synthpost Core Services

pub mod config_store;
pub mod providers;
pub mod synthesis;
pub mod text_processor;

pub use config_store::*;
pub use providers::*;
pub use text_processor::*;

pub use synthesis::{
    AIPatternFilter,
    InsightAnalyzer,
    Orchestrator,
    PersonaWriter,
    PromptVariants,
    ScenarioGenerator,
    SynthesisEngine,
};
