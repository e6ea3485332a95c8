// Orchestrator
// Insight -> scenario -> synthesis, then the bounded humanization loop

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use super::ai_pattern_filter::AIPatternFilter;
use super::insight_analyzer::InsightAnalyzer;
use super::persona_writer::{persona_by_name, PersonaWriter};
use super::prompt_variants::PromptVariants;
use super::scenario_generator::ScenarioGenerator;
use super::synthesis_engine::SynthesisEngine;
use crate::models::{
    AnalysisResult, DocumentSection, Insight, ProductionResult, ScenarioCategory, SynthesisContext, SynthesisMode, TemporalHook,
};
use crate::services::config_store::PipelineConfig;
use crate::services::providers::CompletionProvider;

/// Owns one instance of every pipeline stage. Use one orchestrator per
/// logical request; the stages keep anti-repetition state between calls.
pub struct Orchestrator {
    config: PipelineConfig,
    analyzer: InsightAnalyzer,
    scenarios: ScenarioGenerator,
    synthesizer: SynthesisEngine,
    writer: PersonaWriter,
    filter: AIPatternFilter,
    variants: PromptVariants,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig) -> Self {
        let seeds: [u64; 4] = match config.seed {
            Some(seed) => [seed, seed.wrapping_add(1), seed.wrapping_add(2), seed.wrapping_add(3)],
            None => [rand::random(), rand::random(), rand::random(), rand::random()],
        };

        Self {
            analyzer: InsightAnalyzer::new(),
            scenarios: ScenarioGenerator::with_seed(seeds[0]),
            synthesizer: SynthesisEngine::with_seed(seeds[1]),
            writer: PersonaWriter::with_seed(&config.default_persona, seeds[2]),
            filter: AIPatternFilter::new(config.strict_mode),
            variants: PromptVariants::with_seed(seeds[3]),
            config,
        }
    }

    /// Enable insight enrichment through an external completion provider.
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.analyzer = InsightAnalyzer::with_provider(provider);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn default_mode(&self) -> SynthesisMode {
        SynthesisMode::from_name(&self.config.default_mode)
    }

    /// Synthesize content, then alternate persona rewriting and pattern
    /// scoring until the text passes the threshold or retries run out.
    /// Performs at most `max_retries + 1` scoring passes. Threshold and
    /// retry budget fall back to the pipeline config when not given.
    #[allow(clippy::too_many_arguments)]
    pub fn produce(
        &mut self,
        topic: &str,
        insights: Vec<Insight>,
        mode: SynthesisMode,
        persona_name: &str,
        scenario_category: Option<ScenarioCategory>,
        ai_threshold: Option<f64>,
        max_retries: Option<u32>,
    ) -> ProductionResult {
        let run_id = Uuid::new_v4();
        let persona = persona_by_name(persona_name);
        let threshold = ai_threshold.unwrap_or(self.config.ai_threshold);
        let max_retries = max_retries.unwrap_or(self.config.max_retries);

        let mut context = SynthesisContext::new(insights, mode);
        context.scenario_category = scenario_category.map(|c| c.as_str().to_string());
        context.persona_description = Some(persona.to_prompt_description());

        let mut content = self.synthesizer.synthesize(&context);

        if content.is_insufficient() {
            let report = self.filter.analyze(&content.raw_text);
            tracing::warn!(%run_id, topic, mode = mode.as_str(), "production.insufficient");
            return ProductionResult {
                run_id,
                ai_score: report.ai_score,
                content,
                humanized: false,
                attempts: 1,
                report,
                changes: Vec::new(),
            };
        }

        let mut text = content.raw_text.clone();
        let mut changes = Vec::new();
        let mut humanized = false;
        let mut attempt: u32 = 0;
        let mut passes: u32 = 0;

        let report = loop {
            let (passes_check, report) = self.filter.validate_human_likeness(&text, threshold);
            passes += 1;
            tracing::debug!(%run_id, attempt, ai_score = report.ai_score, passed = passes_check, "humanization.attempt");

            if passes_check {
                break report;
            }

            let result = self.writer.humanize_content(&text, Some(persona));
            text = result.transformed;
            changes.extend(result.changes_made);
            humanized = true;

            if attempt < max_retries {
                let filtered = self.filter.humanize(&text);
                if filtered != text {
                    changes.push("Applied pattern filter rewrite".to_string());
                }
                text = filtered;
            }

            attempt += 1;
            if attempt > max_retries {
                break report;
            }
        };

        content.raw_text = text;

        tracing::info!(
            %run_id,
            topic,
            mode = mode.as_str(),
            persona = %persona.key,
            ai_score = report.ai_score,
            humanized,
            passes,
            "production.completed"
        );

        ProductionResult {
            run_id,
            ai_score: report.ai_score,
            content,
            humanized,
            attempts: passes,
            report,
            changes,
        }
    }

    pub async fn analyze_sections(&self, sections: &[DocumentSection]) -> AnalysisResult {
        self.analyzer
            .analyze_multiple_sections(sections, self.config.use_enrichment)
            .await
    }

    /// Analyze raw sections, match a scenario to the topic, then produce.
    pub async fn produce_from_sections(
        &mut self,
        topic: &str,
        sections: &[DocumentSection],
        mode: SynthesisMode,
        persona_name: &str,
        ai_threshold: Option<f64>,
        max_retries: Option<u32>,
    ) -> ProductionResult {
        let analysis = self.analyze_sections(sections).await;

        let keywords = collect_keywords(&analysis.insights);
        let scenario = self.scenarios.match_scenario_to_topic(topic, &keywords);
        tracing::debug!(
            topic,
            sections = sections.len(),
            themes = ?analysis.themes,
            category = scenario.category.as_str(),
            "production.analyzed"
        );

        self.produce(
            topic,
            analysis.insights,
            mode,
            persona_name,
            Some(scenario.category),
            ai_threshold,
            max_retries,
        )
    }

    /// `n` posts on one topic, each with its own scenario and with modes
    /// cycling from the configured default.
    pub fn produce_thread(
        &mut self,
        topic: &str,
        insights: &[Insight],
        n: usize,
        persona_name: &str,
        ai_threshold: Option<f64>,
        max_retries: Option<u32>,
    ) -> Vec<ProductionResult> {
        let keywords = collect_keywords(insights);
        let scenarios = self.scenarios.get_scenarios_for_thread(n, &keywords);
        let start = SynthesisMode::ALL
            .iter()
            .position(|m| *m == self.default_mode())
            .unwrap_or(0);

        scenarios
            .iter()
            .enumerate()
            .map(|(i, scenario)| {
                let mode = SynthesisMode::ALL[(start + i) % SynthesisMode::ALL.len()];
                self.produce(
                    topic,
                    insights.to_vec(),
                    mode,
                    persona_name,
                    Some(scenario.category),
                    ai_threshold,
                    max_retries,
                )
            })
            .collect()
    }

    pub fn temporal_hook(&mut self, date: Option<NaiveDate>) -> Option<TemporalHook> {
        self.scenarios.get_temporal_hook(date)
    }

    /// Style guidance block for an external generation prompt.
    pub fn prompt_guidance(&mut self, mode: SynthesisMode, topic: &str) -> String {
        self.variants.synthesis_prompt_additions(mode, topic)
    }
}

fn collect_keywords(insights: &[Insight]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for insight in insights {
        for kw in &insight.keywords {
            if !keywords.contains(kw) {
                keywords.push(kw.clone());
            }
        }
    }
    keywords
}
