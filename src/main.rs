use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use synthpost_lib::models::{DocumentSection, ProductionResult, SynthesisMode, TemporalHook};
use synthpost_lib::services::config_store::{AppConfig, ConfigStore};
use synthpost_lib::services::providers::ProviderClient;
use synthpost_lib::services::synthesis::list_personas;
use synthpost_lib::services::Orchestrator;
use tracing::{info, warn};

const USAGE: &str = "Usage:
  synthpost <sections.json|notes.txt> [--topic <text>] [--mode <mode>] [--persona <name>]
            [--thread <n>] [--threshold <0..1>] [--retries <n>] [--seed <n>] [--strict]
            [--no-enrich] [--date <YYYY-MM-DD>] [--guidance] [--config <dir>] [--out <json_path>]

Notes:
  - A .json input is an array of sections ({\"sectionNumber\", \"title\", \"content\"}).
    Any other file is treated as one untitled section.
  - Modes: explain, contrast, challenge, apply, story, myth_bust, implications.";

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn load_sections(path: &str, topic: &str) -> Result<Vec<DocumentSection>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read input failed: {}", path))?;

    let is_json = Path::new(path)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        return serde_json::from_str(&raw).with_context(|| format!("parse sections failed: {}", path));
    }
    Ok(vec![DocumentSection::new(1, topic, raw.trim())])
}

fn load_config(args: &[String]) -> Result<AppConfig> {
    let dir = match parse_arg_value(args, "--config") {
        Some(dir) => Some(dir.into()),
        None => ConfigStore::default_config_dir(),
    };

    let mut config = match dir {
        Some(dir) => ConfigStore::new(dir).load().context("load config failed")?,
        None => AppConfig::default(),
    };

    let pipeline = &mut config.pipeline;
    if let Some(seed) = parse_arg_value(args, "--seed").and_then(|s| s.parse().ok()) {
        pipeline.seed = Some(seed);
    }
    if has_flag(args, "--strict") {
        pipeline.strict_mode = true;
    }
    if has_flag(args, "--no-enrich") {
        pipeline.use_enrichment = false;
    }
    Ok(config)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    topic: String,
    persona: String,
    sections: usize,
    posts: Vec<ProductionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temporal_hook: Option<TemporalHook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guidance: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || has_flag(&args, "--help") {
        eprintln!("{}\n  - Personas: {}.", USAGE, list_personas().join(", "));
        return Ok(());
    }

    synthpost_lib::init_logging();

    let path = args[1].clone();
    let config = load_config(&args)?;
    let topic = parse_arg_value(&args, "--topic").unwrap_or_else(|| {
        Path::new(&path)
            .file_stem()
            .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
            .unwrap_or_else(|| "this topic".to_string())
    });
    let mode = parse_arg_value(&args, "--mode")
        .map(|m| SynthesisMode::from_name(&m))
        .unwrap_or_else(|| SynthesisMode::from_name(&config.pipeline.default_mode));
    let persona = parse_arg_value(&args, "--persona").unwrap_or_else(|| config.pipeline.default_persona.clone());
    let thread_n: Option<usize> = parse_arg_value(&args, "--thread").and_then(|s| s.parse().ok());
    let date = match parse_arg_value(&args, "--date") {
        Some(d) => Some(NaiveDate::parse_from_str(&d, "%Y-%m-%d").with_context(|| format!("invalid --date: {}", d))?),
        None => None,
    };
    let threshold: Option<f64> = parse_arg_value(&args, "--threshold").and_then(|s| s.parse().ok());
    let retries: Option<u32> = parse_arg_value(&args, "--retries").and_then(|s| s.parse().ok());
    let out_path = parse_arg_value(&args, "--out");

    let sections = load_sections(&path, &topic)?;
    info!(file = %path, sections = sections.len(), mode = mode.as_str(), persona = %persona, "cli.started");

    let mut orchestrator = Orchestrator::new(config.pipeline.clone());
    if config.pipeline.use_enrichment {
        if let Some(provider_config) = &config.provider {
            match ProviderClient::from_config(provider_config) {
                Ok(client) => orchestrator = orchestrator.with_provider(Arc::new(client)),
                Err(e) => warn!(provider = %provider_config.name, error = %e, "provider.unavailable"),
            }
        }
    }

    let posts = match thread_n {
        Some(n) => {
            let analysis = orchestrator.analyze_sections(&sections).await;
            orchestrator.produce_thread(&topic, &analysis.insights, n, &persona, threshold, retries)
        }
        None => vec![
            orchestrator
                .produce_from_sections(&topic, &sections, mode, &persona, threshold, retries)
                .await,
        ],
    };

    let temporal_hook = orchestrator.temporal_hook(date);
    let guidance = if has_flag(&args, "--guidance") {
        Some(orchestrator.prompt_guidance(mode, &topic))
    } else {
        None
    };

    let out = Output {
        topic,
        persona,
        sections: sections.len(),
        posts,
        temporal_hook,
        guidance,
    };
    let json = serde_json::to_string_pretty(&out).context("serialize output failed")?;

    match out_path {
        Some(out_path) => {
            std::fs::write(&out_path, json).with_context(|| format!("write out failed: {}", out_path))?;
            eprintln!("Wrote JSON: {}", out_path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
