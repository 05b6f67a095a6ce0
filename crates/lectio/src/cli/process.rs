use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use lectio_core::classify::{GeminiClient, SubjectClassifier};
use lectio_core::config::PipelineConfig;
use lectio_core::ingest::{DocumentPipeline, PipelineResult};
use lectio_core::usage::UsageTracker;

use super::load_config;

pub struct Options {
    pub topics: Option<usize>,
    pub words: Option<usize>,
    pub classify: bool,
    pub pretty: bool,
}

pub async fn run(config_path: Option<&Path>, paths: &[PathBuf], options: &Options) -> Result<()> {
    let config = effective_config(config_path, options)?;
    let usage = Arc::new(UsageTracker::new());

    let mut pipeline = DocumentPipeline::new().with_config(config.clone());
    if options.classify || config.classifier.enabled {
        let client = GeminiClient::from_config(&config.classifier)
            .context("cannot enable subject classification")?;
        let classifier = SubjectClassifier::new(Arc::new(client))
            .with_usage_tracker(Arc::clone(&usage))
            .with_top_n(config.entities.top_n);
        pipeline = pipeline.with_classifier(classifier);
    }

    for path in paths {
        if path.is_dir() {
            let batch = pipeline
                .process_directory(path)
                .await
                .with_context(|| format!("failed to list {}", path.display()))?;
            for result in batch.results() {
                print_result(result, options.pretty)?;
            }
            eprintln!(
                "{}: {} processed, {} failed",
                path.display(),
                batch.success_count(),
                batch.failure_count()
            );
        } else {
            let result = pipeline.process_file(path).await;
            print_result(&result, options.pretty)?;
        }
    }

    for month in usage.snapshot() {
        eprintln!(
            "Usage {} {}-{:02}: {} requests, {} input tokens, {} output tokens",
            month.service,
            month.year,
            month.month,
            month.requests,
            month.total_input_tokens,
            month.total_output_tokens
        );
    }

    Ok(())
}

fn effective_config(config_path: Option<&Path>, options: &Options) -> Result<PipelineConfig> {
    let mut config = load_config(config_path)?;
    if let Some(topics) = options.topics {
        config.topics.num_topics = topics;
    }
    if let Some(words) = options.words {
        config.topics.num_words = words;
    }
    config.validate()?;
    Ok(config)
}

fn print_result(result: &PipelineResult, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
