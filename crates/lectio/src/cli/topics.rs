use std::path::Path;

use anyhow::{Context, Result};

use lectio_core::language::default_pipeline;
use lectio_core::topics::TopicModeler;

use super::{load_config, read_normalized};

pub async fn run(
    config_path: Option<&Path>,
    path: &Path,
    topics: Option<usize>,
    words: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(topics) = topics {
        config.topics.num_topics = topics;
    }
    if let Some(words) = words {
        config.topics.num_words = words;
    }
    config.validate()?;

    let text = read_normalized(path, &config).await?;
    let modeler = TopicModeler::new(default_pipeline()).with_config(config.topics);

    let topics = tokio::task::spawn_blocking(move || modeler.extract_topics(&text))
        .await?
        .context("topic modeling failed")?;

    if topics.is_empty() {
        eprintln!("No content words found");
    }
    for topic in topics.iter() {
        println!("Topic {}: {}", topic.id, topic.descriptor());
    }

    Ok(())
}
