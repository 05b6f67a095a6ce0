use std::path::Path;

use anyhow::{Context, Result};

use lectio_core::entity::RankedEntityList;
use lectio_core::ingest::EntityExtractor;
use lectio_core::language::default_pipeline;

use super::{load_config, read_normalized};

pub async fn run(config_path: Option<&Path>, path: &Path, top: Option<usize>) -> Result<()> {
    let config = load_config(config_path)?;
    let top = top.unwrap_or(config.entities.top_n);
    let text = read_normalized(path, &config).await?;

    let extracted = tokio::task::spawn_blocking(move || {
        EntityExtractor::new(default_pipeline()).extract_all(&text)
    })
    .await?
    .context("entity extraction failed")?;

    print_section("Persons", &extracted.persons, top);
    print_section("Locations", &extracted.locations, top);
    if !extracted.dates.is_empty() {
        println!("Dates: {}", extracted.dates.join(", "));
    }

    Ok(())
}

fn print_section(title: &str, entities: &RankedEntityList, top: usize) {
    println!("{title}:");
    if entities.is_empty() {
        println!("  (none)");
    }
    for entity in entities.top(top) {
        println!("  {} ({})", entity.name, entity.count);
    }
}
