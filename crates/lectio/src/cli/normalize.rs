use std::path::Path;

use anyhow::Result;

use super::{load_config, read_normalized};

pub async fn run(config_path: Option<&Path>, path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let text = read_normalized(path, &config).await?;
    println!("{text}");
    Ok(())
}
