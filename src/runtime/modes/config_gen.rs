//! `covidmap config generate`

use anyhow::{Result, bail};
use colored::Colorize;
use std::path::Path;

use crate::config::StaticConfig;

pub const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// Write a sample configuration built from defaults
pub fn run_config_generate(path: Option<&str>, force: bool) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_SAMPLE_PATH);

    if Path::new(path).exists() && !force {
        bail!("{} already exists, pass --force to overwrite", path);
    }

    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;

    println!("{} Sample configuration written to {}", "✓".green().bold(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("sample.toml");
        let path = path.to_str().unwrap();

        run_config_generate(Some(path), false).unwrap();
        let written: StaticConfig = toml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.import.batch_size, 500);

        assert!(run_config_generate(Some(path), false).is_err());
        run_config_generate(Some(path), true).unwrap();
    }
}
