use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use serde::de::DeserializeOwned;

pub fn workspace_dir() -> anyhow::Result<PathBuf> {
    let output = std::process::Command::new(env!("CARGO"))
        .arg("locate-project")
        .arg("--workspace")
        .arg("--message-format=plain")
        .output()
        .context("failed to run cargo locate-project")?;
    ensure!(
        output.status.success(),
        "cargo locate-project failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = std::str::from_utf8(&output.stdout)
        .context("failed to read cargo locate-project output")?;
    let cargo_path = Path::new(stdout.trim());

    cargo_path
        .parent()
        .map(Path::to_path_buf)
        .context("failed to get workspace dir")
}

/// Resolves `path` against the workspace root unless it is absolute.
pub fn workspace_path(path: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    Ok(workspace_dir()?.join(path))
}

pub fn load_config<T: DeserializeOwned>(config_name: &str) -> anyhow::Result<T> {
    let path = workspace_path(config_name)?;
    let config = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    parse_config(&config).with_context(|| format!("failed to parse {}", config_name))
}

pub fn parse_config<T: DeserializeOwned>(config: &str) -> anyhow::Result<T> {
    Ok(toml::from_str::<T>(config)?)
}

#[cfg(test)]
mod test {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Config {
        blocks: Blocks,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Blocks {
        input: String,
        page_size: Option<u32>,
    }

    #[test]
    fn test_parse_config() {
        // Arrange
        let text = r#"
            [blocks]
            input = "children.json"
            page_size = 50
        "#;

        // Act
        let config = parse_config::<Config>(text);

        // Assert
        assert_eq!(
            config.unwrap(),
            Config {
                blocks: Blocks {
                    input: "children.json".to_string(),
                    page_size: Some(50),
                },
            }
        );
    }

    #[test]
    fn test_parse_config_missing_section() {
        let config = parse_config::<Config>("[notion]\npause_secs = 1\n");

        assert!(config.is_err());
    }

    #[test]
    fn test_workspace_path_keeps_absolute() {
        let path = workspace_path("/tmp/children.json").unwrap();

        assert_eq!(path, PathBuf::from("/tmp/children.json"));
    }
}
