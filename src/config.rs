use crate::models::DateBasis;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// Calendar used to decide when the daily total rolls over.
    pub date_basis: DateBasis,
    /// How often the screen redraws, e.g. "250ms" or "1s".
    pub refresh_interval: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            date_basis: DateBasis::Utc,
            refresh_interval: "250ms".to_string(),
        }
    }
}

impl Config {
    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_interval(&self.refresh_interval)
    }
}

pub fn parse_interval(raw: &str) -> Result<Duration> {
    let interval = humantime::parse_duration(raw)
        .map_err(|e| anyhow::anyhow!("Invalid interval {:?}: {}", raw, e))?;
    if interval.is_zero() {
        return Err(anyhow::anyhow!("Interval must be greater than zero"));
    }
    Ok(interval)
}

pub fn load_config(base_dir: &Path) -> Result<Config> {
    let path = base_dir.join("config.json");

    if !path.exists() {
        let config = Config::default();
        let data = serde_json::to_string_pretty(&config)?;
        fs::write(&path, data)?;
        return Ok(config);
    }

    let data = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&data)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_writes_defaults() -> Result<()> {
        let dir = tempdir()?;

        let config = load_config(dir.path())?;
        assert_eq!(config.date_basis, DateBasis::Utc);
        assert_eq!(config.refresh_interval()?, Duration::from_millis(250));

        let written = fs::read_to_string(dir.path().join("config.json"))?;
        assert!(written.contains("\"date_basis\": \"utc\""));

        Ok(())
    }

    #[test]
    fn test_load_config_partial_file() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("config.json"),
            r#"{ "date_basis": "local" }"#,
        )?;

        let config = load_config(dir.path())?;
        assert_eq!(config.date_basis, DateBasis::Local);
        assert_eq!(config.refresh_interval, "250ms");

        Ok(())
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_interval("100ms").unwrap(), Duration::from_millis(100));
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("soon").is_err());
    }
}
