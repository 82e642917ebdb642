use crate::cli::CliArgs;
use crate::dispatch::DEFAULT_LOGS_TAIL;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REFRESH_MS: u64 = 3_000;
pub const MIN_REFRESH_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: Option<String>,
    pub refresh_ms: u64,
    pub logs_tail: u32,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct KubedeckConfigFile {
    #[serde(default, alias = "refresh")]
    refresh_ms: Option<u64>,
    #[serde(default, alias = "tail")]
    logs_tail: Option<u32>,
    #[serde(default)]
    log_file: Option<PathBuf>,
}

impl Settings {
    pub fn load(cli: &CliArgs) -> Result<Self> {
        let (source, file) = match discover_config_path() {
            Some(path) => (Some(path.display().to_string()), read_config(&path)?),
            None => (None, KubedeckConfigFile::default()),
        };
        Ok(Self::merge(source, file, cli))
    }

    fn merge(source: Option<String>, file: KubedeckConfigFile, cli: &CliArgs) -> Self {
        let refresh_ms = cli
            .refresh_ms
            .or(file.refresh_ms)
            .unwrap_or(DEFAULT_REFRESH_MS)
            .max(MIN_REFRESH_MS);
        let logs_tail = cli
            .logs_tail
            .or(file.logs_tail)
            .filter(|tail| *tail > 0)
            .unwrap_or(DEFAULT_LOGS_TAIL);

        Self {
            source,
            refresh_ms,
            logs_tail,
            log_file: cli.log_file.clone().or(file.log_file),
        }
    }
}

fn read_config(path: &Path) -> Result<KubedeckConfigFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

fn parse_config(raw: &str) -> Result<KubedeckConfigFile> {
    if raw.trim().is_empty() {
        return Ok(KubedeckConfigFile::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("KUBEDECK_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("kubedeck.yaml"),
        PathBuf::from("kubedeck.yml"),
        PathBuf::from(".kubedeck.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/kubedeck/config.yaml"),
            PathBuf::from(&home).join(".config/kubedeck/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_REFRESH_MS, MIN_REFRESH_MS, Settings, parse_config};
    use crate::cli::CliArgs;
    use clap::Parser;
    use std::path::PathBuf;

    fn cli(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("kubedeck").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let settings = Settings::merge(None, parse_config("").unwrap(), &cli(&[]));
        assert_eq!(settings.refresh_ms, DEFAULT_REFRESH_MS);
        assert_eq!(settings.logs_tail, 200);
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn flags_override_file_values() {
        let file = parse_config("refresh_ms: 10000\nlogs_tail: 50\nlog_file: /tmp/deck.log\n")
            .unwrap();
        let settings = Settings::merge(
            Some("kubedeck.yaml".to_string()),
            file,
            &cli(&["--refresh-ms", "4000"]),
        );
        assert_eq!(settings.refresh_ms, 4_000);
        assert_eq!(settings.logs_tail, 50);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/deck.log")));
        assert_eq!(settings.source.as_deref(), Some("kubedeck.yaml"));
    }

    #[test]
    fn refresh_is_clamped_and_zero_tail_falls_back() {
        let settings = Settings::merge(
            None,
            parse_config("tail: 0\n").unwrap(),
            &cli(&["--refresh-ms", "10"]),
        );
        assert_eq!(settings.refresh_ms, MIN_REFRESH_MS);
        assert_eq!(settings.logs_tail, 200);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(parse_config("refresh_ms: [").is_err());
    }
}
