// src/config/validate.rs

use std::time::Duration;

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WadError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;

        let poll_interval = parse_duration(&raw.watch.poll_interval)
            .map_err(|e| WadError::ConfigError(format!("[watch].poll_interval: {e}")))?;
        // Checked by `validate_config`.
        let artifact = raw.build.artifact.unwrap_or_default();

        Ok(ConfigFile::new_unchecked(
            raw.watch.dir,
            poll_interval,
            raw.watch.exclude,
            raw.build.cmd,
            raw.build.dir,
            artifact,
            raw.deploy.targets,
            raw.stats.summary_every,
            raw.runtime.queue_length,
        ))
    }
}

/// Run every semantic check against a raw config.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_watch(cfg)?;
    validate_build(cfg)?;
    validate_deploy(cfg)?;
    validate_counters(cfg)?;
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    let interval = parse_duration(&cfg.watch.poll_interval)
        .map_err(|e| WadError::ConfigError(format!("[watch].poll_interval: {e}")))?;
    if interval.is_zero() {
        return Err(WadError::ConfigError(
            "[watch].poll_interval must be greater than zero".to_string(),
        ));
    }

    for pattern in &cfg.watch.exclude {
        Glob::new(pattern).map_err(|e| {
            WadError::ConfigError(format!("[watch].exclude: invalid glob '{pattern}': {e}"))
        })?;
    }
    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.cmd.trim().is_empty() {
        return Err(WadError::ConfigError(
            "[build].cmd must not be empty".to_string(),
        ));
    }
    match &cfg.build.artifact {
        Some(path) if !path.as_os_str().is_empty() => Ok(()),
        _ => Err(WadError::ConfigError(
            "[build].artifact is required (or pass --artifact)".to_string(),
        )),
    }
}

fn validate_deploy(cfg: &RawConfigFile) -> Result<()> {
    if cfg.deploy.targets.is_empty() {
        return Err(WadError::ConfigError(
            "[deploy].targets must list at least one deployment target".to_string(),
        ));
    }
    Ok(())
}

fn validate_counters(cfg: &RawConfigFile) -> Result<()> {
    if cfg.stats.summary_every == 0 {
        return Err(WadError::ConfigError(
            "[stats].summary_every must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.runtime.queue_length == 0 {
        return Err(WadError::ConfigError(
            "[runtime].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Parse a duration string like `500ms`, `2s`, `1m` or `1h`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{}'", s))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn minimal_raw() -> RawConfigFile {
        let mut raw = RawConfigFile::default();
        raw.build.artifact = Some(PathBuf::from("target/app.war"));
        raw.deploy.targets = vec![PathBuf::from("/srv/deploy")];
        raw
    }

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("50ms"), Ok(Duration::from_millis(50)));
        assert_eq!(parse_duration(" 2s "), Ok(Duration::from_secs(2)));
        assert_eq!(parse_duration("3m"), Ok(Duration::from_secs(180)));
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("").is_err());
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(7200)));
        assert_eq!(
            parse_duration("999999999999999999h"),
            Err("duration too large: '999999999999999999h'".to_string())
        );
        assert!(parse_duration("999999999999999999999ms").is_err());
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = ConfigFile::try_from(minimal_raw()).unwrap();
        assert_eq!(cfg.poll_interval(), Duration::from_millis(500));
        assert_eq!(cfg.summary_every(), 10);
        assert_eq!(cfg.queue_length(), 1);
        assert_eq!(cfg.watch_dir(), PathBuf::from("src/main"));
    }

    #[test]
    fn rejects_missing_targets() {
        let mut raw = minimal_raw();
        raw.deploy.targets.clear();
        match ConfigFile::try_from(raw) {
            Err(WadError::ConfigError(msg)) => assert!(msg.contains("[deploy].targets")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_artifact() {
        let mut raw = minimal_raw();
        raw.build.artifact = None;
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(WadError::ConfigError(msg)) if msg.contains("[build].artifact")
        ));
    }

    #[test]
    fn rejects_zero_interval_and_threshold() {
        let mut raw = minimal_raw();
        raw.watch.poll_interval = "0ms".to_string();
        assert!(ConfigFile::try_from(raw).is_err());

        let mut raw = minimal_raw();
        raw.stats.summary_every = 0;
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn oversized_interval_is_a_config_error() {
        let mut raw = minimal_raw();
        raw.watch.poll_interval = "999999999999999999h".to_string();
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(WadError::ConfigError(msg)) if msg.contains("too large")
        ));
    }

    #[test]
    fn rejects_bad_exclude_glob() {
        let mut raw = minimal_raw();
        raw.watch.exclude = vec!["src/[".to_string()];
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(WadError::ConfigError(msg)) if msg.contains("invalid glob")
        ));
    }
}
