// src/config/validate.rs

use crate::config::model::{ConfigFile, Outcome, RawConfigFile, ScenarioConfig};
use crate::errors::{CmdgateError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CmdgateError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.scenario))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_scenarios(cfg)?;
    for (name, scenario) in cfg.scenario.iter() {
        validate_scenario(name, scenario)?;
    }
    Ok(())
}

fn ensure_has_scenarios(cfg: &RawConfigFile) -> Result<()> {
    if cfg.scenario.is_empty() {
        return Err(CmdgateError::ConfigError(
            "config must contain at least one [scenario.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_scenario(name: &str, scenario: &ScenarioConfig) -> Result<()> {
    if scenario.steps == 0 {
        return Err(CmdgateError::ConfigError(format!(
            "scenario '{name}': steps must be >= 1 (got 0)"
        )));
    }

    if scenario.outcome == Outcome::Fail
        && scenario.error.as_deref().is_none_or(|e| e.trim().is_empty())
    {
        return Err(CmdgateError::ConfigError(format!(
            "scenario '{name}': outcome = \"fail\" requires a non-empty `error` message"
        )));
    }

    if scenario.cancel_after_ms == Some(0) {
        return Err(CmdgateError::ConfigError(format!(
            "scenario '{name}': cancel_after_ms must be > 0"
        )));
    }

    if scenario.timeout_ms == Some(0) {
        return Err(CmdgateError::ConfigError(format!(
            "scenario '{name}': timeout_ms must be > 0"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::model::ConfigSection;

    fn raw_with(name: &str, scenario: ScenarioConfig) -> RawConfigFile {
        RawConfigFile {
            config: ConfigSection::default(),
            scenario: BTreeMap::from([(name.to_string(), scenario)]),
        }
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = ConfigFile::try_from(RawConfigFile::default()).unwrap_err();
        assert!(matches!(err, CmdgateError::ConfigError(msg) if msg.contains("at least one")));
    }

    #[test]
    fn fail_outcome_needs_error_message() {
        let scenario = ScenarioConfig {
            outcome: Outcome::Fail,
            ..ScenarioConfig::default()
        };
        let err = ConfigFile::try_from(raw_with("broken", scenario)).unwrap_err();
        assert!(matches!(err, CmdgateError::ConfigError(msg) if msg.contains("broken")));
    }

    #[test]
    fn zero_durations_are_rejected() {
        let scenario = ScenarioConfig {
            timeout_ms: Some(0),
            ..ScenarioConfig::default()
        };
        assert!(ConfigFile::try_from(raw_with("t", scenario)).is_err());

        let scenario = ScenarioConfig {
            cancel_after_ms: Some(0),
            ..ScenarioConfig::default()
        };
        assert!(ConfigFile::try_from(raw_with("c", scenario)).is_err());
    }

    #[test]
    fn valid_scenario_passes() {
        let scenario = ScenarioConfig {
            steps: 3,
            outcome: Outcome::Fail,
            error: Some("disk full".to_string()),
            ..ScenarioConfig::default()
        };
        let cfg = ConfigFile::try_from(raw_with("ok", scenario.clone())).unwrap();
        assert_eq!(cfg.scenario["ok"], scenario);
    }
}
