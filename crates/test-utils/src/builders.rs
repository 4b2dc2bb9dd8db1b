#![allow(dead_code)]

use std::collections::BTreeMap;

use cmdgate::config::{
    ConfigFile, ConfigSection, DispatcherKind, Outcome, RawConfigFile, ScenarioConfig,
};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                scenario: BTreeMap::new(),
            },
        }
    }

    pub fn with_scenario(mut self, name: &str, scenario: ScenarioConfig) -> Self {
        self.config.scenario.insert(name.to_string(), scenario);
        self
    }

    pub fn with_dispatcher(mut self, kind: DispatcherKind) -> Self {
        self.config.config.dispatcher = kind;
        self
    }

    /// The raw config, for tests that exercise validation failures.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ScenarioConfig`. Starts from a fast, succeeding scenario.
pub struct ScenarioBuilder {
    scenario: ScenarioConfig,
}

impl ScenarioBuilder {
    pub fn new(steps: u32) -> Self {
        Self {
            scenario: ScenarioConfig {
                steps,
                step_delay_ms: 1,
                outcome: Outcome::Succeed,
                error: None,
                cancel_after_ms: None,
                timeout_ms: None,
            },
        }
    }

    pub fn step_delay_ms(mut self, ms: u64) -> Self {
        self.scenario.step_delay_ms = ms;
        self
    }

    pub fn fail(mut self, message: &str) -> Self {
        self.scenario.outcome = Outcome::Fail;
        self.scenario.error = Some(message.to_string());
        self
    }

    pub fn cancel_outcome(mut self) -> Self {
        self.scenario.outcome = Outcome::Cancel;
        self
    }

    pub fn cancel_after_ms(mut self, ms: u64) -> Self {
        self.scenario.cancel_after_ms = Some(ms);
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.scenario.timeout_ms = Some(ms);
        self
    }

    pub fn build(self) -> ScenarioConfig {
        self.scenario
    }
}
