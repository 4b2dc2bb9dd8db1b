// src/config/model.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Configuration exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [config]
/// dispatcher = "loop"
///
/// [scenario.download]
/// steps = 5
/// step_delay_ms = 100
/// outcome = "succeed"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// All scenarios from `[scenario.<name>]`, keyed by name.
    #[serde(default)]
    pub scenario: BTreeMap<String, ScenarioConfig>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(raw)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub scenario: BTreeMap<String, ScenarioConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        scenario: BTreeMap<String, ScenarioConfig>,
    ) -> Self {
        Self { config, scenario }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Where command notifications are delivered.
    #[serde(default)]
    pub dispatcher: DispatcherKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatcherKind {
    /// A background dispatch loop (one task, FIFO).
    #[default]
    Loop,
    /// Run callbacks directly on the publishing thread.
    Inline,
}

impl fmt::Display for DispatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatcherKind::Loop => f.write_str("loop"),
            DispatcherKind::Inline => f.write_str("inline"),
        }
    }
}

/// How a synthetic operation ends once all of its steps are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Succeed,
    Fail,
    /// The operation reports cancellation on its own.
    Cancel,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeed => f.write_str("succeed"),
            Outcome::Fail => f.write_str("fail"),
            Outcome::Cancel => f.write_str("cancel"),
        }
    }
}

/// `[scenario.<name>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioConfig {
    /// Number of progress reports; must be at least 1.
    #[serde(default = "default_steps")]
    pub steps: u32,

    /// Sleep before each step, in milliseconds.
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    #[serde(default)]
    pub outcome: Outcome,

    /// Error message used when `outcome = "fail"`.
    #[serde(default)]
    pub error: Option<String>,

    /// Trigger the cancel command this many milliseconds after starting.
    #[serde(default)]
    pub cancel_after_ms: Option<u64>,

    /// Cancel the run if it has not finished within this many milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_steps() -> u32 {
    1
}

fn default_step_delay_ms() -> u64 {
    100
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            step_delay_ms: default_step_delay_ms(),
            outcome: Outcome::default(),
            error: None,
            cancel_after_ms: None,
            timeout_ms: None,
        }
    }
}
