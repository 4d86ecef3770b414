//! Harness configuration: an optional TOML file overlaid by environment
//! variables.

use crate::HarnessError;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const ENV_ENGINE: &str = "PLANTY_ENGINE";
pub const ENV_TIMEOUT_MS: &str = "PLANTY_ENGINE_TIMEOUT_MS";
pub const ENV_KEEP_CASES: &str = "PLANTY_KEEP_CASES";
pub const ENV_DIARY: &str = "PLANTY_DIARY";
pub const ENV_CASE_ROOT: &str = "PLANTY_CASE_ROOT";
pub const ENV_PLAN_CHECK: &str = "PLANTY_PLAN_CHECK";
pub const ENV_CONFIG: &str = "PLANTY_CONFIG";

///
/// PlanCheck
///
/// How much of the diagnostic stream is checked against the plan oracle.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PlanCheck {
    Off,
    #[default]
    Markers,
    Trace,
}

impl PlanCheck {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Some(Self::Off),
            "markers" => Some(Self::Markers),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

///
/// HarnessConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Engine executable.
    pub engine: Option<PathBuf>,

    /// Kill the engine after this many milliseconds.
    pub timeout_ms: Option<u64>,

    /// Keep per-case directories after the run.
    pub keep_case_dirs: bool,

    /// JSON-lines file receiving one record per invocation and outcome.
    pub diary: Option<PathBuf>,

    /// Parent directory for per-case directories; system temp when unset.
    pub case_root: Option<PathBuf>,

    pub plan_check: PlanCheck,
}

impl HarnessConfig {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, HarnessError> {
        toml::from_str(text).map_err(|source| HarnessError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, HarnessError> {
        let text = fs::read_to_string(path).map_err(|err| HarnessError::io(path, err))?;

        Self::from_toml_str(&text, path)
    }

    /// Load `PLANTY_CONFIG` when set, then apply the other `PLANTY_*`
    /// variables on top.
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// [`Self::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HarnessError> {
        let base = match lookup(ENV_CONFIG) {
            Some(path) if !path.is_empty() => Self::from_toml_file(Path::new(&path))?,
            _ => Self::default(),
        };

        base.overlay(lookup)
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HarnessError> {
        let present = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(engine) = present(ENV_ENGINE) {
            self.engine = Some(PathBuf::from(engine));
        }
        if let Some(timeout) = present(ENV_TIMEOUT_MS) {
            self.timeout_ms = Some(
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| invalid(ENV_TIMEOUT_MS, &timeout))?,
            );
        }
        if let Some(keep) = present(ENV_KEEP_CASES) {
            self.keep_case_dirs =
                parse_flag(&keep).ok_or_else(|| invalid(ENV_KEEP_CASES, &keep))?;
        }
        if let Some(diary) = present(ENV_DIARY) {
            self.diary = Some(PathBuf::from(diary));
        }
        if let Some(root) = present(ENV_CASE_ROOT) {
            self.case_root = Some(PathBuf::from(root));
        }
        if let Some(check) = present(ENV_PLAN_CHECK) {
            self.plan_check =
                PlanCheck::parse(&check).ok_or_else(|| invalid(ENV_PLAN_CHECK, &check))?;
        }

        Ok(self)
    }

    /// Configured engine path.
    pub fn engine(&self) -> Result<&Path, HarnessError> {
        self.engine.as_deref().ok_or(HarnessError::MissingEngine)
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: &str) -> HarnessError {
    HarnessError::ConfigValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

///
/// TESTS
///
