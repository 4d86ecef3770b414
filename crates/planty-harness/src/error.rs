use planty_oracle::{
    compare::CompareError,
    generate::{FixtureError, FixtureNameError},
};
use std::{io, path::PathBuf};
use thiserror::Error as ThisError;

///
/// HarnessError
///

#[derive(Debug, ThisError)]
pub enum HarnessError {
    #[error("case '{case}': {source}")]
    Compare {
        case: String,
        #[source]
        source: CompareError,
    },

    #[error("config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {key}")]
    ConfigValue { key: String, value: String },

    #[error("case '{case}': expected exit code {expected}, engine returned {actual:?}")]
    ExitCode {
        case: String,
        expected: i32,
        actual: Option<i32>,
    },

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    FixtureName(#[from] FixtureNameError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no engine configured; set PLANTY_ENGINE or `engine` in the config file")]
    MissingEngine,

    #[error("case directory {0} does not exist and names no generator")]
    NoCase(PathBuf),

    #[error("failed to start engine {engine}: {source}")]
    Spawn {
        engine: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("case '{case}': expected '{expected}', engine printed {actual:?}")]
    TableFailure {
        case: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("engine {engine} exceeded {timeout_ms} ms")]
    Timeout { engine: PathBuf, timeout_ms: u64 },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
