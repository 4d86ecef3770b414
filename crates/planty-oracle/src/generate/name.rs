use crate::generate::{Fixture, FixtureError, fullscan, interval_battery};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// FixtureNameError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FixtureNameError {
    #[error("fixture '{name}' expects {expected} arguments, found {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("fixture '{name}' has invalid argument '{argument}'")]
    BadArgument { name: String, argument: String },

    #[error("no generator named '{0}'")]
    UnknownGenerator(String),
}

///
/// FixtureName
///
/// Case-directory name that identifies a generated fixture, e.g.
/// `fullscan.3.4.2` or `intervals.1.reversed`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FixtureName {
    Fullscan {
        columns: usize,
        max_value: i64,
        key_len: usize,
    },
    Intervals {
        key_len: usize,
        reversed_pairs: bool,
    },
}

impl FixtureName {
    pub fn parse(name: &str) -> Result<Self, FixtureNameError> {
        let (generator, args) = name.split_once('.').unwrap_or((name, ""));
        let args: Vec<&str> = if args.is_empty() {
            Vec::new()
        } else {
            args.split('.').collect()
        };

        match generator {
            "fullscan" => {
                let [columns, max_value, key_len] = args[..] else {
                    return Err(arity(name, 3, args.len()));
                };

                Ok(Self::Fullscan {
                    columns: argument(name, columns)?,
                    max_value: argument(name, max_value)?,
                    key_len: argument(name, key_len)?,
                })
            }
            "intervals" => match args[..] {
                [key_len] => Ok(Self::Intervals {
                    key_len: argument(name, key_len)?,
                    reversed_pairs: false,
                }),
                [key_len, "reversed"] => Ok(Self::Intervals {
                    key_len: argument(name, key_len)?,
                    reversed_pairs: true,
                }),
                [_, other] => Err(FixtureNameError::BadArgument {
                    name: name.to_string(),
                    argument: other.to_string(),
                }),
                _ => Err(arity(name, 1, args.len())),
            },
            _ => Err(FixtureNameError::UnknownGenerator(generator.to_string())),
        }
    }

    /// Run the generator this name stands for.
    pub fn generate(self) -> Result<Fixture, FixtureError> {
        match self {
            Self::Fullscan {
                columns,
                max_value,
                key_len,
            } => fullscan(columns, max_value, key_len),
            Self::Intervals {
                key_len,
                reversed_pairs,
            } => interval_battery(key_len, reversed_pairs),
        }
    }
}

impl FromStr for FixtureName {
    type Err = FixtureNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FixtureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fullscan {
                columns,
                max_value,
                key_len,
            } => write!(f, "fullscan.{columns}.{max_value}.{key_len}"),
            Self::Intervals {
                key_len,
                reversed_pairs: false,
            } => write!(f, "intervals.{key_len}"),
            Self::Intervals {
                key_len,
                reversed_pairs: true,
            } => write!(f, "intervals.{key_len}.reversed"),
        }
    }
}

fn arity(name: &str, expected: usize, found: usize) -> FixtureNameError {
    FixtureNameError::Arity {
        name: name.to_string(),
        expected,
        found,
    }
}

fn argument<T: FromStr>(name: &str, raw: &str) -> Result<T, FixtureNameError> {
    raw.parse().map_err(|_| FixtureNameError::BadArgument {
        name: name.to_string(),
        argument: raw.to_string(),
    })
}
