//! Per-case directory layout.
//!
//! ```text
//! csv            dataset
//! in             queries, one per line
//! out, plan      reference result stream and plan lines
//! user.out       engine stdout
//! user.err       engine stderr
//! user.<family>  stderr lines of one diagnostic family
//! diff.<name>    golden mismatch report
//! ```

use crate::HarnessError;
use planty_oracle::{extract::DiagnosticFamily, generate::Fixture};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

pub const DATASET_FILE: &str = "csv";
pub const QUERY_FILE: &str = "in";
pub const OUTPUT_FILE: &str = "out";
pub const PLAN_FILE: &str = "plan";

///
/// CaseDir
///

#[derive(Debug)]
pub struct CaseDir {
    root: PathBuf,
    temp: Option<TempDir>,
}

impl CaseDir {
    /// Fresh temporary directory, removed on drop unless [`Self::keep`]
    /// is called.
    pub fn temporary(name: &str, case_root: Option<&Path>) -> Result<Self, HarnessError> {
        let prefix = format!("planty-{name}-");
        let temp = match case_root {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|err| HarnessError::io(parent, err))?;
                TempDir::with_prefix_in(&prefix, parent)
                    .map_err(|err| HarnessError::io(parent, err))?
            }
            None => TempDir::with_prefix(&prefix)
                .map_err(|err| HarnessError::io(std::env::temp_dir(), err))?,
        };

        Ok(Self {
            root: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    /// Persistent directory at `path`, created if needed.
    pub fn create_at(path: impl Into<PathBuf>) -> Result<Self, HarnessError> {
        let root = path.into();
        fs::create_dir_all(&root).map_err(|err| HarnessError::io(&root, err))?;

        Ok(Self { root, temp: None })
    }

    /// Existing directory at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HarnessError> {
        let root = path.into();
        if !root.is_dir() {
            return Err(HarnessError::NoCase(root));
        }

        Ok(Self { root, temp: None })
    }

    /// Stop deleting the directory on drop and return its path.
    #[must_use]
    pub fn keep(mut self) -> PathBuf {
        if let Some(temp) = self.temp.take() {
            let _ = temp.keep();
        }

        self.root
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    #[must_use]
    pub fn dataset(&self) -> PathBuf {
        self.root.join(DATASET_FILE)
    }

    #[must_use]
    pub fn queries(&self) -> PathBuf {
        self.root.join(QUERY_FILE)
    }

    #[must_use]
    pub fn user_out(&self) -> PathBuf {
        self.root.join(format!("user.{OUTPUT_FILE}"))
    }

    #[must_use]
    pub fn user_err(&self) -> PathBuf {
        self.root.join("user.err")
    }

    /// Reference file for a stream name (`out`, `plan`, ...).
    #[must_use]
    pub fn reference(&self, stream: &str) -> PathBuf {
        self.root.join(stream)
    }

    /// Engine-side file for a stream name.
    #[must_use]
    pub fn user(&self, stream: &str) -> PathBuf {
        self.root.join(format!("user.{stream}"))
    }

    #[must_use]
    pub fn diff(&self, stream: &str) -> PathBuf {
        self.root.join(format!("diff.{stream}"))
    }

    /// Write dataset, queries and the reference `out` / `plan` files.
    pub fn write_fixture(&self, fixture: &Fixture) -> Result<(), HarnessError> {
        write(&self.dataset(), &fixture.dataset_text())?;
        write(&self.queries(), &fixture.query_text())?;
        write(
            &self.reference(OUTPUT_FILE),
            &fixture.expected_output_text(),
        )?;
        write(&self.reference(PLAN_FILE), &fixture.expected_plan_text())
    }

    /// Split `user.err` into one `user.<family>` file per family.
    pub fn write_family_splits(&self) -> Result<(), HarnessError> {
        let lines = read_lines(&self.user_err())?;

        for (family, lines) in planty_oracle::extract::split_families(&lines) {
            write(&self.user(&family.to_string()), &join_lines(&lines))?;
        }

        Ok(())
    }

    /// Lines of `user.<family>`, splitting `user.err` on the fly when the
    /// family file is missing.
    pub fn family_lines(&self, family: DiagnosticFamily) -> Result<Vec<String>, HarnessError> {
        let path = self.user(&family.to_string());
        if path.is_file() {
            return read_lines(&path);
        }

        let lines = read_lines(&self.user_err())?;

        Ok(planty_oracle::extract::split_families(&lines)
            .remove(&family)
            .unwrap_or_default())
    }
}

/// Lines of a text file; a missing file reads as empty.
pub fn read_lines(path: &Path) -> Result<Vec<String>, HarnessError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text.lines().map(str::to_string).collect()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(HarnessError::io(path, err)),
    }
}

pub(crate) fn write(path: &Path, text: &str) -> Result<(), HarnessError> {
    fs::write(path, text).map_err(|err| HarnessError::io(path, err))
}

pub(crate) fn join_lines(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

///
/// TESTS
///
