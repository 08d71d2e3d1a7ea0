//! Per-run process environment.
//!
//! The environment variables are copied once at startup and only changed
//! through this type. The working directory is tracked here too: stages
//! move it to the build directory, every spawned tool inherits it, and the
//! orchestrator restores it when the run ends.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::Platform;
use crate::util::process::ProcessBuilder;

#[derive(Debug, Clone)]
pub struct BuildEnv {
    vars: BTreeMap<String, String>,
    path_separator: char,
    working_dir: PathBuf,
}

impl BuildEnv {
    pub fn from_vars(
        platform: Platform,
        vars: impl IntoIterator<Item = (String, String)>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        BuildEnv {
            vars: vars.into_iter().collect(),
            path_separator: platform.path_separator(),
            working_dir: working_dir.into(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Put `dir` in front of the existing PATH entries.
    pub fn prepend_path(&mut self, dir: &Path) {
        let dir = dir.display().to_string();
        let key = self.path_key();
        let value = match self.vars.get(&key) {
            Some(existing) if !existing.is_empty() => {
                format!("{}{}{}", dir, self.path_separator, existing)
            }
            _ => dir,
        };
        self.vars.insert(key, value);
    }

    /// Current PATH value, empty when unset.
    pub fn path_var(&self) -> &str {
        self.get(&self.path_key()).unwrap_or_default()
    }

    /// Windows keeps the original spelling of `Path`; reuse it when present.
    fn path_key(&self) -> String {
        self.vars
            .keys()
            .find(|k| k.eq_ignore_ascii_case("PATH"))
            .cloned()
            .unwrap_or_else(|| "PATH".to_string())
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn set_working_dir(&mut self, dir: impl Into<PathBuf>) {
        self.working_dir = dir.into();
    }

    /// A process builder that runs `program` in this environment.
    pub fn command(&self, program: impl AsRef<Path>) -> ProcessBuilder {
        self.apply(ProcessBuilder::new(program))
    }

    /// Bind an already-assembled command to this environment.
    pub fn apply(&self, cmd: ProcessBuilder) -> ProcessBuilder {
        cmd.env_exact(&self.vars).cwd(&self.working_dir)
    }
}
