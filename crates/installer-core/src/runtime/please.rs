//! Bridge to the generated application's own command runner
//!
//! Statamic projects ship a `please` script. It is run through the
//! interpreter from the project directory, attached to the terminal when
//! possible, and its exit code is handed back untouched.

use crate::error::{InstallError, Result};
use crate::product::ProductConfig;
use crate::runtime::process::CommandExecutor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Layout of an existing project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectShape {
    /// Archive-installed project: marker directory plus entrypoint
    Legacy,
    /// Package-manager scaffolded project: entrypoint at the root
    Current,
}

/// Runs sub-commands of the application's entrypoint
pub struct Please {
    executor: Arc<dyn CommandExecutor>,
    interpreter: String,
    entrypoint: String,
    legacy_marker: String,
    display_name: String,
    cwd: PathBuf,
}

impl Please {
    pub fn new<C: ProductConfig + ?Sized>(
        config: &C,
        executor: Arc<dyn CommandExecutor>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executor,
            interpreter: config.interpreter().to_string(),
            entrypoint: config.entrypoint().to_string(),
            legacy_marker: config.legacy_marker().to_string(),
            display_name: config.display_name().to_string(),
            cwd: cwd.into(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Detect the project shape with a pure filesystem probe
    pub fn shape(&self) -> Option<ProjectShape> {
        detect_shape(&self.cwd, &self.entrypoint, &self.legacy_marker)
    }

    pub fn is_legacy(&self) -> bool {
        self.shape() == Some(ProjectShape::Legacy)
    }

    /// Run `<interpreter> <entrypoint> <args...>` and return its exit code
    pub async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<i32> {
        if !self.cwd.join(&self.entrypoint).is_file() {
            return Err(InstallError::precondition(format!(
                "This does not appear to be a {} project.",
                self.display_name
            )));
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(self.entrypoint.clone());
        argv.extend(args.iter().map(|a| a.as_ref().to_string()));

        let result = self
            .executor
            .run_program(&self.interpreter, &argv, &self.cwd)
            .await?;

        Ok(result.exit_code)
    }
}

/// Classify a directory by its entrypoint and legacy marker
pub fn detect_shape(dir: &Path, entrypoint: &str, legacy_marker: &str) -> Option<ProjectShape> {
    if !dir.join(entrypoint).is_file() {
        return None;
    }
    if dir.join(legacy_marker).is_dir() {
        Some(ProjectShape::Legacy)
    } else {
        Some(ProjectShape::Current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detect_shape_current() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("please"), "").unwrap();

        assert_eq!(
            detect_shape(dir.path(), "please", "statamic"),
            Some(ProjectShape::Current)
        );
    }

    #[test]
    fn test_detect_shape_legacy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("please"), "").unwrap();
        fs::create_dir(dir.path().join("statamic")).unwrap();

        assert_eq!(
            detect_shape(dir.path(), "please", "statamic"),
            Some(ProjectShape::Legacy)
        );
    }

    #[test]
    fn test_detect_shape_requires_entrypoint() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("statamic")).unwrap();

        assert_eq!(detect_shape(dir.path(), "please", "statamic"), None);
    }
}
