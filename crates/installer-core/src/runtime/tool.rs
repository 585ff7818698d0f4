//! Detection of the external tools the installer leans on
//!
//! Every probe is a short, silent process run through the injected
//! [`CommandExecutor`], so tests can answer them without touching the host.

use crate::environment::Environment;
use crate::runtime::process::CommandExecutor;
use std::sync::Arc;

/// Branch used when git has no `init.defaultBranch` configured
pub const FALLBACK_BRANCH: &str = "main";

/// Probes for git, the GitHub CLI and the PHP interpreter
#[derive(Clone)]
pub struct ToolProbe {
    executor: Arc<dyn CommandExecutor>,
}

impl ToolProbe {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Check if git is available in PATH
    pub async fn git_installed(&self) -> bool {
        self.executor
            .probe("git", &["--version"], None)
            .await
            .success()
    }

    /// Check if the GitHub CLI is installed and authenticated
    pub async fn gh_authenticated(&self) -> bool {
        self.executor
            .probe("gh", &["auth", "status"], None)
            .await
            .success()
    }

    /// The global default branch name, or [`FALLBACK_BRANCH`]
    pub async fn default_branch(&self) -> String {
        let result = self
            .executor
            .probe("git", &["config", "--global", "init.defaultBranch"], None)
            .await;

        match result.first_line() {
            Some(branch) if result.success() => branch.to_string(),
            _ => FALLBACK_BRANCH.to_string(),
        }
    }

    /// Lower-cased names of the interpreter's loaded extensions.
    /// Empty when the interpreter cannot be run.
    pub async fn interpreter_modules(&self, interpreter: &str) -> Vec<String> {
        let result = self.executor.probe(interpreter, &["-m"], None).await;
        if !result.success() {
            return Vec::new();
        }
        result
            .output
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('['))
            .map(|l| l.to_lowercase())
            .collect()
    }
}

/// Composer invocation for this working directory: a local `composer.phar`
/// run through the interpreter, otherwise `composer` from PATH
pub fn find_composer(env: &Environment, interpreter: &str) -> String {
    let phar = env.cwd.join("composer.phar");
    if phar.is_file() {
        format!("\"{}\" \"{}\"", interpreter, phar.display())
    } else {
        "composer".to_string()
    }
}

/// Open a URL in the default browser; failures are only logged
pub fn open_in_browser(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::debug!(url, "could not open browser: {}", e);
    }
}
