//! Shared fixtures for the integration tests
//!
//! The fixture product scaffolds with a local shell script instead of the
//! package manager, and its `please` entrypoint is a shell script too, so
//! whole installs run offline against a temporary directory.

#![allow(dead_code)]

use async_trait::async_trait;
use installer_core::marketplace::{KitDetails, KitListing};
use installer_core::prompt::Validator;
use installer_core::{
    Choice, CommandExecutor, Environment, InstallError, Marketplace, MemorySink, Platform,
    ProcessResult, ProductConfig, Prompter, Result, ShellRunner,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Product whose scaffold and entrypoint are local shell scripts
pub struct FixtureProduct {
    scaffold_script: PathBuf,
}

impl FixtureProduct {
    /// Write the scaffold script into `dir`.
    /// `please` sub-commands named in `failing` exit with status 1.
    pub fn new(dir: &Path, failing: &[&str]) -> Self {
        let failing = if failing.is_empty() {
            "__none__".to_string()
        } else {
            failing.join("|")
        };
        let script = format!(
            r#"set -e
dir="$1"
mkdir -p "$dir/vendor"
cd "$dir"
echo '{{"name": "statamic/statamic"}}' > composer.json
cat > .env <<'EOF'
APP_NAME=Statamic
APP_URL=http://localhost
DB_CONNECTION=mysql
DB_HOST=127.0.0.1
DB_PORT=3306
DB_DATABASE=laravel
EOF
cp .env .env.example
touch artisan
cat > please <<'EOF'
echo "$*" >> please.log
case "$1" in
  {failing}) exit 1 ;;
esac
exit 0
EOF
"#
        );
        let scaffold_script = dir.join("scaffold.sh");
        fs::write(&scaffold_script, script).unwrap();
        Self { scaffold_script }
    }
}

impl ProductConfig for FixtureProduct {
    fn display_name(&self) -> &'static str {
        "Statamic"
    }

    fn base_package(&self) -> &'static str {
        "statamic/statamic"
    }

    fn update_package(&self) -> &'static str {
        "statamic/cms"
    }

    fn interpreter(&self) -> &'static str {
        "sh"
    }

    fn entrypoint(&self) -> &'static str {
        "please"
    }

    fn legacy_marker(&self) -> &'static str {
        "statamic"
    }

    fn executable_scripts(&self) -> &'static [&'static str] {
        &["artisan", "please"]
    }

    fn install_markers(&self) -> &'static [&'static str] {
        &["composer.json", "vendor/", "artisan", "please"]
    }

    fn create_project_command(&self, _composer: &str, directory: &str, _version: &str) -> String {
        format!("sh \"{}\" \"{}\"", self.scaffold_script.display(), directory)
    }

    fn initial_commit_message(&self) -> &'static str {
        "Set up a fresh Statamic site"
    }

    fn post_install_instructions(&self) -> PathBuf {
        PathBuf::from("storage/statamic/tmp/cli/post-install-instructions.txt")
    }

    fn marketplace_url(&self) -> &'static str {
        "http://127.0.0.1:9/starter-kits/"
    }

    fn marketplace_url_env(&self) -> &'static str {
        "STATAMIC_OUTPOST_URL"
    }

    fn starter_kits_url(&self) -> &'static str {
        "http://127.0.0.1:9/marketplace/starter-kits"
    }

    fn marketplace_page_url(&self) -> &'static str {
        "https://statamic.com/starter-kits"
    }

    fn latest_release_url(&self) -> &'static str {
        "http://127.0.0.1:9/releases/latest"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install statamic-cli"
    }

    fn repository_url(&self) -> &'static str {
        "https://github.com/statamic/cms"
    }

    fn legacy_download_url(&self) -> &'static str {
        "http://127.0.0.1:9/v2"
    }

    fn legacy_archive_root(&self) -> &'static str {
        "statamic"
    }

    fn legacy_writable_dirs(&self) -> &'static [&'static str] {
        &["local", "site", "statamic", "assets"]
    }

    fn home_env(&self) -> &'static str {
        "STATAMIC_HOME"
    }

    fn home_dir_name(&self) -> &'static str {
        ".statamic"
    }
}

/// A call that reached the executor
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Commands(Vec<String>),
    Program(String, Vec<String>),
    Probe(String, Vec<String>),
}

/// Executor that records every call and delegates to a real [`ShellRunner`].
/// Probes are answered with a failure so no host tool is ever detected.
pub struct SpyExecutor {
    inner: ShellRunner,
    calls: Mutex<Vec<Call>>,
}

impl SpyExecutor {
    pub fn new(env: &Environment, sink: Arc<MemorySink>) -> Self {
        Self {
            inner: ShellRunner::new(env.clone(), sink),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of every entrypoint invocation, without the entrypoint itself
    pub fn please_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Program(_, args) => Some(args.into_iter().skip(1).collect()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CommandExecutor for SpyExecutor {
    async fn run_commands(
        &self,
        commands: &[String],
        working_dir: Option<&Path>,
        suppress_output: bool,
    ) -> Result<ProcessResult> {
        self.record(Call::Commands(commands.to_vec()));
        self.inner
            .run_commands(commands, working_dir, suppress_output)
            .await
    }

    async fn run_program(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
    ) -> Result<ProcessResult> {
        self.record(Call::Program(program.to_string(), args.to_vec()));
        self.inner.run_program(program, args, working_dir).await
    }

    async fn probe(
        &self,
        program: &str,
        args: &[&str],
        _working_dir: Option<&Path>,
    ) -> ProcessResult {
        self.record(Call::Probe(
            program.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        ProcessResult {
            exit_code: 1,
            output: Vec::new(),
        }
    }
}

/// Prompter for non-interactive runs: any question is a test failure
pub struct NoPrompts;

impl Prompter for NoPrompts {
    fn select(&self, label: &str, _options: &[Choice], _default: &str) -> Result<String> {
        panic!("unexpected select prompt: {}", label)
    }

    fn confirm(&self, label: &str, _default: bool) -> Result<bool> {
        panic!("unexpected confirm prompt: {}", label)
    }

    fn text(&self, label: &str, _default: Option<&str>, _validate: Option<Validator>) -> Result<String> {
        panic!("unexpected text prompt: {}", label)
    }

    fn password(&self, label: &str, _validate: Option<Validator>) -> Result<String> {
        panic!("unexpected password prompt: {}", label)
    }

    fn suggest(&self, label: &str, _source: &dyn Fn(&str) -> Vec<String>) -> Result<String> {
        panic!("unexpected suggest prompt: {}", label)
    }
}

/// Prompter answering from a script keyed by the exact question.
/// Confirm answers are `"yes"` or `"no"`; unscripted questions fail the test.
pub struct ScriptedPrompter {
    answers: Vec<(&'static str, &'static str)>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[(&'static str, &'static str)]) -> Self {
        Self {
            answers: answers.to_vec(),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Questions in the order they were asked
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    fn answer(&self, label: &str) -> String {
        self.asked.lock().unwrap().push(label.to_string());
        self.answers
            .iter()
            .find(|(question, _)| *question == label)
            .map(|(_, answer)| answer.to_string())
            .unwrap_or_else(|| panic!("unscripted prompt: {}", label))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, label: &str, options: &[Choice], _default: &str) -> Result<String> {
        let answer = self.answer(label);
        assert!(
            options.iter().any(|choice| choice.value == answer),
            "{} is not an option of: {}",
            answer,
            label
        );
        Ok(answer)
    }

    fn confirm(&self, label: &str, _default: bool) -> Result<bool> {
        match self.answer(label).as_str() {
            "yes" => Ok(true),
            "no" => Ok(false),
            other => panic!("confirm answer must be yes or no, got {}", other),
        }
    }

    fn text(&self, label: &str, _default: Option<&str>, _validate: Option<Validator>) -> Result<String> {
        Ok(self.answer(label))
    }

    fn password(&self, label: &str, _validate: Option<Validator>) -> Result<String> {
        Ok(self.answer(label))
    }

    fn suggest(&self, label: &str, _source: &dyn Fn(&str) -> Vec<String>) -> Result<String> {
        Ok(self.answer(label))
    }
}

/// Marketplace with fixed answers
#[derive(Default)]
pub struct FakeMarketplace {
    pub details: Option<KitDetails>,
    pub license_valid: bool,
    pub lookups: Mutex<Vec<String>>,
}

impl FakeMarketplace {
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Marketplace for FakeMarketplace {
    async fn kit_details(&self, kit: &str) -> Result<Option<KitDetails>> {
        self.lookups.lock().unwrap().push(kit.to_string());
        Ok(self.details.clone())
    }

    async fn validate_license(&self, _kit: &str, _license: &str) -> Result<bool> {
        Ok(self.license_valid)
    }

    async fn starter_kits(&self) -> Vec<KitListing> {
        Vec::new()
    }
}

/// Marketplace that must never be consulted
pub struct UnreachableMarketplace;

#[async_trait]
impl Marketplace for UnreachableMarketplace {
    async fn kit_details(&self, _kit: &str) -> Result<Option<KitDetails>> {
        Err(InstallError::service("marketplace should not be consulted"))
    }

    async fn validate_license(&self, _kit: &str, _license: &str) -> Result<bool> {
        Err(InstallError::service("marketplace should not be consulted"))
    }

    async fn starter_kits(&self) -> Vec<KitListing> {
        Vec::new()
    }
}

/// Bare, non-interactive Linux host rooted at `cwd`
pub fn host(cwd: &Path) -> Environment {
    Environment::new(Platform::Linux, cwd)
}

/// Lines of `please.log` in a generated project
pub fn please_log(project: &Path) -> Vec<String> {
    fs::read_to_string(project.join("please.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
