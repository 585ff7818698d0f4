//! The ordered install pipeline
//!
//! An [`InstallationPipeline`] turns an [`InstallRequest`] into a configured
//! project by walking [`Stage::ORDER`]. Every stage receives the
//! [`PipelineState`] by value and hands it back through a [`Flow`]:
//!
//! - `Continue` / `Skip`: pass the state on to the next stage
//! - `Declined`: the user chose to stop; the run ends without an error
//! - `Err(_)`: fatal; nothing after the failing stage runs

mod features;
mod git;
mod install;
pub mod lock;
pub mod request;
mod report;
pub mod starter_kit;
pub mod state;
mod user;
pub mod validate;

pub use lock::InstallLock;
pub use request::{GithubTarget, InstallRequest, StarterKitFlags, SuperUser, Visibility};
pub use state::PipelineState;

use crate::environment::Environment;
use crate::error::Result;
use crate::marketplace::Marketplace;
use crate::output::OutputSink;
use crate::product::ProductConfig;
use crate::prompt::Prompter;
use crate::runtime::{CommandExecutor, Please, ToolProbe};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Named pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    ResolveStarterKit,
    LicenseCheck,
    Decide,
    BaseInstall,
    ApplyStarterKit,
    Database,
    Pro,
    StaticSite,
    SuperUser,
    VersionControl,
    Report,
}

impl Stage {
    pub const ORDER: [Stage; 12] = [
        Stage::Validate,
        Stage::ResolveStarterKit,
        Stage::LicenseCheck,
        Stage::Decide,
        Stage::BaseInstall,
        Stage::ApplyStarterKit,
        Stage::Database,
        Stage::Pro,
        Stage::StaticSite,
        Stage::SuperUser,
        Stage::VersionControl,
        Stage::Report,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::ResolveStarterKit => "resolve-starter-kit",
            Stage::LicenseCheck => "license-check",
            Stage::Decide => "decide",
            Stage::BaseInstall => "base-install",
            Stage::ApplyStarterKit => "apply-starter-kit",
            Stage::Database => "database",
            Stage::Pro => "pro",
            Stage::StaticSite => "static-site",
            Stage::SuperUser => "super-user",
            Stage::VersionControl => "version-control",
            Stage::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a stage did with the state
#[derive(Debug)]
pub enum Flow {
    Continue(PipelineState),
    /// Precondition unmet; the state passes through untouched
    Skip(PipelineState),
    /// The user declined a confirmation; stop quietly
    Declined,
}

/// How a run ended when no stage failed
#[derive(Debug)]
pub enum Outcome {
    Installed(PipelineState),
    Declined,
}

/// One install run and its collaborators
pub struct InstallationPipeline {
    config: Arc<dyn ProductConfig>,
    env: Environment,
    request: InstallRequest,
    executor: Arc<dyn CommandExecutor>,
    prompter: Arc<dyn Prompter>,
    marketplace: Arc<dyn Marketplace>,
    sink: Arc<dyn OutputSink>,
    tools: ToolProbe,
    lock_dir: PathBuf,
    update_available: Option<String>,
}

impl InstallationPipeline {
    pub fn new(
        config: Arc<dyn ProductConfig>,
        env: Environment,
        request: InstallRequest,
        executor: Arc<dyn CommandExecutor>,
        prompter: Arc<dyn Prompter>,
        marketplace: Arc<dyn Marketplace>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            config,
            env,
            request,
            tools: ToolProbe::new(executor.clone()),
            executor,
            prompter,
            marketplace,
            sink,
            lock_dir: std::env::temp_dir(),
            update_available: None,
        }
    }

    /// Directory holding per-target install locks
    pub fn lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = dir.into();
        self
    }

    /// Newer CLI release to mention in the report
    pub fn update_available(mut self, version: Option<String>) -> Self {
        self.update_available = version;
        self
    }

    pub fn request(&self) -> &InstallRequest {
        &self.request
    }

    /// Run every stage in order
    pub async fn run(&self) -> Result<Outcome> {
        let _lock = InstallLock::acquire(&self.lock_dir, &self.request.absolute_path)?;

        let mut state = PipelineState {
            update_available: self.update_available.clone(),
            ..Default::default()
        };

        for stage in Stage::ORDER {
            tracing::debug!(%stage, "entering stage");
            state = match self.run_stage(stage, state).await? {
                Flow::Continue(state) => state,
                Flow::Skip(state) => {
                    tracing::debug!(%stage, "stage skipped");
                    state
                }
                Flow::Declined => {
                    tracing::debug!(%stage, "installation declined");
                    return Ok(Outcome::Declined);
                }
            };
        }

        Ok(Outcome::Installed(state))
    }

    async fn run_stage(&self, stage: Stage, state: PipelineState) -> Result<Flow> {
        match stage {
            Stage::Validate => {
                validate::validate_request(&self.env, &self.request)?;
                Ok(Flow::Continue(state))
            }
            Stage::ResolveStarterKit => self.resolve_starter_kit(state).await,
            Stage::LicenseCheck => self.check_license(state).await,
            Stage::Decide => self.decide(state).await,
            Stage::BaseInstall => self.install_base_project(state).await,
            Stage::ApplyStarterKit => self.apply_starter_kit(state).await,
            Stage::Database => self.configure_database(state).await,
            Stage::Pro => self.enable_pro(state).await,
            Stage::StaticSite => self.install_static_site(state).await,
            Stage::SuperUser => self.make_super_user(state).await,
            Stage::VersionControl => self.initialize_git(state).await,
            Stage::Report => self.report(state),
        }
    }

    /// Bridge to the new project's entrypoint
    fn please(&self) -> Please {
        Please::new(
            &*self.config,
            self.executor.clone(),
            &self.request.absolute_path,
        )
    }

    fn interactive(&self) -> bool {
        self.env.interactive
    }

    /// `--no-interaction` when prompts are disabled
    fn no_interaction_flag(&self, args: &mut Vec<String>) {
        if !self.interactive() {
            args.push("--no-interaction".to_string());
        }
    }
}
