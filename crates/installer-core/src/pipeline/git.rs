//! Repository initialisation and the optional GitHub push

use super::request::Visibility;
use super::{Flow, InstallationPipeline, PipelineState};
use crate::error::Result;
use crate::prompt::{self, Choice};
use crate::runtime::quote_arg;

impl InstallationPipeline {
    pub(super) async fn decide_git(&self, state: &mut PipelineState) -> Result<()> {
        let github = self.request.github.as_ref();
        state.initialize_git = self.request.git || github.is_some();
        state.push_to_github = github.is_some();
        state.github_repository = github.and_then(|g| g.repository.clone());
        state.visibility = github.and_then(|g| g.visibility);

        if !self.interactive() || !self.tools.git_installed().await {
            return Ok(());
        }

        if !state.initialize_git {
            state.initialize_git = self
                .prompter
                .confirm("Would you like to initialize a Git repository?", false)?;
        }

        if !state.initialize_git || state.push_to_github || !self.tools.gh_authenticated().await {
            return Ok(());
        }

        state.push_to_github = self
            .prompter
            .confirm("Would you like to create a new repository on GitHub?", false)?;
        if !state.push_to_github {
            return Ok(());
        }

        if state.github_repository.is_none() {
            state.github_repository = Some(self.prompter.text(
                "What should be your full repository name?",
                Some(self.request.name.as_str()),
                Some(prompt::required),
            )?);
        }

        if state.visibility.is_none() {
            let choice = self.prompter.select(
                "Should the repository be public or private?",
                &[
                    Choice::new(Visibility::Public.as_str(), "Public"),
                    Choice::new(Visibility::Private.as_str(), "Private"),
                ],
                Visibility::Private.as_str(),
            )?;
            state.visibility = Visibility::parse(&choice);
        }

        Ok(())
    }

    /// Init, add, commit and branch rename, as one batch
    pub fn git_commands(&self, branch: &str) -> Vec<String> {
        vec![
            "git init -q".to_string(),
            "git add .".to_string(),
            format!(
                "git commit -q -m \"{}\"",
                self.config.initial_commit_message()
            ),
            format!("git branch -M {}", self.quote(branch)),
        ]
    }

    pub fn github_commands(&self, state: &PipelineState) -> Vec<String> {
        let repository = state
            .github_repository
            .as_deref()
            .unwrap_or(&self.request.name);
        let visibility = state.visibility.unwrap_or_default();
        vec![format!(
            "gh repo create {} --source=. --push --{}",
            self.quote(repository),
            visibility
        )]
    }

    fn quote(&self, arg: &str) -> String {
        quote_arg(arg, self.env.platform.is_windows())
    }

    pub(super) async fn initialize_git(&self, state: PipelineState) -> Result<Flow> {
        if !state.initialize_git || !state.base_install_successful {
            return Ok(Flow::Skip(state));
        }
        if !self.tools.git_installed().await {
            tracing::debug!("git not found on PATH, skipping repository setup");
            return Ok(Flow::Skip(state));
        }

        let branch = match &self.request.branch {
            Some(branch) if !branch.is_empty() => branch.clone(),
            _ => self.tools.default_branch().await,
        };

        let project = self.request.absolute_path.as_path();
        let result = self
            .executor
            .run_commands(&self.git_commands(&branch), Some(project), false)
            .await?;
        if !result.success() {
            self.sink
                .warning("The Git repository could not be initialized.");
            return Ok(Flow::Continue(state));
        }

        if state.push_to_github {
            let result = self
                .executor
                .run_commands(&self.github_commands(&state), Some(project), true)
                .await?;
            if !result.success() {
                self.sink
                    .warning("The GitHub repository could not be created.");
            }
        }

        Ok(Flow::Continue(state))
    }
}
