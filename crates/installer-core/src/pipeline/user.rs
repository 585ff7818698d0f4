//! Super user creation

use super::validate;
use super::{Flow, InstallationPipeline, PipelineState};
use crate::error::Result;

const DEFAULT_PASSWORD: &str = "password";

impl InstallationPipeline {
    pub(super) fn decide_super_user(&self, state: &mut PipelineState) -> Result<()> {
        if self.request.super_user.email.is_some() {
            state.make_user = true;
            return Ok(());
        }
        if !self.interactive() {
            return Ok(());
        }

        state.make_user = self.prompter.confirm("Create a super user?", false)?;
        if state.make_user {
            self.sink
                .info("Great. You'll be prompted for details after installation.");
        } else {
            self.sink.info(&format!(
                "No problem. You can create one later with {} {} make:user.",
                self.config.interpreter(),
                self.config.entrypoint()
            ));
        }
        Ok(())
    }

    /// Arguments for `make:user`
    pub fn make_user_args(&self, email: Option<&str>, password: Option<&str>) -> Vec<String> {
        let mut args = vec!["make:user".to_string()];
        if let Some(email) = email {
            args.push(email.to_string());
            args.push(format!(
                "--password={}",
                password.unwrap_or(DEFAULT_PASSWORD)
            ));
        }
        args.push("--super".to_string());
        self.no_interaction_flag(&mut args);
        args
    }

    /// The child cannot be trusted to prompt through the terminal, so the
    /// details are collected here and passed as arguments instead
    fn collects_credentials(&self) -> bool {
        self.interactive()
            && self.request.super_user.email.is_none()
            && (self.env.platform.is_windows() || !self.env.tty)
    }

    pub(super) async fn make_super_user(&self, state: PipelineState) -> Result<Flow> {
        if !state.make_user || !state.base_install_successful {
            return Ok(Flow::Skip(state));
        }

        let provided = &self.request.super_user;
        if provided.email.is_none() {
            self.sink.intro("Let's create your super user account.");
        }

        let args = if self.collects_credentials() {
            let email = self.prompter.text("Email", None, Some(validate::email))?;
            let password = self.prompter.password(
                "Password (Your input will be hidden)",
                Some(validate::password),
            )?;
            self.make_user_args(Some(email.trim()), Some(&password))
        } else {
            self.make_user_args(provided.email.as_deref(), provided.password.as_deref())
        };

        let code = self.please().run(&args).await?;
        if code != 0 {
            self.sink.warning(&format!(
                "The super user could not be created. You can create one later with {} {} make:user.",
                self.config.interpreter(),
                self.config.entrypoint()
            ));
        }
        Ok(Flow::Continue(state))
    }
}
