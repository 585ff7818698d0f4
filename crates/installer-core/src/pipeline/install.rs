//! Base project scaffold

use super::validate::base_install_complete;
use super::{Flow, InstallationPipeline, PipelineState};
use crate::env_file;
use crate::error::{InstallError, Result};
use crate::runtime::find_composer;

impl InstallationPipeline {
    /// Command batch for the base install, run as one AND-chain
    pub fn base_install_commands(&self) -> Vec<String> {
        let absolute = self.request.absolute_path.display().to_string();
        let windows = self.env.platform.is_windows();
        let mut commands = Vec::new();

        if self.request.force && !self.request.path_is_cwd(&self.env) {
            commands.push(if windows {
                format!("rd /s /q \"{}\"", absolute)
            } else {
                format!("rm -rf \"{}\"", absolute)
            });
        }

        let composer = find_composer(&self.env, self.config.interpreter());
        let version = if self.request.dev {
            self.config.dev_version()
        } else {
            ""
        };
        commands.push(self.config.create_project_command(
            &composer,
            self.request.scaffold_directory(&self.env),
            version,
        ));

        if !windows {
            for script in self.config.executable_scripts() {
                commands.push(format!("chmod 755 \"{}/{}\"", absolute, script));
            }
        }

        commands
    }

    pub(super) async fn install_base_project(&self, mut state: PipelineState) -> Result<Flow> {
        let commands = self.base_install_commands();
        let result = self.executor.run_commands(&commands, None, false).await?;

        // A zero exit is not enough: an interrupted scaffold can exit cleanly
        if !base_install_complete(&*self.config, &self.request) {
            return Err(InstallError::process(
                format!(
                    "There was a problem installing {}!",
                    self.config.display_name()
                ),
                result.exit_code,
            ));
        }

        env_file::apply_project_defaults(
            &self.request.absolute_path,
            &self.request.name,
            self.config.local_tld(),
        )?;

        state.base_install_successful = true;
        Ok(Flow::Continue(state))
    }
}
