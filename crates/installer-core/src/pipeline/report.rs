//! Final summary and post-install instructions

use super::{Flow, InstallationPipeline, PipelineState};
use crate::error::Result;
use crate::release::upgrade_notice;
use std::fs;

impl InstallationPipeline {
    pub(super) fn report(&self, state: PipelineState) -> Result<Flow> {
        if let Some(latest) = &state.update_available {
            for line in upgrade_notice(latest, self.config.upgrade_command()) {
                self.sink.warning(&line);
            }
        }

        self.sink.success(&format!(
            "{} was installed successfully!",
            self.config.display_name()
        ));
        self.sink.info(&format!(
            "You may now enter your project directory using cd {},",
            self.request.relative_path
        ));
        self.sink
            .info("The documentation is always available at statamic.dev and you can");
        self.sink
            .info("join the community on Discord at statamic.com/discord anytime.");
        self.sink
            .info("Now go, it's time to create something wonderful! 🌟");

        let instructions = self
            .request
            .absolute_path
            .join(self.config.post_install_instructions());
        if let Ok(contents) = fs::read_to_string(&instructions) {
            self.sink.line("");
            for line in contents.lines() {
                self.sink.warning(line.trim());
            }
        }

        Ok(Flow::Continue(state))
    }
}
