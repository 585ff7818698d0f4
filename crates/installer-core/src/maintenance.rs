//! `update` and `version` for an existing project in the working directory

use crate::environment::Environment;
use crate::error::Result;
use crate::output::OutputSink;
use crate::product::ProductConfig;
use crate::runtime::{find_composer, CommandExecutor, Please, ProjectShape};
use std::sync::Arc;

/// Commands that operate on the project in the working directory
pub struct Maintenance {
    config: Arc<dyn ProductConfig>,
    env: Environment,
    executor: Arc<dyn CommandExecutor>,
    sink: Arc<dyn OutputSink>,
}

impl Maintenance {
    pub fn new(
        config: Arc<dyn ProductConfig>,
        env: Environment,
        executor: Arc<dyn CommandExecutor>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            config,
            env,
            executor,
            sink,
        }
    }

    fn please(&self) -> Please {
        Please::new(&*self.config, self.executor.clone(), &self.env.cwd)
    }

    /// Composer command updating the framework package
    pub fn update_command(&self) -> String {
        format!(
            "{} update {} --with-dependencies",
            find_composer(&self.env, self.config.interpreter()),
            self.config.update_package()
        )
    }

    /// Update the project; returns the exit code of the update process
    pub async fn update(&self) -> Result<i32> {
        let please = self.please();
        if please.shape() == Some(ProjectShape::Legacy) {
            return please.run(&["update"]).await;
        }

        self.sink.warning(
            "NOTE: If you have previously updated using the CP, you may need to update the version in your composer.json before running this update!",
        );
        let result = self
            .executor
            .run_commands(&[self.update_command()], None, false)
            .await?;
        Ok(result.exit_code)
    }

    /// Print the installed framework version
    pub async fn version(&self) -> Result<i32> {
        let please = self.please();
        let flag = match please.shape() {
            Some(ProjectShape::Legacy) => "version",
            _ => "--version",
        };
        please.run(&[flag]).await
    }
}
