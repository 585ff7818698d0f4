//! Up-front decisions and the optional feature stages

use super::{Flow, InstallationPipeline, PipelineState};
use crate::env_file::{self, DatabaseEngine};
use crate::error::{InstallError, Result};
use crate::prompt::Choice;
use crate::runtime::open_in_browser;
use std::fs;

const FLAT_FILE: &str = "flat-file";
const DATABASE: &str = "database";
const EVERYTHING: &str = "everything";
const CUSTOM: &str = "custom";
const STAR_YES: &str = "yes";
const STAR_LATER: &str = "later";

impl InstallationPipeline {
    /// Ask every question whose answer gates a later stage
    pub(super) async fn decide(&self, mut state: PipelineState) -> Result<Flow> {
        state.enable_pro = self.request.pro.unwrap_or(false);
        state.install_ssg = self.request.ssg;

        if self.interactive() {
            self.ask_storage(&mut state)?;
            self.ask_pro(&mut state)?;
            self.ask_static_site(&mut state)?;
        }

        self.decide_super_user(&mut state)?;
        self.decide_git(&mut state).await?;

        if self.interactive() {
            self.ask_to_spread_joy()?;
        }

        Ok(Flow::Continue(state))
    }

    fn ask_storage(&self, state: &mut PipelineState) -> Result<()> {
        let choice = self.prompter.select(
            "Where do you want to store your content and data?",
            &[
                Choice::new(FLAT_FILE, "Flat Files")
                    .hint("When in doubt, choose Flat Files. You can always change this later."),
                Choice::new(DATABASE, "Database"),
            ],
            FLAT_FILE,
        )?;
        state.configure_database = choice == DATABASE;
        Ok(())
    }

    fn ask_pro(&self, state: &mut PipelineState) -> Result<()> {
        if self.request.pro.is_some() {
            return Ok(());
        }

        state.enable_pro = self.prompter.confirm(
            &format!("Do you want to enable {} Pro?", self.config.display_name()),
            true,
        )?;
        if state.enable_pro {
            self.sink.info(
                "Before your site goes live, you will need to purchase a license on statamic.com.",
            );
        }
        Ok(())
    }

    fn ask_static_site(&self, state: &mut PipelineState) -> Result<()> {
        if state.install_ssg {
            return Ok(());
        }
        state.install_ssg = self
            .prompter
            .confirm("Do you plan to generate a static site?", false)?;
        Ok(())
    }

    fn ask_to_spread_joy(&self) -> Result<()> {
        let repository = self.config.repository_url();
        let choice = self.prompter.select(
            &format!(
                "Would you like to spread the joy of {} by starring the repo?",
                self.config.display_name()
            ),
            &[
                Choice::new(STAR_YES, "Absolutely"),
                Choice::new(STAR_LATER, "Maybe later"),
            ],
            STAR_LATER,
        )?;

        if choice == STAR_YES {
            open_in_browser(repository);
        } else {
            self.sink.info(&format!(
                "No problem. You can do it at {} anytime.",
                repository.trim_start_matches("https://")
            ));
        }
        Ok(())
    }

    pub(super) async fn configure_database(&self, mut state: PipelineState) -> Result<Flow> {
        if !state.configure_database || !state.base_install_successful {
            return Ok(Flow::Skip(state));
        }

        let modules = self
            .tools
            .interpreter_modules(self.config.interpreter())
            .await;
        let options = env_file::database_options(&modules);
        let default = options
            .first()
            .map(|(engine, _)| *engine)
            .unwrap_or(DatabaseEngine::Sqlite);

        let engine = if self.interactive() {
            let choices: Vec<Choice> = options
                .iter()
                .map(|(engine, label)| Choice::new(engine.key(), label.as_str()))
                .collect();
            let key = self.prompter.select(
                "Which database will your application use?",
                &choices,
                default.key(),
            )?;
            DatabaseEngine::from_key(&key).unwrap_or(default)
        } else {
            default
        };
        tracing::debug!(%engine, "configuring database connection");

        let project = &self.request.absolute_path;
        env_file::configure_database_connection(project, engine, &self.request.name)?;
        if engine == DatabaseEngine::Sqlite {
            let database = project.join("database");
            fs::create_dir_all(&database)?;
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(database.join("database.sqlite"))?;
        }
        state.database = Some(engine);

        let mut args = vec!["migrate".to_string()];
        self.no_interaction_flag(&mut args);
        if self.please().run(&args).await? != 0 {
            state.configure_database = false;
            self.sink
                .error("There was a problem connecting to the database.");
            self.finish_database_later();
            return Ok(Flow::Continue(state));
        }

        let mut args = vec![
            "install:eloquent-driver".to_string(),
            "--import".to_string(),
            "--without-messages".to_string(),
        ];
        let everything = !self.interactive()
            || self.prompter.select(
                "Do you want to store everything in the database, or just some things?",
                &[
                    Choice::new(EVERYTHING, "Everything"),
                    Choice::new(CUSTOM, "Let me choose"),
                ],
                EVERYTHING,
            )? == EVERYTHING;
        if everything {
            args.push("--all".to_string());
        }

        if self.please().run(&args).await? != 0 {
            state.configure_database = false;
            self.sink
                .warning("The content could not be moved to the database.");
            self.finish_database_later();
            return Ok(Flow::Continue(state));
        }
        self.sink.success("Database setup complete!");

        Ok(Flow::Continue(state))
    }

    fn finish_database_later(&self) {
        self.sink.info(&format!(
            "Once the install process is complete, please run {} {} install:eloquent-driver to finish setting up the database.",
            self.config.interpreter(),
            self.config.entrypoint()
        ));
    }

    pub(super) async fn enable_pro(&self, state: PipelineState) -> Result<Flow> {
        if !state.enable_pro || !state.base_install_successful {
            return Ok(Flow::Skip(state));
        }

        let code = self.please().run(&["pro:enable"]).await?;
        if code != 0 {
            return Err(InstallError::process(
                format!(
                    "There was a problem enabling {} Pro!",
                    self.config.display_name()
                ),
                code,
            ));
        }
        Ok(Flow::Continue(state))
    }

    pub(super) async fn install_static_site(&self, state: PipelineState) -> Result<Flow> {
        if !state.install_ssg || !state.base_install_successful {
            return Ok(Flow::Skip(state));
        }

        self.sink.intro("Installing the Static Site Generator addon...");
        let code = self.please().run(&["install:ssg"]).await?;
        if code != 0 {
            return Err(InstallError::process(
                "There was a problem installing the Static Site Generator addon!",
                code,
            ));
        }
        Ok(Flow::Continue(state))
    }
}
