//! Statamic CLI - Create and maintain Statamic projects

mod config;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::Colorize;
use config::{StatamicConfig, LOG_ENV};
use installer_core::legacy::download::{DownloadProgress, NoProgress};
use installer_core::pipeline::validate;
use installer_core::pipeline::{GithubTarget, StarterKitFlags, SuperUser, Visibility};
use installer_core::release::{check_for_update, upgrade_notice};
use installer_core::tui::{prompter_for, CliclackProgress};
use installer_core::{
    CommandExecutor, ConsoleSink, Environment, HttpMarketplace, InstallError, InstallRequest,
    InstallationPipeline, LegacyInstaller, Maintenance, OutputSink, ProductConfig, Prompter,
    ShellRunner, VersionChannel,
};
use std::process;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI version - compared against the latest release for the upgrade notice
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "statamic")]
#[command(about = "Create and maintain Statamic projects")]
#[command(version)]
pub struct Args {
    /// Do not output any message from spawned commands
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable ANSI output
    #[arg(long = "no-ansi", global = true)]
    pub no_ansi: bool,

    /// Do not ask any interactive question
    #[arg(short = 'n', long = "no-interaction", global = true)]
    pub no_interaction: bool,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new Statamic application
    New(NewArgs),
    /// Update the current directory's Statamic install to the latest version
    Update,
    /// Get the version of Statamic installed in the current directory
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct NewArgs {
    /// Statamic application directory name
    pub name: Option<String>,

    /// Optionally install specific starter kit
    pub starter_kit: Option<String>,

    /// Installs the latest "development" release
    #[arg(long)]
    pub dev: bool,

    /// Optionally provide explicit starter kit license
    #[arg(long)]
    pub license: Option<String>,

    /// Optionally install from local repo configured in composer config.json
    #[arg(long)]
    pub local: bool,

    /// Optionally copy starter-kit.yaml config for local development
    #[arg(long = "with-config")]
    pub with_config: bool,

    /// Optionally install starter kit without dependencies
    #[arg(long = "without-dependencies")]
    pub without_dependencies: bool,

    /// Enable Statamic Pro for additional features
    #[arg(long)]
    pub pro: bool,

    /// Optionally install the Static Site Generator addon
    #[arg(long)]
    pub ssg: bool,

    /// Initialize a Git repository
    #[arg(long)]
    pub git: bool,

    /// The branch that should be created for a new repository
    #[arg(long)]
    pub branch: Option<String>,

    /// Create a new repository on GitHub (public or private)
    #[arg(long, num_args = 0..=1, require_equals = true, value_name = "VISIBILITY")]
    pub github: Option<Option<String>>,

    /// Optionally specify the name of the GitHub repository
    #[arg(long, requires = "github")]
    pub repo: Option<String>,

    /// Force install even if the directory already exists
    #[arg(short, long)]
    pub force: bool,

    /// Creates a super user with this email address
    #[arg(long)]
    pub email: Option<String>,

    /// Password for the super user
    #[arg(long, requires = "email")]
    pub password: Option<String>,

    /// Install the legacy (v2) generation from its download archive
    #[arg(long)]
    pub legacy: bool,

    /// Ignore the cached legacy archive and download it again
    #[arg(long = "force-download", requires = "legacy")]
    pub force_download: bool,

    /// Install this legacy version instead of the latest one
    #[arg(long = "legacy-version", requires = "legacy")]
    pub legacy_version: Option<String>,
}

/// Shared collaborators for every command
struct App {
    config: Arc<dyn ProductConfig>,
    env: Environment,
    sink: Arc<dyn OutputSink>,
    executor: Arc<dyn CommandExecutor>,
    prompter: Arc<dyn Prompter>,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let mut env = Environment::detect()?;
        if args.no_interaction {
            env = env.interactive(false);
        }
        if args.no_ansi {
            env = env.decorated(false);
            colored::control::set_override(false);
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }
        tracing::debug!(platform = ?env.platform, interactive = env.interactive, tty = env.tty, "environment detected");

        let sink: Arc<dyn OutputSink> = Arc::new(ConsoleSink);
        let executor: Arc<dyn CommandExecutor> =
            Arc::new(ShellRunner::new(env.clone(), sink.clone()).quiet(args.quiet));

        Ok(Self {
            config: Arc::new(StatamicConfig),
            prompter: Arc::from(prompter_for(&env)),
            env,
            sink,
            executor,
        })
    }

    fn maintenance(&self) -> Maintenance {
        Maintenance::new(
            self.config.clone(),
            self.env.clone(),
            self.executor.clone(),
            self.sink.clone(),
        )
    }
}

#[tokio::main]
async fn main() {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_logging(args.verbose);
    tracing::debug!("statamic v{} starting", CLI_VERSION);

    let exit_code = match run(args).await {
        Ok(code) => code,
        Err(e) => report_error(&e),
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();
    process::exit(exit_code);
}

async fn run(args: Args) -> Result<i32> {
    let app = App::new(&args)?;

    match args.command {
        Command::New(new_args) => new_project(&app, new_args).await,
        Command::Update => Ok(app.maintenance().update().await?),
        Command::Version => Ok(app.maintenance().version().await?),
    }
}

async fn new_project(app: &App, args: NewArgs) -> Result<i32> {
    let config = &app.config;

    let update = check_for_update(
        &app.env,
        config.latest_release_url(),
        config.user_agent(),
        CLI_VERSION,
    )
    .await;
    if let Some(latest) = &update {
        for line in upgrade_notice(latest, config.upgrade_command()) {
            app.sink.warning(&line);
        }
    }
    show_title_art();

    let name = match args.name {
        Some(name) => name,
        None if app.env.interactive => app.prompter.text(
            "What is the name of your project?",
            None,
            Some(validate::project_name),
        )?,
        None => {
            return Err(InstallError::usage("Not enough arguments (missing: \"name\").").into())
        }
    };

    if args.legacy {
        let channel = args
            .legacy_version
            .map(VersionChannel::Pinned)
            .unwrap_or_default();
        let mut progress: Box<dyn DownloadProgress> = if app.env.interactive {
            Box::new(CliclackProgress::default())
        } else {
            Box::new(NoProgress)
        };

        LegacyInstaller::new(
            config.clone(),
            app.env.clone(),
            app.sink.clone(),
            app.prompter.clone(),
            app.executor.clone(),
        )
        .force_download(args.force_download)
        .install(&name, &channel, progress.as_mut())
        .await?;
        return Ok(0);
    }

    let github = match args.github {
        Some(visibility) => Some(GithubTarget {
            repository: args.repo,
            visibility: match visibility.as_deref() {
                None | Some("") => None,
                Some(value) => Some(Visibility::parse(value).ok_or_else(|| {
                    InstallError::usage(format!(
                        "Invalid repository visibility [{}], use public or private.",
                        value
                    ))
                })?),
            },
        }),
        None => None,
    };

    let mut request = InstallRequest::new(&app.env, name)
        .kit_flags(StarterKitFlags {
            license: args.license,
            local: args.local,
            with_config: args.with_config,
            without_dependencies: args.without_dependencies,
        })
        .force(args.force)
        .dev(args.dev)
        .pro(args.pro.then_some(true))
        .ssg(args.ssg)
        .git(args.git, args.branch)
        .github(github)
        .super_user(SuperUser {
            email: args.email,
            password: args.password,
        });
    if let Some(kit) = args.starter_kit {
        request = request.starter_kit(kit);
    }

    let marketplace_url = app
        .env
        .var(config.marketplace_url_env())
        .unwrap_or(config.marketplace_url());
    let marketplace = Arc::new(HttpMarketplace::new(
        marketplace_url,
        config.starter_kits_url(),
        config.user_agent(),
    )?);

    InstallationPipeline::new(
        config.clone(),
        app.env.clone(),
        request,
        app.executor.clone(),
        app.prompter.clone(),
        marketplace,
        app.sink.clone(),
    )
    .update_available(update)
    .run()
    .await?;

    Ok(0)
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,installer_core=debug,statamic=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose).with_writer(std::io::stderr))
        .init();
}

fn show_title_art() {
    let art = [
        "█▀ ▀█▀ ▄▀█ ▀█▀ ▄▀█ █▀▄▀█ █ █▀▀",
        "▄█ ░█░ █▀█ ░█░ █▀█ █░▀░█ █ █▄▄",
    ];
    println!();
    for line in art {
        println!("  {}", line.truecolor(212, 255, 76));
    }
    println!();
}

/// Print the error block and pick the exit code
fn report_error(error: &anyhow::Error) -> i32 {
    let install_error = error.downcast_ref::<InstallError>();
    let message = match install_error {
        Some(e) => e.to_string(),
        None => format!("{:#}", error),
    };
    tracing::debug!("command failed: {:?}", error);

    let padding = " ".repeat(message.chars().count());
    eprintln!();
    eprintln!("  {}", format!("  {}  ", padding).on_red());
    eprintln!("  {}", format!("  {}  ", message).white().on_red());
    eprintln!("  {}", format!("  {}  ", padding).on_red());
    eprintln!();

    if let Some(InstallError::PartialInstall { preserved, .. }) = install_error {
        eprintln!(
            "  {}",
            format!("The base project was kept in {}.", preserved.display()).yellow()
        );
        eprintln!();
    }

    install_error.map(InstallError::exit_code).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_new_with_flags() {
        let args = Args::try_parse_from([
            "statamic",
            "new",
            "my-site",
            "statamic/starter-kit-cool-writings",
            "--license=abc",
            "--github=public",
            "--repo",
            "acme/my-site",
            "-n",
        ])
        .unwrap();

        assert!(args.no_interaction);
        let Command::New(new) = args.command else {
            panic!("expected new command");
        };
        assert_eq!(new.name.as_deref(), Some("my-site"));
        assert_eq!(
            new.starter_kit.as_deref(),
            Some("statamic/starter-kit-cool-writings")
        );
        assert_eq!(new.license.as_deref(), Some("abc"));
        assert_eq!(new.github, Some(Some("public".to_string())));
        assert_eq!(new.repo.as_deref(), Some("acme/my-site"));
    }

    #[test]
    fn test_github_without_visibility() {
        let args = Args::try_parse_from(["statamic", "new", "my-site", "--github"]).unwrap();
        let Command::New(new) = args.command else {
            panic!("expected new command");
        };
        assert_eq!(new.github, Some(None));
        assert_eq!(new.starter_kit, None);
    }

    #[test]
    fn test_legacy_only_flags_require_legacy() {
        assert!(Args::try_parse_from(["statamic", "new", "site", "--force-download"]).is_err());
        assert!(
            Args::try_parse_from(["statamic", "new", "site", "--legacy", "--force-download"])
                .is_ok()
        );
    }

    #[test]
    fn test_update_and_version_commands() {
        let args = Args::try_parse_from(["statamic", "update", "-q"]).unwrap();
        assert!(matches!(args.command, Command::Update));
        assert!(args.quiet);

        let args = Args::try_parse_from(["statamic", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
    }

    #[test]
    fn test_own_release_is_not_an_upgrade() {
        use installer_core::release::newer_version;

        assert_eq!(newer_version(CLI_VERSION, CLI_VERSION), None);
        assert_eq!(
            newer_version(CLI_VERSION, &format!("v{}", CLI_VERSION)),
            None
        );
    }
}
