//! Installer Core - Process orchestration for creating Statamic projects
//!
//! This library drives the external tools an install leans on (the package
//! manager, git, the GitHub CLI and the new application's own `please`
//! entrypoint) in a fixed, gated order. It is used by the `statamic` binary,
//! which supplies the product configuration and the concrete collaborators.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Execution** - `runtime` runs shell batches and the sub-app entrypoint
//! - **Layer 2: Orchestration** - `pipeline` (package-manager installs) and `legacy` (archive installs)
//! - **Layer 3: Collaborators** - `Prompter`, `Marketplace` and `OutputSink` traits, with
//!   cliclack-based prompts in `tui` (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompt implementations
//! - `legacy` (default): Enables zip extraction for legacy archive installs
//!
//! # Example Usage
//!
//! ```ignore
//! use installer_core::{Environment, InstallRequest, InstallationPipeline, ShellRunner};
//!
//! let env = Environment::detect()?;
//! let request = InstallRequest::new(&env, "my-site").git(true, None);
//! let executor = Arc::new(ShellRunner::new(env.clone(), sink.clone()));
//! let pipeline = InstallationPipeline::new(config, env, request, executor, prompter, marketplace, sink);
//! pipeline.run().await?;
//! ```

pub mod env_file;
pub mod environment;
pub mod error;
pub mod legacy;
pub mod maintenance;
pub mod marketplace;
pub mod output;
pub mod pipeline;
pub mod product;
pub mod prompt;
pub mod release;
pub mod runtime;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use environment::{Environment, Platform};
pub use error::{InstallError, Result};
pub use legacy::{LegacyInstaller, VersionChannel};
pub use maintenance::Maintenance;
pub use marketplace::{HttpMarketplace, Marketplace};
pub use output::{ConsoleSink, MemorySink, OutputSink};
pub use pipeline::{InstallRequest, InstallationPipeline, Outcome, Stage};
pub use product::ProductConfig;
pub use prompt::{Choice, Prompter};
pub use runtime::{CommandExecutor, Please, ProcessResult, ShellRunner};
