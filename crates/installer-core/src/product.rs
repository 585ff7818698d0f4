//! Product configuration trait for installer binaries
//!
//! This trait describes the framework being installed: which packages are
//! scaffolded, which entrypoint the generated application exposes, which
//! files prove an install worked, and which remote services are consulted.

use std::path::PathBuf;

/// Configuration trait for the framework a binary installs
pub trait ProductConfig: Send + Sync + 'static {
    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Package scaffolded by `create-project`
    fn base_package(&self) -> &'static str;

    /// Package updated by the `update` command
    fn update_package(&self) -> &'static str;

    /// Interpreter used to run the generated application's entrypoint
    fn interpreter(&self) -> &'static str {
        "php"
    }

    /// Entrypoint script of the generated application
    fn entrypoint(&self) -> &'static str;

    /// Directory that marks the legacy project shape (alongside the entrypoint)
    fn legacy_marker(&self) -> &'static str;

    /// Scripts made executable after the base install on non-Windows hosts
    fn executable_scripts(&self) -> &'static [&'static str];

    /// Paths that must all exist after a successful base install.
    /// Entries ending in `/` are directories.
    fn install_markers(&self) -> &'static [&'static str];

    /// Build the scaffold command line.
    ///
    /// `directory` is relative to the working directory (or `.`), and
    /// `version` is empty for the stable channel.
    fn create_project_command(&self, composer: &str, directory: &str, version: &str) -> String {
        let mut command = format!(
            "{} create-project {} \"{}\"",
            composer,
            self.base_package(),
            directory
        );
        if !version.is_empty() {
            command.push(' ');
            command.push_str(version);
        }
        command.push_str(" --remove-vcs --prefer-dist");
        command
    }

    /// Version constraint for the development channel
    fn dev_version(&self) -> &'static str {
        "dev-master"
    }

    /// Top-level domain used for the local `APP_URL`
    fn local_tld(&self) -> &'static str {
        ".test"
    }

    /// Message of the initial commit
    fn initial_commit_message(&self) -> &'static str;

    /// File the generated application leaves behind with post-install notes
    fn post_install_instructions(&self) -> PathBuf;

    /// Marketplace endpoint for starter kit details and license validation
    fn marketplace_url(&self) -> &'static str;

    /// Environment variable overriding [`ProductConfig::marketplace_url`]
    fn marketplace_url_env(&self) -> &'static str;

    /// Endpoint listing starter kits for the search prompt
    fn starter_kits_url(&self) -> &'static str;

    /// Public marketplace page prefix for paid kits
    fn marketplace_page_url(&self) -> &'static str;

    /// Endpoint returning the latest release of this CLI
    fn latest_release_url(&self) -> &'static str;

    /// Command shown when a newer CLI release exists
    fn upgrade_command(&self) -> &'static str;

    /// Repository users are invited to star
    fn repository_url(&self) -> &'static str;

    /// Legacy download service ("check" and "get/{version}" live below it)
    fn legacy_download_url(&self) -> &'static str;

    /// Folder at the root of the legacy archive
    fn legacy_archive_root(&self) -> &'static str;

    /// Folders made world-writable after a legacy install
    fn legacy_writable_dirs(&self) -> &'static [&'static str];

    /// Environment variable overriding the legacy download cache root
    fn home_env(&self) -> &'static str;

    /// Cache root used when [`ProductConfig::home_env`] is unset, relative to home
    fn home_dir_name(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        "statamic-cli"
    }
}
