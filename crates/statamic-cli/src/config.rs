//! Statamic product configuration

use installer_core::ProductConfig;
use std::path::PathBuf;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "STATAMIC_LOG";

/// Releases of this binary's own repository, tagged with `CARGO_PKG_VERSION`
const RELEASES_URL: &str = "https://api.github.com/repos/statamic/cli-rs/releases/latest";

/// Statamic product configuration
#[derive(Clone)]
pub struct StatamicConfig;

impl ProductConfig for StatamicConfig {
    fn display_name(&self) -> &'static str {
        "Statamic"
    }

    fn base_package(&self) -> &'static str {
        "statamic/statamic"
    }

    fn update_package(&self) -> &'static str {
        "statamic/cms"
    }

    fn entrypoint(&self) -> &'static str {
        "please"
    }

    fn legacy_marker(&self) -> &'static str {
        "statamic"
    }

    fn executable_scripts(&self) -> &'static [&'static str] {
        &["artisan", "please"]
    }

    fn install_markers(&self) -> &'static [&'static str] {
        &["composer.json", "vendor/", "artisan", "please"]
    }

    fn initial_commit_message(&self) -> &'static str {
        "Set up a fresh Statamic site"
    }

    fn post_install_instructions(&self) -> PathBuf {
        PathBuf::from("storage/statamic/tmp/cli/post-install-instructions.txt")
    }

    fn marketplace_url(&self) -> &'static str {
        "https://outpost.statamic.com/v3/starter-kits/"
    }

    fn marketplace_url_env(&self) -> &'static str {
        "STATAMIC_OUTPOST_URL"
    }

    fn starter_kits_url(&self) -> &'static str {
        "https://statamic.com/api/v1/marketplace/starter-kits"
    }

    fn marketplace_page_url(&self) -> &'static str {
        "https://statamic.com/starter-kits"
    }

    fn latest_release_url(&self) -> &'static str {
        RELEASES_URL
    }

    fn upgrade_command(&self) -> &'static str {
        concat!("cargo install ", env!("CARGO_PKG_NAME"))
    }

    fn repository_url(&self) -> &'static str {
        "https://github.com/statamic/cms"
    }

    fn legacy_download_url(&self) -> &'static str {
        "https://outpost.statamic.com/v2"
    }

    fn legacy_archive_root(&self) -> &'static str {
        "statamic"
    }

    fn legacy_writable_dirs(&self) -> &'static [&'static str] {
        &["local", "site", "statamic", "assets"]
    }

    fn home_env(&self) -> &'static str {
        "STATAMIC_HOME"
    }

    fn home_dir_name(&self) -> &'static str {
        ".statamic"
    }
}
