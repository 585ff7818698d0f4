//! Archive-based installer for the legacy product generation
//!
//! Instead of scaffolding through the package manager, a versioned archive
//! is downloaded (or served from the cache), extracted next to the target,
//! moved into place and made writable.

pub mod archive;
pub mod download;

use crate::environment::Environment;
use crate::error::{InstallError, Result};
use crate::output::OutputSink;
use crate::product::ProductConfig;
use crate::prompt::Prompter;
use crate::runtime::{CommandExecutor, Please};
use download::{DownloadProgress, Downloader, ZipCache};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which archive version to install
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionChannel {
    /// Ask the download service for the latest version
    #[default]
    Latest,
    /// Install exactly this version
    Pinned(String),
}

/// Temporary archive and extraction folder, removed on drop.
/// Both names carry a fresh suffix so nothing that already exists is reused.
struct Scratch {
    archive: PathBuf,
    extract_dir: PathBuf,
}

impl Scratch {
    fn new(cwd: &Path, target: &Path) -> Self {
        let mut extract_dir = OsString::from(target.as_os_str());
        extract_dir.push(format!("_tmp_{}", uuid::Uuid::new_v4().simple()));

        Self {
            archive: cwd.join(format!("statamic_{}", uuid::Uuid::new_v4().simple())),
            extract_dir: PathBuf::from(extract_dir),
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.archive);
        let _ = fs::remove_dir_all(&self.extract_dir);
    }
}

/// Installs the legacy generation from a downloaded archive
pub struct LegacyInstaller {
    config: Arc<dyn ProductConfig>,
    env: Environment,
    sink: Arc<dyn OutputSink>,
    prompter: Arc<dyn Prompter>,
    executor: Arc<dyn CommandExecutor>,
    client: reqwest::Client,
    force_download: bool,
}

impl LegacyInstaller {
    pub fn new(
        config: Arc<dyn ProductConfig>,
        env: Environment,
        sink: Arc<dyn OutputSink>,
        prompter: Arc<dyn Prompter>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            env,
            sink,
            prompter,
            executor,
            client,
            force_download: false,
        }
    }

    /// Ignore the cached archive and download again
    pub fn force_download(mut self, force: bool) -> Self {
        self.force_download = force;
        self
    }

    /// Cache directory: `$STATAMIC_HOME/cache`, else `~/.statamic/cache`
    pub fn cache_dir(&self) -> PathBuf {
        let home = self
            .env
            .var(self.config.home_env())
            .map(PathBuf::from)
            .or_else(|| {
                self.env
                    .home_dir()
                    .map(|h| h.join(self.config.home_dir_name()))
            })
            .unwrap_or_else(|| self.env.cwd.join(self.config.home_dir_name()));
        home.join("cache")
    }

    /// Install into `name` (relative to the working directory).
    /// Returns the absolute path of the new project.
    pub async fn install(
        &self,
        name: &str,
        channel: &VersionChannel,
        progress: &mut dyn DownloadProgress,
    ) -> Result<PathBuf> {
        if !archive::SUPPORTED {
            return Err(InstallError::precondition(
                "Zip support is not available in this build. Please install a build with legacy support and try again.",
            ));
        }

        let directory = self.env.resolve(name);
        if directory.exists() {
            return Err(InstallError::precondition("Application already exists!"));
        }

        let version = match channel {
            VersionChannel::Latest => self.latest_version().await?,
            VersionChannel::Pinned(version) => version.clone(),
        };

        let url = format!(
            "{}/get/{}",
            self.config.legacy_download_url().trim_end_matches('/'),
            version
        );
        let bytes = Downloader::new(&self.client, ZipCache::new(self.cache_dir()), &*self.sink)
            .force(self.force_download)
            .fetch(&version, &url, progress)
            .await?;

        let scratch = Scratch::new(&self.env.cwd, &directory);
        fs::write(&scratch.archive, &bytes)?;

        archive::extract(&scratch.archive, &scratch.extract_dir)?;
        self.sink.success("Extracting zip...");

        let root = scratch.extract_dir.join(self.config.legacy_archive_root());
        if !root.is_dir() {
            return Err(InstallError::service(format!(
                "The downloaded archive does not contain a `{}` folder.",
                self.config.legacy_archive_root()
            )));
        }
        fs::rename(&root, &directory)?;
        drop(scratch);
        self.sink.success("Cleaning up...");

        self.apply_permissions(&directory)?;
        self.sink.success("Updating file permissions...");

        self.create_user(&directory).await?;

        self.sink.success(&format!(
            "{} has been installed into the {} directory.",
            self.config.display_name(),
            name
        ));
        Ok(directory)
    }

    async fn latest_version(&self) -> Result<String> {
        let url = format!(
            "{}/check",
            self.config.legacy_download_url().trim_end_matches('/')
        );
        self.sink.line("Checking for the latest version...");

        let unreachable = || {
            InstallError::service(
                "Cannot connect to the download service to check the latest version. Please try again later.",
            )
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::debug!(url, "version check failed: {}", e);
                unreachable()
            })?;
        let version = response
            .text()
            .await
            .map_err(|_| unreachable())?
            .trim()
            .to_string();

        if version.is_empty() || version.contains(['/', '\\']) {
            return Err(unreachable());
        }

        self.sink.success(&version);
        Ok(version)
    }

    /// Recursively open up the folders the application writes to
    fn apply_permissions(&self, directory: &Path) -> Result<()> {
        for folder in self.config.legacy_writable_dirs() {
            let dir = directory.join(folder);
            if !dir.exists() {
                tracing::debug!(dir = %dir.display(), "writable folder missing, skipping");
                continue;
            }
            make_world_writable(&dir)?;
        }
        Ok(())
    }

    async fn create_user(&self, directory: &Path) -> Result<()> {
        let create = self.env.interactive && self.prompter.confirm("Create a user?", false)?;

        if !create {
            self.sink.warning(&format!(
                "[!] You may create a user with {} {} make:user",
                self.config.interpreter(),
                self.config.entrypoint()
            ));
            return Ok(());
        }

        let please = Please::new(&*self.config, self.executor.clone(), directory);
        let code = please.run(&["make:user"]).await?;
        if code == 0 {
            self.sink.success("User created");
        } else {
            self.sink.warning("There was a problem creating the user.");
        }
        Ok(())
    }
}

#[cfg(unix)]
fn make_world_writable(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::set_permissions(entry.path(), fs::Permissions::from_mode(0o777))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_world_writable(_dir: &Path) -> Result<()> {
    Ok(())
}
