//! Archive download with a per-version cache

use crate::error::{InstallError, Result};
use crate::output::OutputSink;
use std::fs;
use std::path::{Path, PathBuf};

/// Progress reporting for a streamed download
pub trait DownloadProgress {
    /// Called once the total size is known (only when it is non-zero)
    fn start(&mut self, total: u64);

    /// Called with the cumulative number of bytes received
    fn advance(&mut self, downloaded: u64);

    fn finish(&mut self);
}

/// Progress sink that reports nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {
    fn start(&mut self, _total: u64) {}
    fn advance(&mut self, _downloaded: u64) {}
    fn finish(&mut self) {}
}

/// Human readable byte count, e.g. `1.50 MB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Downloaded archives, one file per version
#[derive(Debug, Clone)]
pub struct ZipCache {
    dir: PathBuf,
}

impl ZipCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, version: &str) -> PathBuf {
        self.dir.join(format!("{}.zip", version))
    }

    /// Delete every cached archive except the one for `keep`
    pub fn collect_garbage(&self, keep: &str) {
        let keep = self.path_for(keep);
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let is_zip = path.extension().is_some_and(|ext| ext == "zip");
            if is_zip && path != keep {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::debug!(path = %path.display(), "could not remove cached archive: {}", e);
                }
            }
        }
    }

    pub fn load(&self, version: &str) -> Option<Vec<u8>> {
        fs::read(self.path_for(version)).ok()
    }

    /// Store an archive. Written to a `.part` file first so an interrupted
    /// write never leaves a truncated archive under the final name.
    pub fn store(&self, version: &str, bytes: &[u8]) {
        let target = self.path_for(version);
        let partial = self.dir.join(format!("{}.zip.part", version));

        let result = fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&partial, bytes))
            .and_then(|_| fs::rename(&partial, &target));

        if let Err(e) = result {
            tracing::debug!(path = %target.display(), "could not cache archive: {}", e);
            let _ = fs::remove_file(&partial);
        }
    }
}

/// Fetches archives, preferring the cache unless a fresh download is forced
pub struct Downloader<'a> {
    client: &'a reqwest::Client,
    cache: ZipCache,
    sink: &'a dyn OutputSink,
    force: bool,
}

impl<'a> Downloader<'a> {
    pub fn new(client: &'a reqwest::Client, cache: ZipCache, sink: &'a dyn OutputSink) -> Self {
        Self {
            client,
            cache,
            sink,
            force: false,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Archive bytes for `version`, served from `url` or the cache
    pub async fn fetch(
        &self,
        version: &str,
        url: &str,
        progress: &mut dyn DownloadProgress,
    ) -> Result<Vec<u8>> {
        self.cache.collect_garbage(version);

        if !self.force {
            if let Some(bytes) = self.cache.load(version) {
                self.sink.success("Downloading... From cache");
                return Ok(bytes);
            }
        }

        self.sink.line("Downloading...");
        self.sink.line("Press Ctrl+C to cancel.");
        tracing::debug!(url, "downloading archive");

        let unreachable = |e: reqwest::Error| {
            tracing::debug!("archive download failed: {}", e);
            InstallError::service(format!(
                "There was a problem downloading version {}. Please try again later.",
                version
            ))
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unreachable)?;

        let total = response.content_length().unwrap_or(0);
        if total > 0 {
            progress.start(total);
        }

        let mut bytes = Vec::with_capacity(total as usize);
        while let Some(chunk) = response.chunk().await.map_err(unreachable)? {
            bytes.extend_from_slice(&chunk);
            if total > 0 {
                progress.advance(bytes.len() as u64);
            }
        }
        progress.finish();

        tracing::debug!(size = %format_bytes(bytes.len() as u64), "download finished");
        self.cache.store(version, &bytes);
        self.sink.success("Download complete!");

        Ok(bytes)
    }
}
