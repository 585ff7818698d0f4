//! Explicit view of the host the installer runs on
//!
//! The core never reads the working directory, the platform or environment
//! variables from process-global state. Everything is captured once in an
//! [`Environment`] and passed down, so tests can describe a host precisely.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// Platform the binary was compiled for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

/// Snapshot of the host environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub platform: Platform,
    /// Directory relative paths are resolved against and commands start in
    pub cwd: PathBuf,
    /// Whether prompts may be shown
    pub interactive: bool,
    /// Whether the output stream supports ANSI decoration
    pub decorated: bool,
    /// Whether child processes may be attached to the controlling terminal
    pub tty: bool,
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create a bare environment: non-interactive, undecorated, no TTY, no variables
    pub fn new(platform: Platform, cwd: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            cwd: cwd.into(),
            interactive: false,
            decorated: false,
            tty: false,
            vars: BTreeMap::new(),
        }
    }

    /// Capture the environment of the running process
    pub fn detect() -> std::io::Result<Self> {
        let platform = Platform::current();
        let stdout = console::Term::stdout();

        Ok(Self {
            platform,
            cwd: std::env::current_dir()?,
            interactive: std::io::stdin().is_terminal() && stdout.is_term(),
            decorated: stdout.is_term() && console::colors_enabled(),
            tty: !platform.is_windows() && tty_device_available(),
            vars: std::env::vars().collect(),
        })
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn decorated(mut self, decorated: bool) -> Self {
        self.decorated = decorated;
        self
    }

    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    /// Look up an environment variable, ignoring empty values
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Resolve a user-supplied path against the working directory.
    ///
    /// `.` and the empty string resolve to the working directory itself.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        if relative.is_empty() || relative == "." {
            return self.cwd.clone();
        }
        let path = Path::new(relative);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Home directory, honouring `HOME`/`USERPROFILE` from the snapshot first
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.var("HOME")
            .or_else(|| self.var("USERPROFILE"))
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }
}

/// The controlling terminal exists and can be opened for reading and writing
fn tty_device_available() -> bool {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")
        .is_ok()
}
