//! The immutable description of one `new` invocation

use crate::environment::Environment;
use std::fmt;
use std::path::PathBuf;

/// GitHub repository visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote repository to create and push to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GithubTarget {
    /// Full repository name; defaults to the project name
    pub repository: Option<String>,
    /// Visibility; asked for interactively when unset
    pub visibility: Option<Visibility>,
}

/// Flags that only make sense together with a starter kit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarterKitFlags {
    pub license: Option<String>,
    pub local: bool,
    pub with_config: bool,
    pub without_dependencies: bool,
}

/// Super user details passed on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuperUser {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Everything the user asked for, resolved against the environment once
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Target as typed by the user (`.` for the working directory)
    pub relative_path: String,
    pub absolute_path: PathBuf,
    /// Final path segment of the target
    pub name: String,
    pub starter_kit: Option<String>,
    pub kit_flags: StarterKitFlags,
    pub force: bool,
    pub dev: bool,
    /// `Some(true)` forces Pro on; `None` asks interactively (default on)
    pub pro: Option<bool>,
    /// Install the static site generator addon
    pub ssg: bool,
    /// `--git` was passed
    pub git: bool,
    pub branch: Option<String>,
    /// `--github` was passed, with its optional visibility
    pub github: Option<GithubTarget>,
    pub super_user: SuperUser,
}

impl InstallRequest {
    /// Build a request for `relative_path`, resolved against the environment
    pub fn new(env: &Environment, relative_path: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        let absolute_path = env.resolve(&relative_path);
        let name = absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            relative_path,
            absolute_path,
            name,
            starter_kit: None,
            kit_flags: StarterKitFlags::default(),
            force: false,
            dev: false,
            pro: None,
            ssg: false,
            git: false,
            branch: None,
            github: None,
            super_user: SuperUser::default(),
        }
    }

    pub fn starter_kit(mut self, kit: impl Into<String>) -> Self {
        self.starter_kit = Some(kit.into());
        self
    }

    pub fn kit_flags(mut self, flags: StarterKitFlags) -> Self {
        self.kit_flags = flags;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn pro(mut self, pro: Option<bool>) -> Self {
        self.pro = pro;
        self
    }

    pub fn ssg(mut self, ssg: bool) -> Self {
        self.ssg = ssg;
        self
    }

    pub fn git(mut self, git: bool, branch: Option<String>) -> Self {
        self.git = git;
        self.branch = branch;
        self
    }

    pub fn github(mut self, github: Option<GithubTarget>) -> Self {
        self.github = github;
        self
    }

    pub fn super_user(mut self, super_user: SuperUser) -> Self {
        self.super_user = super_user;
        self
    }

    /// The target is the working directory itself
    pub fn path_is_cwd(&self, env: &Environment) -> bool {
        self.absolute_path == env.cwd
    }

    /// Directory argument handed to the scaffold command
    pub fn scaffold_directory(&self, env: &Environment) -> &str {
        if self.path_is_cwd(env) {
            "."
        } else {
            &self.relative_path
        }
    }
}
