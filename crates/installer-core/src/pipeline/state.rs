//! Mutable accumulator threaded through the pipeline stages

use crate::env_file::DatabaseEngine;
use crate::pipeline::request::Visibility;

/// Decisions and results accumulated by a single pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Starter kit after interactive selection and normalisation
    pub starter_kit: Option<String>,
    /// License validated against the marketplace
    pub license: Option<String>,
    pub base_install_successful: bool,
    pub enable_pro: bool,
    pub configure_database: bool,
    pub database: Option<DatabaseEngine>,
    pub install_ssg: bool,
    pub make_user: bool,
    pub initialize_git: bool,
    pub push_to_github: bool,
    pub github_repository: Option<String>,
    pub visibility: Option<Visibility>,
    /// Newer CLI release, if one was found
    pub update_available: Option<String>,
}
