//! External process execution
//!
//! This module provides:
//! - The shell command runner with TTY negotiation and output relay
//! - The bridge to the generated application's `please` entrypoint
//! - Probes for git, the GitHub CLI and the PHP interpreter

pub mod please;
pub mod process;
pub mod tool;

pub use please::{detect_shape, Please, ProjectShape};
pub use process::{prepare_commands, quote_arg, CommandExecutor, ProcessResult, ShellRunner};
pub use tool::{find_composer, open_in_browser, ToolProbe};
