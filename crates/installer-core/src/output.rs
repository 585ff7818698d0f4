//! Output sinks for relayed process output and installer messages

use colored::Colorize;
use std::sync::{Arc, Mutex};

/// Where the installer writes everything the user sees.
///
/// `line` carries raw child-process output (already indented by the
/// caller); the other methods carry the installer's own messages.
pub trait OutputSink: Send + Sync {
    fn line(&self, text: &str);

    fn info(&self, text: &str);

    fn success(&self, text: &str);

    fn warning(&self, text: &str);

    fn error(&self, text: &str);

    /// Section heading printed before a group of related steps
    fn intro(&self, text: &str) {
        self.line("");
        self.info(text);
    }
}

/// Writes to the terminal with colored styling
#[derive(Debug, Default, Clone)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn line(&self, text: &str) {
        println!("{}", text);
    }

    fn info(&self, text: &str) {
        println!("  {}", text);
    }

    fn success(&self, text: &str) {
        println!("  {}", format!("[✔] {}", text).green());
    }

    fn warning(&self, text: &str) {
        println!("  {}", text.yellow());
    }

    fn error(&self, text: &str) {
        eprintln!("  {}", text.red());
    }

    fn intro(&self, text: &str) {
        println!();
        println!("  {}", text.cyan().bold());
    }
}

/// Records every line in memory; used by tests and for captured runs
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded lines, prefixed with their kind
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// All recorded lines joined with newlines
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    fn push(&self, kind: &str, text: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            if kind.is_empty() {
                lines.push(text.to_string());
            } else {
                lines.push(format!("{}: {}", kind, text));
            }
        }
    }
}

impl OutputSink for MemorySink {
    fn line(&self, text: &str) {
        self.push("", text);
    }

    fn info(&self, text: &str) {
        self.push("info", text);
    }

    fn success(&self, text: &str) {
        self.push("success", text);
    }

    fn warning(&self, text: &str) {
        self.push("warning", text);
    }

    fn error(&self, text: &str) {
        self.push("error", text);
    }

    fn intro(&self, text: &str) {
        self.push("intro", text);
    }
}
