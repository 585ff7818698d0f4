//! Charm-style prompts using cliclack, with a plain terminal fallback

use crate::environment::Environment;
use crate::error::{InstallError, Result};
use crate::legacy::download::DownloadProgress;
use crate::prompt::{Choice, Prompter, Validator};
use console::Term;

/// Pick the prompt implementation for this host.
///
/// Rich prompts need an interactive terminal and do not render reliably on
/// Windows consoles, so both cases fall back to plain line input.
pub fn prompter_for(env: &Environment) -> Box<dyn Prompter> {
    if env.interactive && !env.platform.is_windows() {
        Box::new(CliclackPrompter)
    } else {
        Box::new(PlainPrompter::new())
    }
}

/// Rich inline prompts rendered by cliclack
#[derive(Debug, Default, Clone, Copy)]
pub struct CliclackPrompter;

impl Prompter for CliclackPrompter {
    fn select(&self, label: &str, options: &[Choice], default: &str) -> Result<String> {
        let mut select = cliclack::select(label);
        for choice in options {
            select = select.item(choice.value.clone(), &choice.label, &choice.hint);
        }
        if options.iter().any(|c| c.value == default) {
            select = select.initial_value(default.to_string());
        }
        select.interact().map_err(InstallError::from_prompt)
    }

    fn confirm(&self, label: &str, default: bool) -> Result<bool> {
        cliclack::confirm(label)
            .initial_value(default)
            .interact()
            .map_err(InstallError::from_prompt)
    }

    fn text(
        &self,
        label: &str,
        default: Option<&str>,
        validate: Option<Validator>,
    ) -> Result<String> {
        let mut input = cliclack::input(label);
        if let Some(default) = default {
            input = input.placeholder(default).default_input(default);
        }
        if let Some(validate) = validate {
            input = input.validate(move |value: &String| match validate(value) {
                Some(message) => Err(message),
                None => Ok(()),
            });
        }
        input.interact().map_err(InstallError::from_prompt)
    }

    fn password(&self, label: &str, validate: Option<Validator>) -> Result<String> {
        let mut password = cliclack::password(label).mask('▪');
        if let Some(validate) = validate {
            password = password.validate(move |value: &String| match validate(value) {
                Some(message) => Err(message),
                None => Ok(()),
            });
        }
        password.interact().map_err(InstallError::from_prompt)
    }

    fn suggest(&self, label: &str, source: &dyn Fn(&str) -> Vec<String>) -> Result<String> {
        let query: String = cliclack::input(label)
            .placeholder("vendor/package or a search term")
            .interact()
            .map_err(InstallError::from_prompt)?;

        let matches = source(&query);
        if matches.is_empty() {
            return Ok(query);
        }

        let mut select = cliclack::select("Pick a starter kit");
        for suggestion in &matches {
            select = select.item(suggestion.clone(), suggestion, "");
        }
        select = select.item(query.clone(), format!("Use \"{}\" as entered", query), "");
        select.interact().map_err(InstallError::from_prompt)
    }
}

/// Plain read-and-validate loop over the terminal
pub struct PlainPrompter {
    term: Term,
}

impl PlainPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn ask(&self, question: &str) -> Result<String> {
        self.term
            .write_str(question)
            .map_err(InstallError::from_prompt)?;
        let answer = self.term.read_line().map_err(InstallError::from_prompt)?;
        Ok(answer.trim().to_string())
    }

    fn reject(&self, message: &str) -> Result<()> {
        self.term
            .write_line(&format!(" [ERROR] {}", message))
            .map_err(InstallError::from_prompt)
    }
}

impl Default for PlainPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for PlainPrompter {
    fn select(&self, label: &str, options: &[Choice], default: &str) -> Result<String> {
        self.term
            .write_line(&format!(" {} [{}]:", label, default))
            .map_err(InstallError::from_prompt)?;
        for (idx, choice) in options.iter().enumerate() {
            self.term
                .write_line(&format!("  [{}] {}", idx, choice.label))
                .map_err(InstallError::from_prompt)?;
        }

        loop {
            let answer = self.ask(" > ")?;
            if answer.is_empty() {
                return Ok(default.to_string());
            }
            if let Some(choice) = pick_choice(options, &answer) {
                return Ok(choice.value.clone());
            }
            self.reject(&format!("Value \"{}\" is invalid", answer))?;
        }
    }

    fn confirm(&self, label: &str, default: bool) -> Result<bool> {
        let hint = if default { "yes" } else { "no" };
        loop {
            let answer = self.ask(&format!(" {} (yes/no) [{}]: ", label, hint))?;
            match parse_confirmation(&answer) {
                Some(value) => return Ok(value.unwrap_or(default)),
                None => self.reject("Please answer yes or no.")?,
            }
        }
    }

    fn text(
        &self,
        label: &str,
        default: Option<&str>,
        validate: Option<Validator>,
    ) -> Result<String> {
        let question = match default {
            Some(d) => format!(" {} [{}]: ", label, d),
            None => format!(" {}: ", label),
        };
        loop {
            let mut answer = self.ask(&question)?;
            if answer.is_empty() {
                answer = default.unwrap_or_default().to_string();
            }
            match validate.and_then(|v| v(&answer)) {
                Some(message) => self.reject(&message)?,
                None => return Ok(answer),
            }
        }
    }

    fn password(&self, label: &str, validate: Option<Validator>) -> Result<String> {
        loop {
            self.term
                .write_str(&format!(" {}: ", label))
                .map_err(InstallError::from_prompt)?;
            let answer = self
                .term
                .read_secure_line()
                .map_err(InstallError::from_prompt)?;
            match validate.and_then(|v| v(&answer)) {
                Some(message) => self.reject(&message)?,
                None => return Ok(answer),
            }
        }
    }

    fn suggest(&self, label: &str, source: &dyn Fn(&str) -> Vec<String>) -> Result<String> {
        loop {
            let answer = self.ask(&format!(" {}: ", label))?;
            if answer.is_empty() {
                self.reject("Required.")?;
                continue;
            }
            let matches = source(&answer);
            if matches.len() == 1 {
                return Ok(matches[0].clone());
            }
            return Ok(answer);
        }
    }
}

/// Match an answer against option indexes, values and labels
fn pick_choice<'a>(options: &'a [Choice], answer: &str) -> Option<&'a Choice> {
    if let Ok(idx) = answer.parse::<usize>() {
        if let Some(choice) = options.get(idx) {
            return Some(choice);
        }
    }
    options
        .iter()
        .find(|c| c.value.eq_ignore_ascii_case(answer) || c.label.eq_ignore_ascii_case(answer))
}

/// `Some(None)` means "use the default", `None` means unrecognised
fn parse_confirmation(answer: &str) -> Option<Option<bool>> {
    match answer.to_lowercase().as_str() {
        "" => Some(None),
        "y" | "yes" => Some(Some(true)),
        "n" | "no" => Some(Some(false)),
        _ => None,
    }
}

/// Download progress rendered as a cliclack progress bar
#[derive(Default)]
pub struct CliclackProgress {
    bar: Option<cliclack::ProgressBar>,
    position: u64,
}

impl DownloadProgress for CliclackProgress {
    fn start(&mut self, total: u64) {
        let bar = cliclack::progress_bar(total).with_download_template();
        bar.start("Downloading...");
        self.bar = Some(bar);
        self.position = 0;
    }

    fn advance(&mut self, downloaded: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(downloaded.saturating_sub(self.position));
            self.position = downloaded;
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.stop("Download complete!");
        }
    }
}
