//! Starter kit selection, licensing and application

use super::validate::{is_valid_starter_kit, INVALID_STARTER_KIT};
use super::{Flow, InstallationPipeline, PipelineState};
use crate::error::{InstallError, Result};
use crate::marketplace::KitListing;
use crate::prompt::{self, Choice};

const BLANK_SITE: &str = "blank";
const PICK_KIT: &str = "kit";
const INSTALL_NOW: &str = "install";
const INSTALL_LATER: &str = "later";

/// Labels of the kits whose label contains `query`, case-insensitively
pub fn search(kits: &[KitListing], query: &str) -> Vec<String> {
    let query = query.to_lowercase();
    kits.iter()
        .map(KitListing::label)
        .filter(|label| label.to_lowercase().contains(&query))
        .collect()
}

/// Map a picked suggestion label back to its package name.
/// Anything typed by hand is returned unchanged.
pub fn normalize_selection(kits: &[KitListing], selection: &str) -> String {
    let selection = selection.trim();
    if !selection.contains(" (") {
        return selection.to_string();
    }

    if let Some(kit) = kits.iter().find(|kit| kit.label() == selection) {
        return kit.package.clone();
    }

    selection
        .rsplit_once(" (")
        .and_then(|(_, rest)| rest.strip_suffix(')'))
        .unwrap_or(selection)
        .to_string()
}

impl InstallationPipeline {
    pub(super) async fn resolve_starter_kit(&self, mut state: PipelineState) -> Result<Flow> {
        if let Some(kit) = &self.request.starter_kit {
            state.starter_kit = Some(kit.clone());
            return Ok(Flow::Continue(state));
        }

        if !self.interactive() {
            return Ok(Flow::Skip(state));
        }

        let choice = self.prompter.select(
            "Would you like to install a starter kit?",
            &[
                Choice::new(BLANK_SITE, "No, start with a blank site."),
                Choice::new(PICK_KIT, "Yes, let me pick a Starter Kit."),
            ],
            BLANK_SITE,
        )?;
        if choice == BLANK_SITE {
            return Ok(Flow::Skip(state));
        }

        self.sink.info(&format!(
            "You can find starter kits at {} 🏄",
            self.config.marketplace_page_url()
        ));

        let kits = self.marketplace.starter_kits().await;
        tracing::debug!(count = kits.len(), "starter kits available for search");

        let selection = self.prompter.suggest(
            "Which starter kit would you like to install?",
            &|query| search(&kits, query),
        )?;
        let kit = normalize_selection(&kits, &selection);

        if !is_valid_starter_kit(&kit) {
            return Err(InstallError::usage(INVALID_STARTER_KIT));
        }

        state.starter_kit = Some(kit);
        Ok(Flow::Continue(state))
    }

    pub(super) async fn check_license(&self, mut state: PipelineState) -> Result<Flow> {
        let Some(kit) = state.starter_kit.clone() else {
            return Ok(Flow::Skip(state));
        };

        let Some(details) = self.marketplace.kit_details(&kit).await? else {
            let install = !self.interactive()
                || self.prompter.confirm(
                    &format!(
                        "Starter kit not found on {} Marketplace. Install unlisted starter kit?",
                        self.config.display_name()
                    ),
                    true,
                )?;
            return Ok(if install {
                Flow::Continue(state)
            } else {
                Flow::Declined
            });
        };

        if !details.is_paid() {
            return Ok(Flow::Continue(state));
        }

        if self.interactive() {
            self.sink.warning(
                "This is a paid starter kit. If you haven't already, you may purchase a license at:",
            );
            self.sink.warning(&format!(
                "{}/{}/{}",
                self.config.marketplace_page_url().trim_end_matches('/'),
                details.seller_slug,
                details.kit_slug
            ));
        }

        let license = match &self.request.kit_flags.license {
            Some(license) => license.clone(),
            None if self.interactive() => self.prompter.text(
                "Please enter your license key",
                None,
                Some(prompt::required),
            )?,
            None => {
                return Err(InstallError::usage(
                    "A starter kit license is required, please pass using the `--license` option!",
                ))
            }
        };

        if !self.marketplace.validate_license(&kit, &license).await? {
            return Err(InstallError::precondition(format!(
                "Invalid license for [{}]!",
                kit
            )));
        }

        self.sink.success("Starter kit license valid!");
        state.license = Some(license);

        self.sink
            .warning("Once successfully installed, this Starter Kit license will be marked as used");
        self.sink
            .warning("and cannot be applied to future installations!");

        if !self.interactive() {
            return Ok(Flow::Continue(state));
        }

        let choice = self.prompter.select(
            "Would you like to continue the installation?",
            &[
                Choice::new(INSTALL_NOW, "I understand. Install now and mark used."),
                Choice::new(INSTALL_LATER, "No, I'll install it later."),
            ],
            INSTALL_LATER,
        )?;

        Ok(if choice == INSTALL_NOW {
            Flow::Continue(state)
        } else {
            Flow::Declined
        })
    }

    pub(super) async fn apply_starter_kit(&self, state: PipelineState) -> Result<Flow> {
        let Some(kit) = state.starter_kit.clone() else {
            return Ok(Flow::Skip(state));
        };
        if !state.base_install_successful {
            return Ok(Flow::Skip(state));
        }

        let flags = &self.request.kit_flags;
        let mut args = vec![
            "starter-kit:install".to_string(),
            kit,
            "--cli-install".to_string(),
            "--clear-site".to_string(),
        ];
        self.no_interaction_flag(&mut args);
        if flags.local {
            args.push("--local".to_string());
        }
        if flags.with_config {
            args.push("--with-config".to_string());
        }
        if let Some(license) = state.license.as_ref().or(flags.license.as_ref()) {
            args.push("--license".to_string());
            args.push(license.clone());
        }
        if flags.without_dependencies {
            args.push("--without-dependencies".to_string());
        }

        let code = self.please().run(&args).await?;
        if code != 0 {
            return Err(InstallError::PartialInstall {
                message: format!(
                    "There was a problem installing {} with the chosen starter kit!",
                    self.config.display_name()
                ),
                preserved: self.request.absolute_path.clone(),
            });
        }

        Ok(Flow::Continue(state))
    }
}
