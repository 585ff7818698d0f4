//! Self-update notice: compare the running CLI with its latest release

use crate::environment::Environment;
use serde::Deserialize;

/// Environment variable holding a GitHub token for the release lookup
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// Returns the latest version when it is newer than `current`
pub fn newer_version(current: &str, latest: &str) -> Option<String> {
    let parse = |v: &str| semver::Version::parse(v.trim().trim_start_matches('v')).ok();
    let current_version = parse(current)?;
    let latest_version = parse(latest)?;

    if latest_version > current_version {
        Some(latest.trim().to_string())
    } else {
        None
    }
}

/// Ask the release endpoint for the latest tag.
///
/// Informational only: every failure yields `None`.
pub async fn check_for_update(
    env: &Environment,
    url: &str,
    user_agent: &str,
    current: &str,
) -> Option<String> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .ok()?;

    let mut request = client.get(url);
    if let Some(token) = env.var(GITHUB_TOKEN_ENV) {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    let response = match request.send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            tracing::debug!(status = %response.status(), "release check returned an error status");
            return None;
        }
        Err(e) => {
            tracing::debug!("release check failed: {}", e);
            return None;
        }
    };

    let release: Release = response.json().await.ok()?;
    newer_version(current, &release.tag_name)
}

/// Upgrade notice lines for a newer version
pub fn upgrade_notice(latest: &str, upgrade_command: &str) -> Vec<String> {
    vec![
        format!(
            "This is an old version of the Statamic CLI Tool, please upgrade to {}!",
            latest
        ),
        "If you have a global composer installation, you may upgrade by running the following command:"
            .to_string(),
        upgrade_command.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_version_detected() {
        assert_eq!(newer_version("0.1.0", "v0.2.0"), Some("v0.2.0".to_string()));
        assert_eq!(newer_version("5.1.0", "5.10.0"), Some("5.10.0".to_string()));
    }

    #[test]
    fn test_same_or_older_version_ignored() {
        assert_eq!(newer_version("0.2.0", "v0.2.0"), None);
        assert_eq!(newer_version("1.0.0", "0.9.9"), None);
    }

    #[test]
    fn test_unparseable_versions_ignored() {
        assert_eq!(newer_version("UNKNOWN", "v1.0.0"), None);
        assert_eq!(newer_version("1.0.0", "latest"), None);
    }

    #[test]
    fn test_upgrade_notice_mentions_command() {
        let notice = upgrade_notice("v6.0.0", "cargo install statamic-cli");
        assert!(notice[0].contains("v6.0.0"));
        assert_eq!(notice[2], "cargo install statamic-cli");
    }
}
