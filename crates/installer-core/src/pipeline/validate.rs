//! Request validation and input validators

use crate::environment::Environment;
use crate::error::{InstallError, Result};
use crate::pipeline::request::InstallRequest;
use crate::product::ProductConfig;
use regex::Regex;
use std::sync::LazyLock;

static STARTER_KIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/\s]+/[^/\s]+$").expect("starter kit pattern is valid"));

static PROJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}\-_.]+$").expect("project name pattern is valid"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Minimum length accepted for a super user password
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const INVALID_STARTER_KIT: &str =
    "Please enter a valid composer package name (eg. hasselhoff/kung-fury)!";

/// A kit identifier has the `owner/name` shape
pub fn is_valid_starter_kit(kit: &str) -> bool {
    STARTER_KIT.is_match(kit)
}

/// Reject a request before any process is spawned
pub fn validate_request(env: &Environment, request: &InstallRequest) -> Result<()> {
    if !request.force && application_exists(env, request) {
        return Err(InstallError::precondition("Application already exists!"));
    }

    if request.force && request.path_is_cwd(env) {
        return Err(InstallError::usage(
            "Cannot use --force option when using current directory for installation!",
        ));
    }

    if let Some(kit) = &request.starter_kit {
        if !is_valid_starter_kit(kit) {
            return Err(InstallError::usage(INVALID_STARTER_KIT));
        }
        return Ok(());
    }

    let flags = &request.kit_flags;
    let kit_only = [
        (flags.license.is_some(), "--license"),
        (flags.local, "--local"),
        (flags.with_config, "--with-config"),
        (flags.without_dependencies, "--without-dependencies"),
    ];
    if let Some((_, flag)) = kit_only.iter().find(|(set, _)| *set) {
        return Err(InstallError::usage(format!(
            "Starter kit is required when using `{}` option!",
            flag
        )));
    }

    Ok(())
}

/// The target already holds something we must not overwrite.
///
/// For the working directory only an existing `composer.json` counts, so
/// installing into a fresh empty folder with `.` works.
pub fn application_exists(env: &Environment, request: &InstallRequest) -> bool {
    if request.path_is_cwd(env) {
        request.absolute_path.join("composer.json").is_file()
    } else {
        request.absolute_path.exists()
    }
}

/// Every marker of a finished base install is present
pub fn base_install_complete(config: &dyn ProductConfig, request: &InstallRequest) -> bool {
    config.install_markers().iter().all(|marker| {
        match marker.strip_suffix('/') {
            Some(dir) => request.absolute_path.join(dir).is_dir(),
            None => request.absolute_path.join(marker).is_file(),
        }
    })
}

/// Prompt validator for the project name
pub fn project_name(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some("The project name is required.".to_string());
    }
    if !PROJECT_NAME.is_match(value) {
        return Some(
            "The name may only contain letters, numbers, dashes, underscores, and periods."
                .to_string(),
        );
    }
    None
}

/// Prompt validator for a starter kit package name
pub fn starter_kit(value: &str) -> Option<String> {
    if is_valid_starter_kit(value) {
        None
    } else {
        Some(INVALID_STARTER_KIT.to_string())
    }
}

/// Prompt validator for the super user email
pub fn email(value: &str) -> Option<String> {
    if EMAIL.is_match(value.trim()) {
        None
    } else {
        Some("Invalid email address.".to_string())
    }
}

/// Prompt validator for the super user password
pub fn password(value: &str) -> Option<String> {
    if value.chars().count() >= MIN_PASSWORD_LENGTH {
        None
    } else {
        Some(format!(
            "The input must be at least {} characters.",
            MIN_PASSWORD_LENGTH
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Platform;
    use crate::pipeline::request::StarterKitFlags;
    use std::fs;

    fn env_in(dir: &std::path::Path) -> Environment {
        Environment::new(Platform::Linux, dir)
    }

    #[test]
    fn test_starter_kit_shape() {
        assert!(is_valid_starter_kit("statamic/starter-kit-cool-writings"));
        assert!(!is_valid_starter_kit("not-a-valid-repo"));
        assert!(!is_valid_starter_kit("a/b/c"));
        assert!(!is_valid_starter_kit("owner/ name"));
    }

    #[test]
    fn test_existing_target_rejected_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("site")).unwrap();
        let env = env_in(dir.path());

        let request = InstallRequest::new(&env, "site");
        let err = validate_request(&env, &request).unwrap_err();
        assert_eq!(err.to_string(), "Application already exists!");

        assert!(validate_request(&env, &request.force(true)).is_ok());
    }

    #[test]
    fn test_force_on_cwd_rejected_even_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_in(dir.path());

        let request = InstallRequest::new(&env, ".").force(true);
        let err = validate_request(&env, &request).unwrap_err();
        assert!(matches!(err, InstallError::Usage(_)));
        assert_eq!(
            err.to_string(),
            "Cannot use --force option when using current directory for installation!"
        );
    }

    #[test]
    fn test_cwd_counts_as_existing_only_with_composer_json() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_in(dir.path());
        let request = InstallRequest::new(&env, ".");
        assert!(!application_exists(&env, &request));

        fs::write(dir.path().join("composer.json"), "{}").unwrap();
        assert!(application_exists(&env, &request));
    }

    #[test]
    fn test_kit_only_flags_have_distinct_messages() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_in(dir.path());
        let cases = [
            (
                StarterKitFlags {
                    license: Some("abc".into()),
                    ..Default::default()
                },
                "--license",
            ),
            (
                StarterKitFlags {
                    local: true,
                    ..Default::default()
                },
                "--local",
            ),
            (
                StarterKitFlags {
                    with_config: true,
                    ..Default::default()
                },
                "--with-config",
            ),
            (
                StarterKitFlags {
                    without_dependencies: true,
                    ..Default::default()
                },
                "--without-dependencies",
            ),
        ];

        for (flags, flag) in cases {
            let request = InstallRequest::new(&env, "site").kit_flags(flags);
            let err = validate_request(&env, &request).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Starter kit is required when using `{}` option!", flag)
            );
        }
    }

    #[test]
    fn test_prompt_validators() {
        assert!(project_name("my-app_1.0").is_none());
        assert!(project_name("my app").is_some());
        assert!(project_name("").is_some());

        assert!(email("jack@example.com").is_none());
        assert!(email("jack").is_some());

        assert!(password("12345678").is_none());
        assert!(password("short").is_some());

        assert!(starter_kit("vendor/kit").is_none());
        assert!(starter_kit("kit").is_some());
    }
}
