use crate::config::EnvironmentConfig;

/// Tag used for unreleased builds in dev and test environments
pub const LATEST_TAG: &str = "latest";

/// Resolve the backend version tag.
///
/// An explicit override wins, then the environment tag variable, then
/// `latest` in dev/test mode, and finally the configured default version.
pub fn resolve_tag(
    tag_override: Option<&str>,
    environment: &EnvironmentConfig,
    default_tag: &str,
) -> String {
    if let Some(tag) = tag_override.filter(|tag| !tag.is_empty()) {
        return tag.to_string();
    }

    if let Some(tag) = environment.tag.as_deref().filter(|tag| !tag.is_empty()) {
        return tag.to_string();
    }

    if environment.mode.is_dev_or_test() {
        return LATEST_TAG.to_string();
    }

    default_tag.to_string()
}
