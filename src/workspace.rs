use std::path::Path;
use tracing::{debug, warn};

/// Version prefixes that predate the workspace move
const LEGACY_VERSION_PREFIXES: [&str; 5] = ["0.1", "0.2", "0.3", "0.4", "0.5"];

/// Decide whether the legacy workspace must be migrated.
///
/// Versions are compared as plain strings, so "0.10.0" sorts before
/// "0.5.0". Callers rely on that ordering.
pub fn is_migration_required(legacy_workspace_exists: bool, installed_versions: &[String]) -> bool {
    if !legacy_workspace_exists {
        return false;
    }

    match installed_versions.iter().max() {
        None => true,
        Some(latest) => LEGACY_VERSION_PREFIXES
            .iter()
            .any(|prefix| latest.starts_with(prefix)),
    }
}

/// Check whether a directory exists at the legacy workspace location
pub async fn legacy_workspace_exists(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.is_dir(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No legacy workspace at {}", path.display());
            false
        }
        Err(e) => {
            warn!("Could not inspect legacy workspace {}: {}", path.display(), e);
            false
        }
    }
}
