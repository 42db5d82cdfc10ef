use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable selecting dev/test behaviour
pub const ENV_MODE_VAR: &str = "CW_ENV";
/// Environment variable overriding the backend version tag
pub const ENV_TAG_VAR: &str = "CW_TAG";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LifecycleConfig {
    pub cli: CliConfig,
    pub environment: EnvironmentConfig,
    pub install: InstallConfig,
    pub workspace: WorkspaceConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CliConfig {
    /// Path to the cwctl executable
    #[serde(default = "default_cli_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EnvironmentConfig {
    /// default, dev or test
    #[serde(default)]
    pub mode: EnvMode,

    /// Explicit backend version tag
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InstallConfig {
    /// Version installed when nothing else selects one
    #[serde(default = "default_tag")]
    pub default_tag: String,

    /// Page opened by the "More info" buttons
    #[serde(default = "default_docs_url")]
    pub docs_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorkspaceConfig {
    /// Workspace directory used by versions before the workspace move
    #[serde(default = "default_legacy_path")]
    pub legacy_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PromptConfig {
    /// Answer every confirmation with its first button
    #[serde(default)]
    pub assume_yes: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvMode {
    #[default]
    Default,
    Dev,
    Test,
}

impl EnvMode {
    /// Unrecognised values fall back to the default mode
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" => EnvMode::Dev,
            "test" => EnvMode::Test,
            _ => EnvMode::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvMode::Default => "default",
            EnvMode::Dev => "dev",
            EnvMode::Test => "test",
        }
    }

    pub fn is_dev_or_test(&self) -> bool {
        matches!(self, EnvMode::Dev | EnvMode::Test)
    }
}

impl LifecycleConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("codewind.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let mode = std::env::var(ENV_MODE_VAR)
            .ok()
            .map(|value| EnvMode::from_env_value(&value).as_str());
        let tag = std::env::var(ENV_TAG_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty());

        let settings = Config::builder()
            .set_default("cli.path", default_cli_path())?
            .set_default("environment.mode", EnvMode::default().as_str())?
            .set_default("install.default_tag", default_tag())?
            .set_default("install.docs_url", default_docs_url())?
            .set_default("workspace.legacy_path", default_legacy_path())?
            .set_default("prompt.assume_yes", false)?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with CODEWIND_ prefix
            .add_source(
                Environment::with_prefix("CODEWIND")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("environment.mode", mode)?
            .set_override_option("environment.tag", tag)?
            .build()?;

        let config: LifecycleConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cli.path.trim().is_empty() {
            return Err(ConfigError::Message(
                "cli.path must name the cwctl executable".to_string(),
            ));
        }

        if self.install.default_tag.trim().is_empty() {
            return Err(ConfigError::Message(
                "install.default_tag must not be empty".to_string(),
            ));
        }

        if self.install.docs_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "install.docs_url must not be empty".to_string(),
            ));
        }

        if self.workspace.legacy_path.trim().is_empty() {
            return Err(ConfigError::Message(
                "workspace.legacy_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl WorkspaceConfig {
    /// Legacy workspace path with a leading `~` expanded
    pub fn legacy_dir(&self) -> PathBuf {
        expand_home(&self.legacy_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(path),
    };

    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => {
            let mut expanded = PathBuf::from(home);
            let trimmed = rest.trim_start_matches(['/', '\\']);
            if !trimmed.is_empty() {
                expanded.push(trimmed);
            }
            expanded
        }
        None => PathBuf::from(path),
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            path: default_cli_path(),
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            default_tag: default_tag(),
            docs_url: default_docs_url(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            legacy_path: default_legacy_path(),
        }
    }
}

// Default value functions
fn default_cli_path() -> String {
    "cwctl".to_string()
}
fn default_tag() -> String {
    "0.5.0".to_string()
}
fn default_docs_url() -> String {
    "https://www.eclipse.org/codewind/installlocally.html".to_string()
}
fn default_legacy_path() -> String {
    "~/codewind-workspace".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LifecycleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cli.path, "cwctl");
        assert_eq!(config.install.default_tag, "0.5.0");
        assert_eq!(config.environment.mode, EnvMode::Default);
        assert!(config.environment.tag.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = LifecycleConfig::default();
        config.cli.path = " ".to_string();
        assert!(config.validate().is_err());

        config.cli.path = "/usr/local/bin/cwctl".to_string();
        config.install.default_tag = String::new();
        assert!(config.validate().is_err());

        config.install.default_tag = "0.6.0".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_mode_parsing() {
        assert_eq!(EnvMode::from_env_value("dev"), EnvMode::Dev);
        assert_eq!(EnvMode::from_env_value(" TEST "), EnvMode::Test);
        assert_eq!(EnvMode::from_env_value("production"), EnvMode::Default);
        assert!(!EnvMode::Default.is_dev_or_test());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[cli]\npath = \"/opt/codewind/cwctl\"\n\n[install]\ndefault_tag = \"0.7.0\"\n\n[workspace]\nlegacy_path = \"/tmp/legacy\""
        )
        .unwrap();

        let config = LifecycleConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.cli.path, "/opt/codewind/cwctl");
        assert_eq!(config.install.default_tag, "0.7.0");
        assert_eq!(config.workspace.legacy_dir(), PathBuf::from("/tmp/legacy"));
        assert_eq!(config.install.docs_url, default_docs_url());
    }

    #[test]
    fn test_legacy_dir_expands_home() {
        let config = WorkspaceConfig::default();
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                config.legacy_dir(),
                PathBuf::from(home).join("codewind-workspace")
            );
        }
        assert_eq!(expand_home("~other/dir"), PathBuf::from("~other/dir"));
    }
}
