use anyhow::{Context, Result};
use orchestrator::OrchestratorConfig;
use section_core::{Entitlements, Module};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "section-sync.toml";
const USER_OPTIONS_DIR: &str = "section-sync";
const USER_OPTIONS_FILE: &str = "options.toml";

/// Options layered from the user's own options file and the project config
/// file. Every field is optional so the two can be merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub logging: LoggingOptions,
    pub session: SessionOptions,
    pub orchestrator: OrchestratorOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_modules: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tasks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_capacity: Option<usize>,
}

impl Options {
    /// Read options from `path`. A missing file yields empty options.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Options file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let options = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "Options loaded");
        Ok(options)
    }

    /// `user` options overlaid by `file`; a value set in the file wins.
    pub fn merged(user: Options, file: Options) -> Options {
        Options {
            logging: LoggingOptions {
                level: file.logging.level.or(user.logging.level),
            },
            session: SessionOptions {
                active_modules: file.session.active_modules.or(user.session.active_modules),
                premium: file.session.premium.or(user.session.premium),
            },
            orchestrator: OrchestratorOptions {
                max_tasks: file.orchestrator.max_tasks.or(user.orchestrator.max_tasks),
                task_timeout_secs: file
                    .orchestrator
                    .task_timeout_secs
                    .or(user.orchestrator.task_timeout_secs),
                event_capacity: file
                    .orchestrator
                    .event_capacity
                    .or(user.orchestrator.event_capacity),
            },
        }
    }

    pub fn entitlements(&self) -> Result<Entitlements> {
        let modules = self
            .session
            .active_modules
            .iter()
            .flatten()
            .map(|name| Module::parse(name).context("Invalid module in active_modules"))
            .collect::<Result<Vec<_>>>()?;

        Ok(Entitlements::new(modules).with_premium(self.session.premium.unwrap_or(false)))
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let mut config = OrchestratorConfig::default();
        if let Some(max_tasks) = self.orchestrator.max_tasks {
            config = config.with_max_tasks(max_tasks);
        }
        if let Some(secs) = self.orchestrator.task_timeout_secs {
            config = config.with_task_timeout(secs);
        }
        if let Some(capacity) = self.orchestrator.event_capacity {
            config.event_capacity = capacity;
        }
        config
    }
}

/// Location of the per-user options file, if the platform has a config dir.
pub fn user_options_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(USER_OPTIONS_DIR).join(USER_OPTIONS_FILE))
}

/// Effective options: user options overlaid by the project config file.
pub fn load_options(config_path: Option<&Path>) -> Result<Options> {
    let user = match user_options_path() {
        Some(path) => Options::load(&path)?,
        None => Options::default(),
    };

    let file_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let file = Options::load(&file_path)?;

    Ok(Options::merged(user, file))
}
