use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::system::policy::{ProcessPolicy, SortKey, SortOrder};

pub const SYSTEM_CONFIG_PATH: &str = "/etc/mtop/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub processes: ProcessesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Seconds between refresh cycles.
    pub update_interval: u64,
    pub max_processes: usize,
    pub show_colors: bool,
    pub show_load_avg: bool,
    pub show_memory_bar: bool,
    pub show_cpu_bar: bool,
    pub progress_bar_width: u16,
    pub theme: String,
    pub header: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            update_interval: 2,
            max_processes: 20,
            show_colors: true,
            show_load_avg: true,
            show_memory_bar: true,
            show_cpu_bar: true,
            progress_bar_width: 30,
            theme: "default".to_string(),
            header: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessesConfig {
    pub sort_by: SortKey,
    pub reverse_sort: bool,
    pub show_process_state: bool,
    pub show_process_user: bool,
    pub show_kernel_threads: bool,
    #[serde(deserialize_with = "string_list")]
    pub hide_processes: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub show_only_users: Vec<String>,
}

impl Default for ProcessesConfig {
    fn default() -> Self {
        ProcessesConfig {
            sort_by: SortKey::Memory,
            reverse_sort: false,
            show_process_state: true,
            show_process_user: true,
            show_kernel_threads: false,
            hide_processes: Vec::new(),
            show_only_users: Vec::new(),
        }
    }
}

/// Accepts either a TOML array or a single comma-separated string.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    let items = match Raw::deserialize(deserializer)? {
        Raw::One(s) => s.split(',').map(str::to_string).collect(),
        Raw::Many(v) => v,
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

impl Config {
    pub fn policy(&self) -> ProcessPolicy {
        ProcessPolicy {
            max_processes: self.display.max_processes,
            show_kernel_threads: self.processes.show_kernel_threads,
            hide_processes: self.processes.hide_processes.clone(),
            show_only_users: self.processes.show_only_users.clone(),
            order: SortOrder {
                key: self.processes.sort_by,
                reverse: self.processes.reverse_sort,
            },
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let body = toml::to_string_pretty(self)?;
        let contents = format!("# mtop configuration file\n\n{body}");
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mtop").join("config.toml"))
}

/// User config first, then the system-wide one; defaults if neither exists.
pub fn load_config() -> Config {
    let candidates = user_config_path()
        .into_iter()
        .chain(std::iter::once(PathBuf::from(SYSTEM_CONFIG_PATH)));
    for path in candidates {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }
    Config::default()
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unparseable config");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}
