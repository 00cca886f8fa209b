//! Configuration management
//!
//! Manages the group roster, solution count, colours, data file location and
//! server settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::types::{GroupId, Roster};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file holding every rating
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Number of solutions, labelled 1..=N
    #[serde(default = "default_num_solutions")]
    pub num_solutions: u32,
    /// Marker colour for averaged points
    #[serde(default = "default_average_color")]
    pub average_color: String,
    /// Rating groups, in display order
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupConfig>,
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// One rating group and its plot colour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub color: String,
}

impl GroupConfig {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("group_data.csv")
}

fn default_num_solutions() -> u32 {
    16
}

fn default_average_color() -> String {
    "violet".to_string()
}

fn default_groups() -> Vec<GroupConfig> {
    vec![
        GroupConfig::new("Group 1", "blue"),
        GroupConfig::new("Group 2", "green"),
        GroupConfig::new("Group 3", "red"),
    ]
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            num_solutions: default_num_solutions(),
            average_color: default_average_color(),
            groups: default_groups(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            let config = Config::default();
            config.save_to(path)?;
            config
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Reject rosters the snapshot format cannot represent
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            anyhow::bail!("At least one group must be configured");
        }
        if self.num_solutions == 0 {
            anyhow::bail!("num_solutions must be at least 1");
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            let name = group.name.as_str();
            if name.is_empty() || name.trim() != name {
                anyhow::bail!("Group name '{}' must be non-empty without surrounding spaces", name);
            }
            if name.contains([',', '"', '\n', '\r']) {
                anyhow::bail!("Group name '{}' must not contain commas, quotes or line breaks", name);
            }
            if !seen.insert(name) {
                anyhow::bail!("Group '{}' is configured twice", name);
            }
        }
        Ok(())
    }

    /// The configured groups and solution count
    pub fn roster(&self) -> Roster {
        Roster::new(
            self.groups.iter().map(|g| GroupId::new(g.name.clone())).collect(),
            self.num_solutions,
        )
    }

    /// Plot colour for a group; unknown groups fall back to grey
    pub fn group_color(&self, group: &GroupId) -> &str {
        self.groups
            .iter()
            .find(|g| g.name == group.as_str())
            .map(|g| g.color.as_str())
            .unwrap_or("gray")
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "quadrant-rater", "quadrant-rater")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Show configuration
pub fn show_config(config: &Config, path: &Path) {
    println!("Config file:    {}", path.display());
    println!("Data file:      {}", config.data_file.display());
    println!("Solutions:      1..={}", config.num_solutions);
    println!("Average colour: {}", config.average_color);
    println!("Groups:");
    for group in &config.groups {
        println!("  {:<20} {}", group.name, group.color);
    }
    println!("Server:         http://{}:{}", config.server.host, config.server.port);
}

/// Get default configuration as TOML string
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| "# Default configuration\n".to_string())
}
