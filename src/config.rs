//! Configuration loading for Stride.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.stride/config.toml`)
//! 3. User config (`~/.stride/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{XP_PER_LESSON, XP_PER_PROJECT};
use crate::error::{Result, StrideError};

/// Name of the data directory under the user's home and the project root.
const STRIDE_DIR: &str = ".stride";

/// Main configuration struct for Stride.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// XP awards.
    pub rewards: RewardsConfig,
    /// External assistant used for running, reviewing and checking code.
    pub assistant: AssistantConfig,
    /// Leaderboard display.
    pub leaderboard: LeaderboardConfig,
}

/// XP awards for completions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RewardsConfig {
    /// XP for finishing a lesson.
    pub xp_per_lesson: u64,
    /// XP for passing a project.
    pub xp_per_project: u64,
}

impl RewardsConfig {
    /// Check if an award value is valid.
    pub fn is_valid_award(value: u64) -> bool {
        value >= 1
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            xp_per_lesson: XP_PER_LESSON,
            xp_per_project: XP_PER_PROJECT,
        }
    }
}

/// External assistant command.
///
/// When `command` is unset the assistant is offline and every collaborator
/// answers with its fallback text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    /// Program that reads a prompt on stdin and writes a reply to stdout.
    pub command: Option<String>,
    /// Arguments passed to `command`.
    pub args: Vec<String>,
}

/// Leaderboard display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Include the built-in rival entries.
    pub show_rivals: bool,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { show_rivals: true }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.stride/config.toml` in cwd)
    /// 3. User config (`~/.stride/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.stride/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = stride_home()?;
        Self::load_layer(&home.join("config.toml"))
    }

    /// Load project config from `.stride/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_layer(&cwd.join(STRIDE_DIR).join("config.toml"))
    }

    /// Load one layer, treating a missing file as absent and a broken one as
    /// absent with a warning.
    fn load_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| StrideError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| StrideError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // STRIDE_XP_PER_LESSON
        if let Some(n) = award_from_env("STRIDE_XP_PER_LESSON", self.rewards.xp_per_lesson) {
            self.rewards.xp_per_lesson = n;
        }

        // STRIDE_XP_PER_PROJECT
        if let Some(n) = award_from_env("STRIDE_XP_PER_PROJECT", self.rewards.xp_per_project) {
            self.rewards.xp_per_project = n;
        }

        // STRIDE_ASSISTANT_COMMAND
        if let Ok(val) = env::var("STRIDE_ASSISTANT_COMMAND") {
            if val.trim().is_empty() {
                eprintln!("Warning: STRIDE_ASSISTANT_COMMAND is empty. Ignoring.");
            } else {
                self.assistant.command = Some(val);
            }
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Fields are merged one at a time, taking each value from `other` that
    /// differs from the default. A higher layer cannot therefore restore a
    /// default that a lower layer changed.
    fn merge(mut self, other: Config) -> Self {
        let default_rewards = RewardsConfig::default();
        if other.rewards.xp_per_lesson != default_rewards.xp_per_lesson {
            self.rewards.xp_per_lesson = other.rewards.xp_per_lesson;
        }
        if other.rewards.xp_per_project != default_rewards.xp_per_project {
            self.rewards.xp_per_project = other.rewards.xp_per_project;
        }

        if other.assistant.command.is_some() {
            self.assistant.command = other.assistant.command;
        }
        if !other.assistant.args.is_empty() {
            self.assistant.args = other.assistant.args;
        }

        if other.leaderboard.show_rivals != LeaderboardConfig::default().show_rivals {
            self.leaderboard.show_rivals = other.leaderboard.show_rivals;
        }

        self
    }
}

/// Parse an XP award override, reporting and ignoring invalid values.
fn award_from_env(var: &str, current: u64) -> Option<u64> {
    let val = env::var(var).ok()?;
    match val.parse::<u64>() {
        Ok(n) if RewardsConfig::is_valid_award(n) => Some(n),
        _ => {
            eprintln!(
                "Warning: Invalid {} value '{}'. \
                Expected a positive integer. Using '{}'.",
                var, val, current
            );
            None
        }
    }
}

/// Get the Stride home directory.
///
/// Returns `$STRIDE_HOME` if set, otherwise `~/.stride`.
///
/// # Validation
///
/// An empty `STRIDE_HOME` is ignored. A relative one is canonicalized when it
/// exists and used as-is otherwise.
pub fn stride_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("STRIDE_HOME") {
        if home.is_empty() {
            tracing::warn!("STRIDE_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("STRIDE_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(STRIDE_DIR));
    }

    // Containers and minimal environments without HOME
    let fallback_path = fallback_stride_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get fallback stride home path when HOME is unavailable.
#[cfg(unix)]
fn fallback_stride_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/stride-{}", uid))
}

/// Get fallback stride home path when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_stride_home() -> PathBuf {
    std::env::temp_dir().join("stride")
}

/// Get the activity journal path.
///
/// Returns `<stride_home>/activity.log`.
pub fn activity_log_path() -> Option<PathBuf> {
    stride_home().map(|home| home.join("activity.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        env::remove_var("STRIDE_XP_PER_LESSON");
        env::remove_var("STRIDE_XP_PER_PROJECT");
        env::remove_var("STRIDE_ASSISTANT_COMMAND");
    }

    fn write_project_config(dir: &Path, content: &str) {
        let stride_dir = dir.join(".stride");
        fs::create_dir_all(&stride_dir).unwrap();
        fs::write(stride_dir.join("config.toml"), content).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.rewards.xp_per_lesson, 50);
        assert_eq!(config.rewards.xp_per_project, 200);
        assert!(config.assistant.command.is_none());
        assert!(config.assistant.args.is_empty());
        assert!(config.leaderboard.show_rivals);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
[rewards]
xp_per_lesson = 75

[assistant]
command = "course-assistant"
args = ["--model", "small"]
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert_eq!(config.rewards.xp_per_lesson, 75);
        assert_eq!(config.assistant.command.as_deref(), Some("course-assistant"));
        assert_eq!(config.assistant.args, vec!["--model", "small"]);

        // Other fields should be defaults
        assert_eq!(config.rewards.xp_per_project, 200);
        assert!(config.leaderboard.show_rivals);
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(StrideError::Config { .. })));
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[rewards]\nxp_per_project = 300\n");

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.rewards.xp_per_project, 300);
        assert_eq!(config.rewards.xp_per_lesson, 50);
    }

    #[test]
    #[serial]
    fn test_user_config_layered_under_project() {
        clear_env();
        let home = TempDir::new().unwrap();
        fs::write(
            home.path().join("config.toml"),
            "[rewards]\nxp_per_lesson = 60\nxp_per_project = 250\n",
        )
        .unwrap();
        let project = TempDir::new().unwrap();
        write_project_config(project.path(), "[rewards]\nxp_per_project = 400\n");
        env::set_var("STRIDE_HOME", home.path());

        let config = Config::load_from_cwd(project.path());

        assert_eq!(config.rewards.xp_per_lesson, 60);
        assert_eq!(config.rewards.xp_per_project, 400);

        env::remove_var("STRIDE_HOME");
    }

    #[test]
    #[serial]
    fn test_broken_project_config_is_ignored() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[rewards\nxp_per_lesson = ");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.rewards, RewardsConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[rewards]\nxp_per_lesson = 70\n");

        env::set_var("STRIDE_XP_PER_LESSON", "90");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.rewards.xp_per_lesson, 90);

        env::remove_var("STRIDE_XP_PER_LESSON");
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        env::set_var("STRIDE_XP_PER_LESSON", "10");
        env::set_var("STRIDE_XP_PER_PROJECT", "1000");
        env::set_var("STRIDE_ASSISTANT_COMMAND", "/usr/local/bin/assist");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.rewards.xp_per_lesson, 10);
        assert_eq!(config.rewards.xp_per_project, 1000);
        assert_eq!(
            config.assistant.command.as_deref(),
            Some("/usr/local/bin/assist")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_award_ignored() {
        clear_env();
        env::set_var("STRIDE_XP_PER_LESSON", "0");
        env::set_var("STRIDE_XP_PER_PROJECT", "lots");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.rewards.xp_per_lesson, 50);
        assert_eq!(config.rewards.xp_per_project, 200);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_empty_command_ignored() {
        clear_env();
        env::set_var("STRIDE_ASSISTANT_COMMAND", "  ");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());
        assert!(config.assistant.command.is_none());

        clear_env();
    }

    #[test]
    fn test_merge_field_by_field() {
        let base = Config {
            rewards: RewardsConfig {
                xp_per_lesson: 80,
                xp_per_project: 200,
            },
            assistant: AssistantConfig {
                command: Some("base-assist".to_string()),
                args: vec!["--fast".to_string()],
            },
            leaderboard: LeaderboardConfig { show_rivals: false },
        };
        let over = Config {
            rewards: RewardsConfig {
                xp_per_lesson: 50,
                xp_per_project: 500,
            },
            assistant: AssistantConfig {
                command: Some("over-assist".to_string()),
                args: Vec::new(),
            },
            leaderboard: LeaderboardConfig::default(),
        };

        let merged = base.merge(over);

        // Default-valued fields in the higher layer leave the lower one alone.
        assert_eq!(merged.rewards.xp_per_lesson, 80);
        assert_eq!(merged.rewards.xp_per_project, 500);
        assert_eq!(merged.assistant.command.as_deref(), Some("over-assist"));
        assert_eq!(merged.assistant.args, vec!["--fast"]);
        assert!(!merged.leaderboard.show_rivals);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[leaderboard]\nshow_rivals = false\n").unwrap();
        assert!(!config.leaderboard.show_rivals);
        assert_eq!(config.rewards, RewardsConfig::default());
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let config = Config {
            rewards: RewardsConfig {
                xp_per_lesson: 40,
                xp_per_project: 120,
            },
            assistant: AssistantConfig {
                command: Some("assist".to_string()),
                args: vec!["-q".to_string()],
            },
            leaderboard: LeaderboardConfig { show_rivals: false },
        };

        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    #[serial]
    fn test_stride_home_with_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("STRIDE_HOME", dir.path().to_str().unwrap());

        let home = stride_home().unwrap();
        assert_eq!(home, dir.path());

        env::remove_var("STRIDE_HOME");
    }

    #[test]
    #[serial]
    fn test_stride_home_fallback() {
        env::remove_var("STRIDE_HOME");

        let home = stride_home();
        assert!(home.is_some());
        assert!(home.unwrap().ends_with(".stride"));
    }

    #[test]
    #[serial]
    fn test_stride_home_empty_env() {
        env::set_var("STRIDE_HOME", "");

        let home = stride_home();
        assert!(home.is_some());
        assert!(home.unwrap().ends_with(".stride"));

        env::remove_var("STRIDE_HOME");
    }

    #[test]
    #[serial]
    fn test_activity_log_path() {
        let dir = TempDir::new().unwrap();
        env::set_var("STRIDE_HOME", dir.path());

        assert_eq!(
            activity_log_path().unwrap(),
            dir.path().join("activity.log")
        );

        env::remove_var("STRIDE_HOME");
    }
}
