use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration for the `mbasic` CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub interpreter: InterpreterConfig,
    pub repl: ReplConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Default slot count per dimension for an array referenced without a
    /// prior `DIM` (classic BASIC's implicit `DIM x(10)`).
    pub default_array_size: usize,
    /// Seed for `RND`; `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplConfig {
    /// Starting line number auto-assigned to typed-in lines with none.
    pub start_line: u32,
    /// Increment between auto-assigned line numbers.
    pub line_increment: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpreter: InterpreterConfig {
                default_array_size: 11,
                rng_seed: None,
            },
            repl: ReplConfig {
                start_line: 10,
                line_increment: 10,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(dirs) = directories::ProjectDirs::from("com", "mbasic", "mbasic") {
            let config_path = dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let content = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(Self::default())
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        if let Some(dirs) = directories::ProjectDirs::from("com", "mbasic", "mbasic") {
            std::fs::create_dir_all(dirs.config_dir())?;
            let config_path = dirs.config_dir().join("config.toml");
            let content = toml::to_string_pretty(self)?;
            std::fs::write(&config_path, content)?;
        }
        Ok(())
    }
}
