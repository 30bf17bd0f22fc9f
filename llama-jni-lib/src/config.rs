use std::{env, fmt, fs, path::Path, result::Result as StdResult, str::FromStr};

use anyhow::Context as _;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable naming a TOML file that overrides [`EngineConfig`] defaults.
pub const CONFIG_ENV: &str = "LLAMA_JNI_CONFIG";

pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "User:",
    "User",
    "USER:",
    "USER",
    "Assistant:",
    "Assistant",
    "ASSISTANT:",
    "ASSISTANT",
    "###",
    "<|start_header_id|>",
];

/// Inference settings shared by model loading and generation.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Context window in tokens.
    pub n_ctx: u32,
    pub n_threads: i32,
    pub n_threads_batch: i32,
    /// Upper bound on generated tokens per call.
    pub n_predict: usize,
    /// How many recent tokens the repetition penalty looks at.
    pub repeat_window: usize,
    pub repeat_penalty: f32,
    /// Maximum bytes rendered for a single token piece.
    pub piece_buffer: usize,
    /// Generation stops, and the output is cut, as soon as one of these appears.
    pub stop_words: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_ctx: 2048,
            n_threads: 4,
            n_threads_batch: 4,
            n_predict: 128,
            repeat_window: 64,
            repeat_penalty: 1.2,
            piece_buffer: 1024,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.as_ref().display(), e))
        })?;
        content.parse()
    }

    /// Config named by `LLAMA_JNI_CONFIG`, falling back to defaults when the
    /// variable is unset or the file cannot be used.
    pub fn from_env() -> Self {
        match read_env_config() {
            Ok(Some(config)) => {
                info!("Loaded engine config from {}", CONFIG_ENV);
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Ignoring {}: {:#}", CONFIG_ENV, e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_ctx == 0 {
            return Err(Error::config("n_ctx must be greater than 0"));
        }
        if self.n_threads <= 0 || self.n_threads_batch <= 0 {
            return Err(Error::config("thread counts must be greater than 0"));
        }
        if self.piece_buffer == 0 {
            return Err(Error::config("piece_buffer must be greater than 0"));
        }
        if !self.repeat_penalty.is_finite() || self.repeat_penalty <= 0.0 {
            return Err(Error::config(format!(
                "repeat_penalty must be a positive number, got {}",
                self.repeat_penalty
            )));
        }
        Ok(())
    }
}

fn read_env_config() -> anyhow::Result<Option<EngineConfig>> {
    let path = match env::var_os(CONFIG_ENV) {
        Some(path) => path,
        None => return Ok(None),
    };
    let config = EngineConfig::load(&path)
        .with_context(|| format!("loading {}", Path::new(&path).display()))?;
    Ok(Some(config))
}

impl FromStr for EngineConfig {
    type Err = Error;
    fn from_str(s: &str) -> StdResult<Self, Self::Err> {
        let config: EngineConfig = toml::from_str(s).map_err(Error::config)?;
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        toml::to_string_pretty(self)
            .map_err(|_| fmt::Error)
            .and_then(|s| write!(f, "{}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_native_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.n_ctx, 2048);
        assert_eq!(config.n_threads, 4);
        assert_eq!(config.n_threads_batch, 4);
        assert_eq!(config.n_predict, 128);
        assert_eq!(config.repeat_window, 64);
        assert!((config.repeat_penalty - 1.2).abs() < f32::EPSILON);
        assert_eq!(config.stop_words.len(), 10);
        assert_eq!(config.stop_words[0], "User:");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = "n_predict = 32\nstop_words = [\"</s>\"]".parse().unwrap();
        assert_eq!(config.n_predict, 32);
        assert_eq!(config.stop_words, vec!["</s>".to_string()]);
        assert_eq!(config.n_ctx, 2048);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<EngineConfig> = "temperature = 0.7".parse();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!("n_ctx = 0".parse::<EngineConfig>(), Err(Error::Config(_))));
        assert!(matches!(
            "repeat_penalty = -1.0".parse::<EngineConfig>(),
            Err(Error::Config(_))
        ));
        assert!(matches!("n_threads = 0".parse::<EngineConfig>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "n_ctx = 512").unwrap();
        writeln!(file, "repeat_penalty = 1.1").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.n_ctx, 512);
        assert!((config.repeat_penalty - 1.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    // The only test that touches CONFIG_ENV, so the cases run in sequence here.
    #[test]
    fn test_from_env() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.toml");
        fs::write(&good, "n_predict = 9\n").unwrap();
        env::set_var(CONFIG_ENV, &good);
        assert_eq!(EngineConfig::from_env().n_predict, 9);

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "n_ctx = 0\n").unwrap();
        env::set_var(CONFIG_ENV, &bad);
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());

        env::set_var(CONFIG_ENV, dir.path().join("absent.toml"));
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());

        env::remove_var(CONFIG_ENV);
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    }

    #[test]
    fn test_display_parses_back() {
        let config = EngineConfig {
            n_predict: 7,
            ..EngineConfig::default()
        };
        let parsed: EngineConfig = config.to_string().parse().unwrap();
        assert_eq!(parsed, config);
    }
}
