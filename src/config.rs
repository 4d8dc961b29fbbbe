//! Configuration for terminal handles
//!
//! Precedence is explicit value > environment > defaults. Config files are
//! JSON; any field left out takes its default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Terminal handle configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Terminal type; `None` means `$TERM` at setup time
    pub term: Option<String>,
    /// Device opened by [`crate::Terminal::open_tty`]
    pub tty_path: PathBuf,
    /// Lines affected by a control string, for proportional padding
    pub affected_lines: i32,
    /// Consult `$LINES` / `$COLUMNS` when the tty reports no size
    pub use_env_size: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            term: None,
            tty_path: PathBuf::from("/dev/tty"),
            affected_lines: 1,
            use_env_size: true,
        }
    }
}

impl Config {
    /// Defaults with the terminal type taken from `$TERM`
    pub fn from_env() -> Self {
        Self {
            term: env::var("TERM").ok().filter(|t| !t.is_empty()),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.affected_lines < 1 {
            return Err(Error::Config(format!(
                "affected_lines must be at least 1, got {}",
                self.affected_lines
            )));
        }
        if matches!(&self.term, Some(t) if t.is_empty()) {
            return Err(Error::Config("term must not be empty".to_string()));
        }
        if self.tty_path.as_os_str().is_empty() {
            return Err(Error::Config("tty_path must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.term, None);
        assert_eq!(config.tty_path, PathBuf::from("/dev/tty"));
        assert_eq!(config.affected_lines, 1);
        assert!(config.use_env_size);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = Config::from_json(r#"{ "term": "vt100" }"#).unwrap();
        assert_eq!(config.term.as_deref(), Some("vt100"));
        assert_eq!(config.affected_lines, 1);
    }

    #[test]
    fn test_invalid_affected_lines() {
        let err = Config::from_json(r#"{ "affected_lines": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_term_rejected() {
        let config = Config {
            term: Some(String::new()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Config::from_json("{"), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "term": "linux", "affected_lines": 4, "use_env_size": false }}"#
        )
        .unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.term.as_deref(), Some("linux"));
        assert_eq!(config.affected_lines, 4);
        assert!(!config.use_env_size);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("absent.json")));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config {
            term: Some("screen-256color".to_string()),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }
}
