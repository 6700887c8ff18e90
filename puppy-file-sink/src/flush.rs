//! Durability policy for sink writes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Controls when written lines are forced to stable storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlushMode {
    /// Sync the file after every write.
    #[default]
    Always,

    /// Sync only when `flush` is called or the sink is closed.
    Manual,
}

impl FlushMode {
    /// Whether a write in this mode must be synced before returning.
    pub fn syncs_each_write(self) -> bool {
        matches!(self, Self::Always)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for FlushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlushMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "manual" => Ok(Self::Manual),
            other => Err(format!(
                "unknown flush mode '{}', expected 'always' or 'manual'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_always() {
        assert_eq!(FlushMode::default(), FlushMode::Always);
        assert!(FlushMode::default().syncs_each_write());
        assert!(!FlushMode::Manual.syncs_each_write());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("always".parse::<FlushMode>().unwrap(), FlushMode::Always);
        assert_eq!(" Manual ".parse::<FlushMode>().unwrap(), FlushMode::Manual);
        assert_eq!(FlushMode::Manual.to_string(), "manual");

        let err = "sometimes".parse::<FlushMode>().unwrap_err();
        assert!(err.contains("sometimes"));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&FlushMode::Manual).unwrap();
        assert_eq!(json, "\"manual\"");

        let mode: FlushMode = serde_yaml_ng::from_str("always").unwrap();
        assert_eq!(mode, FlushMode::Always);
    }
}
