//! Configuration
//!
//! Layered settings: built-in defaults, then a TOML file, then environment
//! variables prefixed `CHARSHEET_` (nested keys separated by `__`, e.g.
//! `CHARSHEET_RULESET__SOURCE=PHB`).

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::dice::DEFAULT_MAX_DICE;

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "charsheet.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CHARSHEET_";

/// Which slice of the reference data counts as supported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetSettings {
    /// Source code whose entries are always kept
    pub source: String,
    /// Edition marker whose entries are kept regardless of source
    pub edition: String,
}

impl Default for RulesetSettings {
    fn default() -> Self {
        Self {
            source: "XPHB".to_string(),
            edition: "one".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSettings {
    /// Most dice a single text formula may roll
    pub max_dice: u32,
}

impl Default for DiceSettings {
    fn default() -> Self {
        Self {
            max_dice: DEFAULT_MAX_DICE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "charsheet=info".to_string(),
            json: false,
        }
    }
}

/// All settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ruleset: RulesetSettings,
    #[serde(default)]
    pub dice: DiceSettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl Settings {
    /// Build the provider chain; a missing file is skipped
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load settings from defaults, file and environment
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ruleset.source, "XPHB");
        assert_eq!(settings.ruleset.edition, "one");
        assert_eq!(settings.dice.max_dice, 100);
        assert!(!settings.log.json);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let settings = Settings::load(Some(Path::new("absent.toml")))?;
            assert_eq!(settings, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                "[ruleset]\nsource = \"PHB\"\nedition = \"classic\"\n\n[dice]\nmax_dice = 20",
            )?;

            let settings = Settings::load(Some(Path::new("custom.toml")))?;
            assert_eq!(settings.ruleset.source, "PHB");
            assert_eq!(settings.ruleset.edition, "classic");
            assert_eq!(settings.dice.max_dice, 20);
            assert_eq!(settings.log, LogSettings::default());
            Ok(())
        });
    }

    #[test]
    fn test_partial_section() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[log]\njson = true")?;

            let settings = Settings::load(None)?;
            assert!(settings.log.json);
            assert_eq!(settings.log.filter, "charsheet=info");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                "[ruleset]\nsource = \"XDMG\"\nedition = \"classic\"\n\n[dice]\nmax_dice = 20",
            )?;
            jail.set_env("CHARSHEET_RULESET__SOURCE", "PHB");
            jail.set_env("CHARSHEET_DICE__MAX_DICE", "5");

            let settings = Settings::load(None)?;
            assert_eq!(settings.ruleset.source, "PHB");
            assert_eq!(settings.dice.max_dice, 5);
            // untouched by env, so the file wins
            assert_eq!(settings.ruleset.edition, "classic");
            // untouched by both, so the default holds
            assert_eq!(settings.log, LogSettings::default());
            Ok(())
        });
    }
}
