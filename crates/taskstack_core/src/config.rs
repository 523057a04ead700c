use crate::error::AppError;
use crate::history::RedoPolicy;

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub redo_policy: RedoPolicy,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redo_policy: RedoPolicy::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub redo_policy: Option<RedoPolicy>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverride {
    RedoPolicy(RedoPolicy),
    LogLevel(String),
}

impl ConfigOverrides {
    /// Parses every raw `KEY=VALUE` pair; later pairs win over earlier ones.
    pub fn from_raw<S: AsRef<str>>(raw: &[S]) -> Result<Self, AppError> {
        let mut overrides = Self::default();
        for entry in raw {
            match parse_config_override(entry.as_ref())? {
                ConfigOverride::RedoPolicy(policy) => overrides.redo_policy = Some(policy),
                ConfigOverride::LogLevel(level) => overrides.log_level = Some(level),
            }
        }
        Ok(overrides)
    }
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(policy) = overrides.redo_policy {
        merged.redo_policy = policy;
    }
    if let Some(level) = overrides.log_level.as_ref() {
        merged.log_level = level.clone();
    }
    merged
}

pub fn parse_config_override(raw: &str) -> Result<ConfigOverride, AppError> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;

    let field = canonicalize_name(key_raw)
        .ok_or_else(|| AppError::invalid_input("override key cannot be empty"))?;
    let value = value_raw.trim();

    match field.as_str() {
        "redo_policy" | "redo" => parse_redo_policy(value).map(ConfigOverride::RedoPolicy),
        "log_level" | "log" => parse_log_level(value).map(ConfigOverride::LogLevel),
        other => Err(AppError::invalid_input(format!(
            "unknown config field '{other}'"
        ))),
    }
}

pub fn parse_redo_policy(raw: &str) -> Result<RedoPolicy, AppError> {
    match canonicalize_name(raw).as_deref() {
        Some("retain" | "keep" | "preserve") => Ok(RedoPolicy::Retain),
        Some("clear" | "clear_on_record" | "discard") => Ok(RedoPolicy::ClearOnRecord),
        _ => Err(AppError::invalid_input(format!(
            "unknown redo policy '{}' (expected retain or clear)",
            raw.trim()
        ))),
    }
}

pub fn parse_log_level(raw: &str) -> Result<String, AppError> {
    let level = match canonicalize_name(raw).as_deref() {
        Some("off" | "none" | "quiet") => "off",
        Some("error") => "error",
        Some("warn" | "warning") => "warn",
        Some("info") => "info",
        Some("debug") => "debug",
        Some("trace") => "trace",
        _ => {
            return Err(AppError::invalid_input(format!(
                "unknown log level '{}'",
                raw.trim()
            )));
        }
    };
    Ok(level.to_string())
}

/// Lowercases ASCII words and joins them with `_`; any other character
/// separates words. `None` when no word is left.
fn canonicalize_name(name: &str) -> Option<String> {
    let words: Vec<String> = name
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("_"))
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverride, ConfigOverrides, canonicalize_name, merge_overrides,
        parse_config_override, parse_log_level, parse_redo_policy,
    };
    use crate::history::RedoPolicy;

    #[test]
    fn defaults_retain_redo_and_log_info() {
        let config = Config::default();
        assert_eq!(config.redo_policy, RedoPolicy::Retain);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" Redo-Policy = Clear ").unwrap();
        assert_eq!(parsed, ConfigOverride::RedoPolicy(RedoPolicy::ClearOnRecord));

        let parsed = parse_config_override("LOG.LEVEL=Warning").unwrap();
        assert_eq!(parsed, ConfigOverride::LogLevel("warn".to_string()));
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("theme=noir").unwrap_err();
        assert!(err.to_string().contains("unknown config field 'theme'"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("redo_policy").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        assert!(err.to_string().contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_empty_key() {
        let err = parse_config_override(" = clear").unwrap_err();
        assert!(err.to_string().contains("key cannot be empty"));
    }

    #[test]
    fn names_fold_case_and_punctuation() {
        assert_eq!(canonicalize_name(" Redo--Policy. ").as_deref(), Some("redo_policy"));
        assert_eq!(canonicalize_name("LOG level").as_deref(), Some("log_level"));
        assert_eq!(canonicalize_name(" -_ "), None);
    }

    #[test]
    fn redo_policy_accepts_aliases() {
        assert_eq!(parse_redo_policy("keep").unwrap(), RedoPolicy::Retain);
        assert_eq!(
            parse_redo_policy("clear-on-record").unwrap(),
            RedoPolicy::ClearOnRecord
        );
        assert!(parse_redo_policy("sometimes").is_err());
    }

    #[test]
    fn log_level_rejects_unknown_names() {
        assert_eq!(parse_log_level("QUIET").unwrap(), "off");
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn later_overrides_win_and_merge_over_base() {
        let overrides =
            ConfigOverrides::from_raw(&["redo=clear", "log_level=debug", "redo=retain"]).unwrap();
        let base = Config {
            redo_policy: RedoPolicy::ClearOnRecord,
            log_level: "info".to_string(),
        };

        let merged = merge_overrides(&base, &overrides);
        assert_eq!(merged.redo_policy, RedoPolicy::Retain);
        assert_eq!(merged.log_level, "debug");
    }

    #[test]
    fn empty_overrides_keep_base() {
        let base = Config::default();
        let merged = merge_overrides(&base, &ConfigOverrides::default());
        assert_eq!(merged, base);
    }
}
