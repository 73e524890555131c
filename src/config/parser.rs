use super::{Config, REGEX_RULE_PREFIX};
use anyhow::{Context, Result};
use std::path::Path;

/// Reads and validates a config file.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let config = read_config_file(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Reads a config file without validating it.
pub fn read_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content).with_context(|| "Failed to parse TOML config")
}

/// Parses and validates TOML text.
///
/// # Errors
///
/// Returns an error for invalid TOML or a failed validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    // Validate and return validation errors directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

/// Checks the invariants a launch or scan relies on.
///
/// # Errors
///
/// Returns an error describing the first problem found.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.schema_version < 1 {
        anyhow::bail!("schema_version must be at least 1");
    }

    if config.cache.enabled && config.paths.cache_root.trim().is_empty() {
        anyhow::bail!("paths.cache_root is required when the cache is enabled");
    }

    let rules = [
        (
            "scanner_rules.exe_ignore_name_patterns",
            &config.scanner_rules.exe_ignore_name_patterns,
        ),
        (
            "scanner_rules.exe_ignore_folder_name_patterns",
            &config.scanner_rules.exe_ignore_folder_name_patterns,
        ),
    ];
    for (field, patterns) in rules {
        for pattern in patterns {
            if let Some(expr) = strip_regex_prefix(pattern)
                && !expr.trim().is_empty()
                && let Err(e) = regex::Regex::new(expr)
            {
                anyhow::bail!("Invalid regex in {field}: {pattern}: {e}");
            }
        }
    }

    Ok(())
}

/// Returns the expression of a `regex:` rule, matching the prefix in any case.
#[must_use]
pub fn strip_regex_prefix(pattern: &str) -> Option<&str> {
    let head = pattern.get(..REGEX_RULE_PREFIX.len())?;
    head.eq_ignore_ascii_case(REGEX_RULE_PREFIX)
        .then(|| &pattern[REGEX_RULE_PREFIX.len()..])
}
