use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Reports configuration keys relay does not read
pub struct ConfigValidator {
    /// Every key the loader understands
    known_fields: HashSet<&'static str>,
    /// Keys written by the desktop shell that have no effect here
    ignored_fields: HashSet<&'static str>,
}

/// Findings of one validation pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FieldReport {
    /// Keys nobody reads
    pub unknown: Vec<String>,
    /// Keys that belong to the shell
    pub ignored: Vec<String>,
}

impl FieldReport {
    /// True when nothing was found
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.ignored.is_empty()
    }
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields: HashSet<&'static str> = [
            "schema_version",
            "paths.games_root",
            "paths.cache_root",
            "paths.launchbox_root",
            "paths.scan_roots",
            "launchbox.root_path",
            "scanning.min_exe_bytes",
            "scanning.excluded_exe_patterns",
            "scanning.excluded_folder_names",
            "scanning.incremental",
            "scanning.skip_known",
            "scanner_rules.exe_ignore_name_patterns",
            "scanner_rules.exe_ignore_folder_name_patterns",
            "launch.actually_launch",
            "cache.enabled",
            "diagnostics.verbose_logging",
        ]
        .into_iter()
        .collect();

        let ignored_fields: HashSet<&'static str> = [
            "paths.shortcut_import_root",
            "paths.shortcut_output_root",
            "paths.temp_root",
            "launchbox.preferred_platforms",
            "cache.max_bytes",
            "cache.purge_policy",
            "cache.keep_pinned",
            "scanning.enabled",
            "overlay",
        ]
        .into_iter()
        .collect();

        Self {
            known_fields,
            ignored_fields,
        }
    }

    /// Validate a configuration file and print warnings about its keys
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<FieldReport> {
        if !config_path.exists() {
            return Ok(FieldReport::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let report = self.check_str(&content)?;

        if !report.is_clean() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for field in &report.unknown {
                eprintln!("  Unknown configuration field: {}", field.yellow());
            }
            for field in &report.ignored {
                eprintln!(
                    "  Ignored field '{}': {}",
                    field.yellow(),
                    "read by the desktop shell only, no effect here".dimmed()
                );
            }
            eprintln!();
        }

        Ok(report)
    }

    /// Classifies every key of a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid TOML
    pub fn check_str(&self, content: &str) -> Result<FieldReport> {
        let parsed: toml::Value = toml::from_str(content)?;
        let mut report = FieldReport::default();
        self.check_table(&parsed, "", &mut report);
        Ok(report)
    }

    /// Recursively checks a TOML table for unknown and ignored fields
    ///
    /// Arrays are leaves; a table is descended into unless the whole table is
    /// known or ignored.
    fn check_table(&self, table: &toml::Value, prefix: &str, report: &mut FieldReport) {
        let toml::Value::Table(map) = table else {
            return;
        };

        for (key, value) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if self.ignored_fields.contains(full_key.as_str()) {
                report.ignored.push(full_key);
            } else if self.known_fields.contains(full_key.as_str()) {
                continue;
            } else if let toml::Value::Table(_) = value {
                self.check_table(value, &full_key, report);
            } else {
                report.unknown.push(full_key);
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_fields_are_clean() {
        let report = ConfigValidator::new()
            .check_str(
                r#"
schema_version = 1
[paths]
games_root = "D:\\Games"
scan_roots = []
[scanning]
skip_known = true
"#,
            )
            .unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn test_unknown_and_ignored_fields() {
        let report = ConfigValidator::new()
            .check_str(
                r"
[paths]
games_rot = 'typo'
temp_root = 'T:\tmp'
[overlay]
enabled = true
",
            )
            .unwrap();
        assert_eq!(report.unknown, vec!["paths.games_rot".to_string()]);
        assert_eq!(
            report.ignored,
            vec!["overlay".to_string(), "paths.temp_root".to_string()]
        );
    }
}
