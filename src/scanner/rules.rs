use crate::config::parser::strip_regex_prefix;
use crate::config::{ScannerRulesConfig, ScanningConfig};
use glob::{MatchOptions, Pattern};
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// File-name fragments that mark an executable as a helper rather than the
/// game itself. Matched case-insensitively.
pub const PENALIZED_TOKENS: [&str; 14] = [
    "setup",
    "config",
    "settings",
    "launcher",
    "uninstall",
    "unins",
    "crash",
    "report",
    "benchmark",
    "server",
    "editor",
    "tool",
    "mod",
    "patch",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Number of penalized tokens contained in `file_name`.
#[must_use]
pub fn penalized_token_count(file_name: &str) -> usize {
    let lower = file_name.to_lowercase();
    PENALIZED_TOKENS
        .iter()
        .filter(|token| lower.contains(*token))
        .count()
}

/// True when `file_name` contains any penalized token.
#[must_use]
pub fn has_penalized_token(file_name: &str) -> bool {
    penalized_token_count(file_name) > 0
}

/// Case-insensitive `*`/`?` wildcard over a whole name.
#[derive(Debug, Clone)]
pub struct Wildcard {
    text: String,
    pattern: Pattern,
}

impl Wildcard {
    /// Compiles a wildcard. Brackets are literal; only `*` and `?` are
    /// special. Returns `None` for blank input.
    #[must_use]
    pub fn new(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut escaped = String::with_capacity(text.len());
        let mut previous_star = false;
        for c in text.chars() {
            match c {
                '*' if previous_star => continue,
                '[' => escaped.push_str("[[]"),
                ']' => escaped.push_str("[]]"),
                _ => escaped.push(c),
            }
            previous_star = c == '*';
        }

        match Pattern::new(&escaped) {
            Ok(pattern) => Some(Self {
                text: text.to_string(),
                pattern,
            }),
            Err(e) => {
                warn!(pattern = text, error = %e, "skipping invalid wildcard");
                None
            }
        }
    }

    /// Matches the whole of `value`.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.pattern.matches_with(value, MATCH_OPTIONS)
    }

    /// The pattern as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// One ignore rule: a wildcard or a `regex:` expression.
#[derive(Debug, Clone)]
pub enum RulePattern {
    /// Whole-name wildcard.
    Wildcard(Wildcard),
    /// Unanchored case-insensitive regular expression.
    Regex {
        /// The rule as configured, prefix included.
        text: String,
        /// Compiled expression.
        regex: Regex,
    },
}

impl RulePattern {
    /// Parses a configured rule. Blank, empty-regex and invalid rules are
    /// dropped.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let Some(expr) = strip_regex_prefix(text) else {
            return Wildcard::new(text).map(Self::Wildcard);
        };
        if expr.trim().is_empty() {
            return None;
        }
        match RegexBuilder::new(expr).case_insensitive(true).build() {
            Ok(regex) => Some(Self::Regex {
                text: text.to_string(),
                regex,
            }),
            Err(e) => {
                warn!(pattern = text, error = %e, "skipping invalid regex rule");
                None
            }
        }
    }

    /// Tests a name against the rule.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Wildcard(wildcard) => wildcard.matches(value),
            Self::Regex { regex, .. } => regex.is_match(value),
        }
    }

    /// The rule as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard(wildcard) => wildcard.as_str(),
            Self::Regex { text, .. } => text,
        }
    }
}

/// Compiled classification rules of one scan.
#[derive(Debug, Clone)]
pub struct ScanRules {
    /// Size floor below which an executable is `SmallExe`.
    pub min_exe_bytes: u64,
    excluded_folders: Vec<Wildcard>,
    excluded_exes: Vec<Wildcard>,
    ignore_names: Vec<RulePattern>,
    ignore_folders: Vec<RulePattern>,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self::from_config(&ScanningConfig::default(), &ScannerRulesConfig::default())
    }
}

impl ScanRules {
    /// Compiles the rule lists of a configuration.
    #[must_use]
    pub fn from_config(scanning: &ScanningConfig, rules: &ScannerRulesConfig) -> Self {
        Self {
            min_exe_bytes: scanning.effective_min_exe_bytes(),
            excluded_folders: compile_wildcards(&scanning.excluded_folder_names),
            excluded_exes: compile_wildcards(&scanning.excluded_exe_patterns),
            ignore_names: compile_rules(&rules.exe_ignore_name_patterns),
            ignore_folders: compile_rules(&rules.exe_ignore_folder_name_patterns),
        }
    }

    /// True when any segment of `relative_dir` matches an excluded folder
    /// name.
    #[must_use]
    pub fn is_folder_excluded(&self, relative_dir: &str) -> bool {
        segments(relative_dir).any(|segment| self.excluded_folders.iter().any(|w| w.matches(segment)))
    }

    /// True when the file name matches an excluded executable pattern.
    #[must_use]
    pub fn is_exe_pattern_excluded(&self, file_name: &str) -> bool {
        self.excluded_exes.iter().any(|w| w.matches(file_name))
    }

    /// Reason text when an ignore rule tags the executable, name rules first.
    /// Folder rules are tested against every segment of `relative_dir`.
    #[must_use]
    pub fn ignore_rule_reason(&self, file_name: &str, relative_dir: &str) -> Option<String> {
        if let Some(rule) = self.ignore_names.iter().find(|r| r.matches(file_name)) {
            return Some(format!("IgnoredByRule: NamePattern={}", rule.as_str()));
        }

        self.ignore_folders
            .iter()
            .find(|rule| segments(relative_dir).any(|segment| rule.matches(segment)))
            .map(|rule| format!("IgnoredByRule: FolderPattern={}", rule.as_str()))
    }
}

fn segments(relative_dir: &str) -> impl Iterator<Item = &str> {
    relative_dir.split(['\\', '/']).filter(|s| !s.is_empty())
}

fn compile_wildcards(patterns: &[String]) -> Vec<Wildcard> {
    patterns.iter().filter_map(|p| Wildcard::new(p)).collect()
}

fn compile_rules(patterns: &[String]) -> Vec<RulePattern> {
    patterns.iter().filter_map(|p| RulePattern::parse(p)).collect()
}
