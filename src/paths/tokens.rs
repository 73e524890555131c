//! The fixed set of symbolic path roots.

use std::fmt;

/// A symbolic root that stands in for a machine-specific absolute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathToken {
    /// Library root holding game installations.
    GamesRoot,
    /// Local cache root.
    CacheRoot,
    /// LaunchBox installation root.
    LaunchBoxRoot,
    /// The game's own install/working folder.
    GameFolder,
    /// Directory of the resolved main executable.
    MainExeDir,
    /// Directory of the running relay binary.
    RelayDir,
}

impl PathToken {
    /// Every token, in canonical listing order.
    pub const ALL: [Self; 6] = [
        Self::GamesRoot,
        Self::CacheRoot,
        Self::LaunchBoxRoot,
        Self::GameFolder,
        Self::MainExeDir,
        Self::RelayDir,
    ];

    /// Tokens a path may be rewritten into, in priority order. The first
    /// root that contains a path wins.
    pub const TOKENIZE_ORDER: [Self; 5] = [
        Self::GamesRoot,
        Self::CacheRoot,
        Self::LaunchBoxRoot,
        Self::GameFolder,
        Self::RelayDir,
    ];

    /// Canonical placeholder spelling, braces included.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::GamesRoot => "{GamesRoot}",
            Self::CacheRoot => "{CacheRoot}",
            Self::LaunchBoxRoot => "{LaunchBoxRoot}",
            Self::GameFolder => "{GameFolder}",
            Self::MainExeDir => "{MainExeDir}",
            Self::RelayDir => "{RelayDir}",
        }
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.placeholder())
    }
}

/// Replaces every ASCII-case-insensitive occurrence of `needle`.
#[must_use]
pub fn replace_ignore_ascii_case(text: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return text.to_string();
    }

    // ASCII lowering keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(found) = lowered[cursor..].find(&needle) {
        let start = cursor + found;
        out.push_str(&text[cursor..start]);
        out.push_str(replacement);
        cursor = start + needle.len();
    }
    out.push_str(&text[cursor..]);
    out
}

/// True when `text` contains `token` in any ASCII casing.
#[must_use]
pub fn contains_token(text: &str, token: PathToken) -> bool {
    text.to_ascii_lowercase()
        .contains(&token.placeholder().to_ascii_lowercase())
}

/// Re-cases every recognized token to its canonical spelling.
#[must_use]
pub fn canonicalize_tokens(text: &str) -> String {
    if !text.contains('{') {
        return text.to_string();
    }
    PathToken::ALL.iter().fold(text.to_string(), |acc, token| {
        replace_ignore_ascii_case(&acc, token.placeholder(), token.placeholder())
    })
}

/// Comma-separated list of the tokens used by a raw target or working
/// directory, `"none"` when neither uses one.
#[must_use]
pub fn token_summary(raw_target: &str, raw_workdir: &str) -> String {
    let combined = format!("{raw_target} {raw_workdir}");
    let used: Vec<&str> = PathToken::ALL
        .iter()
        .filter(|token| contains_token(&combined, **token))
        .map(|token| token.placeholder())
        .collect();

    if used.is_empty() {
        "none".to_string()
    } else {
        used.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_tokens() {
        assert_eq!(
            canonicalize_tokens("{GAMESROOT}\\a\\{mainexedir}"),
            "{GamesRoot}\\a\\{MainExeDir}"
        );
        assert_eq!(canonicalize_tokens("{Unknown}\\x"), "{Unknown}\\x");
    }

    #[test]
    fn test_replace_ignore_ascii_case_multiple() {
        assert_eq!(
            replace_ignore_ascii_case("{gamefolder}\\{GameFolder}", "{GameFolder}", "X"),
            "X\\X"
        );
        assert_eq!(replace_ignore_ascii_case("abc", "", "X"), "abc");
    }

    #[test]
    fn test_replace_keeps_non_ascii_text() {
        assert_eq!(
            replace_ignore_ascii_case("Spiele\\Ünïcode\\{relaydir}", "{RelayDir}", "R"),
            "Spiele\\Ünïcode\\R"
        );
    }

    #[test]
    fn test_token_summary() {
        assert_eq!(token_summary("C:\\x.exe", ""), "none");
        assert_eq!(
            token_summary("{GamesRoot}\\a.exe", "{mainexedir}"),
            "{GamesRoot}, {MainExeDir}"
        );
    }
}
