//! Path canonicalization, tokenization and token resolution.
//!
//! Stored paths are portable: absolute locations are rewritten relative to a
//! small set of configured roots (see [`PathToken`]) and expanded back against
//! the roots of the machine that launches the game.

pub mod canonical;
pub mod resolver;
pub mod tokenizer;
pub mod tokens;

pub use resolver::{ResolveWarning, TokenResolver};
pub use tokenizer::PathTokenizer;
pub use tokens::PathToken;

use crate::config::Config;
use canonical::{is_rooted, normalize_path};

/// Current absolute values of the machine-wide symbolic roots.
///
/// Every field is a normalized canonical path or empty when the root is not
/// configured. Game-specific roots (`{GameFolder}`, `{MainExeDir}`) come from
/// the entry being processed instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRoots {
    /// Value of `{GamesRoot}`.
    pub games_root: String,
    /// Value of `{CacheRoot}`.
    pub cache_root: String,
    /// Value of `{LaunchBoxRoot}`.
    pub launchbox_root: String,
    /// Value of `{RelayDir}`.
    pub relay_dir: String,
}

impl PathRoots {
    /// Builds roots from raw strings, normalizing each one.
    #[must_use]
    pub fn new(games_root: &str, cache_root: &str, launchbox_root: &str, relay_dir: &str) -> Self {
        Self {
            games_root: normalize_path(games_root),
            cache_root: normalize_path(cache_root),
            launchbox_root: normalize_path(launchbox_root),
            relay_dir: normalize_path(relay_dir),
        }
    }

    /// Reads the configured roots. Relative entries are taken relative to
    /// `relay_dir`, and an empty `paths.launchbox_root` falls back to
    /// `launchbox.root_path`.
    #[must_use]
    pub fn from_config(config: &Config, relay_dir: &str) -> Self {
        let relay_dir = normalize_path(relay_dir);
        let launchbox = if config.paths.launchbox_root.trim().is_empty() {
            &config.launchbox.root_path
        } else {
            &config.paths.launchbox_root
        };

        Self {
            games_root: resolve_against(&config.paths.games_root, &relay_dir),
            cache_root: resolve_against(&config.paths.cache_root, &relay_dir),
            launchbox_root: resolve_against(launchbox, &relay_dir),
            relay_dir,
        }
    }

    /// Value of a machine-wide token; empty for game-specific tokens.
    #[must_use]
    pub fn value_of(&self, token: PathToken) -> &str {
        match token {
            PathToken::GamesRoot => &self.games_root,
            PathToken::CacheRoot => &self.cache_root,
            PathToken::LaunchBoxRoot => &self.launchbox_root,
            PathToken::RelayDir => &self.relay_dir,
            PathToken::GameFolder | PathToken::MainExeDir => "",
        }
    }
}

/// Resolves a configured path against `base` when it is relative.
#[must_use]
pub fn resolve_against(value: &str, base: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if is_rooted(trimmed) || base.is_empty() {
        return normalize_path(trimmed);
    }
    normalize_path(&format!("{base}\\{trimmed}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_against() {
        assert_eq!(resolve_against("Games", "D:\\Relay"), "D:\\Relay\\Games");
        assert_eq!(resolve_against("..\\Games", "D:\\Relay"), "D:\\Games");
        assert_eq!(resolve_against("E:/Lib/", "D:\\Relay"), "E:\\Lib");
        assert_eq!(resolve_against("  ", "D:\\Relay"), "");
    }

    #[test]
    fn test_from_config_launchbox_fallback() {
        let mut config = Config::default();
        config.paths.games_root = "G:\\Games".to_string();
        config.launchbox.root_path = "L:\\LaunchBox".to_string();

        let roots = PathRoots::from_config(&config, "D:\\Relay\\");
        assert_eq!(roots.games_root, "G:\\Games");
        assert_eq!(roots.launchbox_root, "L:\\LaunchBox");
        assert_eq!(roots.relay_dir, "D:\\Relay");
        assert_eq!(roots.cache_root, "");

        config.paths.launchbox_root = "M:\\LB".to_string();
        let roots = PathRoots::from_config(&config, "D:\\Relay");
        assert_eq!(roots.launchbox_root, "M:\\LB");
    }
}
