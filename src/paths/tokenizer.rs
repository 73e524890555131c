//! Absolute → portable path rewriting.

use super::PathRoots;
use super::canonical::{is_rooted, normalize_path, normalize_separators, normalize_token_path, strip_root};
use super::tokens::PathToken;
use crate::storage::InstallInfo;

/// Rewrites absolute paths relative to the configured symbolic roots.
#[derive(Debug, Clone, Copy)]
pub struct PathTokenizer<'a> {
    roots: &'a PathRoots,
}

impl<'a> PathTokenizer<'a> {
    /// Creates a tokenizer over the current machine roots.
    #[must_use]
    pub const fn new(roots: &'a PathRoots) -> Self {
        Self { roots }
    }

    /// Produces the portable storage form of `raw`.
    ///
    /// The first root in [`PathToken::TOKENIZE_ORDER`] that equals or contains
    /// the path wins. Relative input is only normalized, since it is already
    /// relative to `{GameFolder}`. Paths outside every root stay absolute.
    #[must_use]
    pub fn tokenize(&self, raw: &str, install: &InstallInfo) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let value = normalize_separators(trimmed);
        if !is_rooted(&value) {
            return normalize_token_path(&value);
        }

        let normalized = normalize_path(&value);
        let game_folder = normalize_path(install.game_folder());

        PathToken::TOKENIZE_ORDER
            .iter()
            .find_map(|&token| {
                let root = match token {
                    PathToken::GameFolder => game_folder.as_str(),
                    other => self.roots.value_of(other),
                };
                tokenize_inside_root(&normalized, root, token)
            })
            .unwrap_or_else(|| normalize_token_path(&normalized))
    }
}

/// Replaces `root` at the start of `path` with `token`.
fn tokenize_inside_root(path: &str, root: &str, token: PathToken) -> Option<String> {
    let rest = strip_root(path, root)?;
    let rest = rest.trim_start_matches(['\\', '/']);
    if rest.is_empty() {
        Some(token.placeholder().to_string())
    } else {
        Some(format!("{}\\{rest}", token.placeholder()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> PathRoots {
        PathRoots::new("D:\\Games", "D:\\Games\\Cache", "E:\\LaunchBox", "C:\\Tools\\Relay")
    }

    fn install(folder: &str) -> InstallInfo {
        InstallInfo {
            game_folder_path: folder.to_string(),
            ..InstallInfo::default()
        }
    }

    #[test]
    fn test_tokenize_games_root() {
        let roots = roots();
        let tokenizer = PathTokenizer::new(&roots);
        assert_eq!(
            tokenizer.tokenize("d:/games/Foo/Foo.exe", &install("")),
            "{GamesRoot}\\Foo\\Foo.exe"
        );
        assert_eq!(tokenizer.tokenize("D:\\Games\\", &install("")), "{GamesRoot}");
    }

    #[test]
    fn test_first_root_in_priority_order_wins() {
        let roots = roots();
        let tokenizer = PathTokenizer::new(&roots);
        // CacheRoot is nested inside GamesRoot; GamesRoot is tested first.
        assert_eq!(
            tokenizer.tokenize("D:\\Games\\Cache\\x.exe", &install("")),
            "{GamesRoot}\\Cache\\x.exe"
        );
    }

    #[test]
    fn test_game_folder_and_relay_dir() {
        let roots = roots();
        let tokenizer = PathTokenizer::new(&roots);
        assert_eq!(
            tokenizer.tokenize("F:\\Other\\Bar\\bin\\bar.exe", &install("F:\\Other\\Bar")),
            "{GameFolder}\\bin\\bar.exe"
        );
        assert_eq!(
            tokenizer.tokenize("C:\\Tools\\Relay\\helper.exe", &install("")),
            "{RelayDir}\\helper.exe"
        );
    }

    #[test]
    fn test_base_folder_used_when_game_folder_empty() {
        let roots = PathRoots::default();
        let tokenizer = PathTokenizer::new(&roots);
        let install = InstallInfo {
            base_folder: "F:\\Base".to_string(),
            ..InstallInfo::default()
        };
        assert_eq!(tokenizer.tokenize("F:\\Base\\a.exe", &install), "{GameFolder}\\a.exe");
    }

    #[test]
    fn test_outside_roots_and_relative() {
        let roots = roots();
        let tokenizer = PathTokenizer::new(&roots);
        assert_eq!(
            tokenizer.tokenize("Z:\\Elsewhere\\x.exe\\", &install("")),
            "Z:\\Elsewhere\\x.exe"
        );
        assert_eq!(tokenizer.tokenize("D:\\Games2\\x.exe", &install("")), "D:\\Games2\\x.exe");
        assert_eq!(tokenizer.tokenize("bin/x.exe", &install("")), "bin\\x.exe");
        assert_eq!(
            tokenizer.tokenize("{gamesroot}/Foo", &install("")),
            "{GamesRoot}\\Foo"
        );
        assert_eq!(tokenizer.tokenize("   ", &install("")), "");
    }
}
