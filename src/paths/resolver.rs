//! Portable → absolute path expansion at launch time.

use super::PathRoots;
use super::canonical::{is_rooted, normalize_path, normalize_separators, parent};
use super::tokens::{PathToken, contains_token, replace_ignore_ascii_case};
use crate::storage::{InstallInfo, LaunchContract};
use std::fmt;

/// Why a stored path could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// A token was left in place because its root is unknown.
    UnresolvedToken {
        /// The raw stored path.
        raw: String,
    },
    /// A relative path needs `{GameFolder}`, which is empty.
    MissingGameFolder {
        /// The raw stored path.
        raw: String,
    },
}

impl ResolveWarning {
    /// The raw path that failed to resolve.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::UnresolvedToken { raw } | Self::MissingGameFolder { raw } => raw,
        }
    }
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedToken { raw } => {
                write!(f, "Path contains unresolved token(s): {raw}")
            }
            Self::MissingGameFolder { raw } => {
                write!(f, "Relative path requires {{GameFolder}} but it is empty: {raw}")
            }
        }
    }
}

impl std::error::Error for ResolveWarning {}

/// Expands tokenized or relative paths against the current machine roots.
#[derive(Debug, Clone, Copy)]
pub struct TokenResolver<'a> {
    roots: &'a PathRoots,
}

impl<'a> TokenResolver<'a> {
    /// Creates a resolver over the current machine roots.
    #[must_use]
    pub const fn new(roots: &'a PathRoots) -> Self {
        Self { roots }
    }

    /// Resolves `raw` to an absolute canonical path.
    ///
    /// Tokens whose value is empty are left in place. `{MainExeDir}` is the
    /// parent of the resolved main target of `contract` (or of the install's
    /// exe), computed only when the token is present.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveWarning`] naming `raw` when a token is left
    /// unresolved, or when a relative path has no `{GameFolder}` to join onto.
    pub fn resolve(
        &self,
        raw: &str,
        install: &InstallInfo,
        contract: Option<&LaunchContract>,
    ) -> Result<String, ResolveWarning> {
        if raw.trim().is_empty() {
            return Ok(String::new());
        }

        let game_folder = normalize_path(install.game_folder());
        let games_root = || self.roots.games_root.clone();
        let cache_root = || self.roots.cache_root.clone();
        let launchbox_root = || self.roots.launchbox_root.clone();
        let relay_dir = || self.roots.relay_dir.clone();
        let folder = || game_folder.clone();
        let main_exe_dir = || self.main_exe_dir(install, contract);

        let substitutions: [(PathToken, &dyn Fn() -> String); 6] = [
            (PathToken::GamesRoot, &games_root),
            (PathToken::CacheRoot, &cache_root),
            (PathToken::LaunchBoxRoot, &launchbox_root),
            (PathToken::RelayDir, &relay_dir),
            (PathToken::GameFolder, &folder),
            (PathToken::MainExeDir, &main_exe_dir),
        ];

        let mut text = normalize_separators(raw.trim());
        for (token, value) in substitutions {
            if !contains_token(&text, token) {
                continue;
            }
            let value = value();
            if value.trim().is_empty() {
                continue;
            }
            text = replace_ignore_ascii_case(&text, token.placeholder(), &value);
        }

        if is_rooted(&text) {
            return Ok(normalize_path(&text));
        }

        if text.contains('{') {
            return Err(ResolveWarning::UnresolvedToken {
                raw: raw.to_string(),
            });
        }

        if game_folder.is_empty() {
            return Err(ResolveWarning::MissingGameFolder {
                raw: raw.to_string(),
            });
        }

        Ok(normalize_path(&format!("{game_folder}\\{text}")))
    }

    /// Resolves `raw`, returning an empty string on failure.
    #[must_use]
    pub fn resolve_or_empty(
        &self,
        raw: &str,
        install: &InstallInfo,
        contract: Option<&LaunchContract>,
    ) -> String {
        self.resolve(raw, install, contract).unwrap_or_default()
    }

    /// Directory of the resolved main target, with `{MainExeDir}` stripped
    /// from the target first.
    fn main_exe_dir(&self, install: &InstallInfo, contract: Option<&LaunchContract>) -> String {
        let raw_target = contract
            .map(LaunchContract::target_path)
            .filter(|target| !target.trim().is_empty())
            .unwrap_or(&install.exe_path);

        if raw_target.trim().is_empty() {
            return normalize_path(install.game_folder());
        }

        // Stripping can splice a new placeholder out of a nested one.
        let mut stripped = normalize_separators(raw_target);
        while contains_token(&stripped, PathToken::MainExeDir) {
            stripped = replace_ignore_ascii_case(&stripped, PathToken::MainExeDir.placeholder(), "");
        }

        let target = LaunchContract::new(&stripped, "", "");
        self.resolve(&stripped, install, Some(&target))
            .ok()
            .and_then(|resolved| parent(&resolved))
            .unwrap_or_default()
    }
}
