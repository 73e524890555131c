use crate::paths::canonical::paths_equal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How to start one executable: target, arguments and working directory.
///
/// Paths may be absolute or tokenized. A contract is a value: edits replace
/// it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchContract {
    target_path: String,
    arguments: String,
    working_directory: String,
}

impl LaunchContract {
    /// Creates a contract.
    #[must_use]
    pub fn new(
        target_path: impl Into<String>,
        arguments: impl Into<String>,
        working_directory: impl Into<String>,
    ) -> Self {
        Self {
            target_path: target_path.into(),
            arguments: arguments.into(),
            working_directory: working_directory.into(),
        }
    }

    /// Target executable path.
    #[must_use]
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Command-line arguments.
    #[must_use]
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// Working directory.
    #[must_use]
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// A contract is launchable iff it names a target.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.target_path.trim().is_empty()
    }
}

/// Per-game launch preferences and contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Launch mode hint for the shell (`"Cache"` by default).
    pub preferred_mode: String,
    /// Whether the shell may show its launch overlay.
    pub allow_overlay: bool,
    /// Pinned in the library view.
    pub pinned: bool,
    /// Contract of the primary executable.
    pub main: LaunchContract,
    /// Tool contracts keyed by absolute tool path.
    pub tools: BTreeMap<String, LaunchContract>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            preferred_mode: "Cache".to_string(),
            allow_overlay: true,
            pinned: false,
            main: LaunchContract::default(),
            tools: BTreeMap::new(),
        }
    }
}

impl LaunchSettings {
    /// Looks up a tool contract, ignoring path case and separator style.
    #[must_use]
    pub fn tool(&self, path: &str) -> Option<&LaunchContract> {
        self.tools
            .iter()
            .find(|(key, _)| paths_equal(key, path))
            .map(|(_, contract)| contract)
    }

    /// Stores a tool contract, replacing any entry for the same path.
    pub fn set_tool(&mut self, path: &str, contract: LaunchContract) {
        let existing = self
            .tools
            .keys()
            .find(|key| paths_equal(key, path))
            .cloned();
        let key = existing.unwrap_or_else(|| path.to_string());
        self.tools.insert(key, contract);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_validity() {
        assert!(!LaunchContract::default().is_valid());
        assert!(!LaunchContract::new("  ", "-x", "C:\\").is_valid());
        assert!(LaunchContract::new("{GamesRoot}\\a.exe", "", "").is_valid());
    }

    #[test]
    fn test_tool_lookup_ignores_case() {
        let mut settings = LaunchSettings::default();
        settings.set_tool("C:\\G\\Tool.exe", LaunchContract::new("a", "", ""));
        settings.set_tool("c:/g/tool.exe", LaunchContract::new("b", "", ""));

        assert_eq!(settings.tools.len(), 1);
        assert_eq!(
            settings.tool("C:\\G\\TOOL.EXE").map(LaunchContract::target_path),
            Some("b")
        );
        assert!(settings.tool("C:\\G\\other.exe").is_none());
    }

    #[test]
    fn test_defaults() {
        let settings = LaunchSettings::default();
        assert_eq!(settings.preferred_mode, "Cache");
        assert!(settings.allow_overlay);
        assert!(!settings.pinned);
    }
}
