//! Launch contract resolution: turns a registered game (or one of its tools)
//! into an absolute target, argument string and working directory.
//!
//! Nothing is spawned here. The registry entry is updated with a missing
//! launch key and the outcome of the check; the caller persists it.

use crate::config::Config;
use crate::config::parser::validate_config;
use crate::paths::canonical::{is_within, normalize_path, parent, to_fs_path};
use crate::paths::tokens::token_summary;
use crate::paths::{PathRoots, ResolveWarning, TokenResolver};
use crate::scanner::version::{PeVersionProbe, VersionProbe};
use crate::storage::{GameEntry, LastResult, LaunchContract, Registry};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Process exit codes shared with the desktop shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Resolved.
    Success = 0,
    /// No game with the requested key.
    GameNotFound = 10,
    /// Target or tool executable does not exist.
    ExeMissing = 11,
    /// Copying to the cache failed.
    CopyFailed = 12,
    /// Starting the process failed.
    LaunchFailed = 13,
    /// Configuration or launch contract is unusable.
    ConfigInvalid = 20,
}

impl ExitCode {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Why a launch could not be resolved.
#[derive(Debug)]
pub enum LaunchError {
    /// Configuration failed validation.
    ConfigInvalid(String),
    /// No registered game has the key.
    GameNotFound(Uuid),
    /// The requested tool does not exist on disk.
    ToolMissing(String),
    /// The requested tool lies outside the game folder.
    ToolOutsideGameFolder {
        /// Normalized tool path.
        tool: String,
        /// Normalized game folder, possibly empty.
        game_folder: String,
    },
    /// The target contains tokens that cannot be resolved.
    UnresolvedTarget(ResolveWarning),
    /// The target resolved but does not exist.
    TargetMissing {
        /// Resolved target path, possibly empty.
        target: String,
    },
}

impl LaunchError {
    /// Exit code reported for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::GameNotFound(_) => ExitCode::GameNotFound,
            Self::ToolMissing(_) | Self::TargetMissing { .. } => ExitCode::ExeMissing,
            Self::ConfigInvalid(_) | Self::ToolOutsideGameFolder { .. } | Self::UnresolvedTarget(_) => {
                ExitCode::ConfigInvalid
            }
        }
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigInvalid(message) => write!(f, "Config invalid: {message}"),
            Self::GameNotFound(key) => write!(f, "No game found for key {key}"),
            Self::ToolMissing(path) => write!(f, "Tool executable missing: {path}"),
            Self::ToolOutsideGameFolder { tool, game_folder } => write!(
                f,
                "Tool path is outside game folder. Tool={tool}, GameFolder={game_folder}"
            ),
            Self::UnresolvedTarget(warning) => write!(f, "Invalid launch target: {warning}"),
            Self::TargetMissing { target } => write!(f, "Resolved target does not exist: {target}"),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnresolvedTarget(warning) => Some(warning),
            _ => None,
        }
    }
}

/// A launch ready to be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLaunch {
    /// Key of the game.
    pub game_key: Uuid,
    /// Name of the game.
    pub display_name: String,
    /// Contract as stored, before resolution.
    pub raw: LaunchContract,
    /// Absolute target; exists on disk.
    pub target: String,
    /// Arguments, verbatim.
    pub arguments: String,
    /// Absolute working directory.
    pub working_directory: String,
    /// Whether the working directory exists.
    pub working_directory_exists: bool,
    /// Tokens found in the raw target and working directory, or `none`.
    pub token_summary: String,
    /// Product name and file version of the target, when available.
    pub product_summary: String,
    /// A tool was requested instead of the main executable.
    pub is_tool: bool,
}

impl ResolvedLaunch {
    /// Target and arguments as one command line, quoting the target when it
    /// contains spaces.
    #[must_use]
    pub fn command_line(&self) -> String {
        let target = if self.target.contains(' ') {
            format!("\"{}\"", self.target)
        } else {
            self.target.clone()
        };
        if self.arguments.trim().is_empty() {
            target
        } else {
            format!("{target} {}", self.arguments.trim())
        }
    }
}

/// Resolves launch contracts of registered games.
pub struct LaunchResolver<'a> {
    config: &'a Config,
    roots: PathRoots,
    probe: Arc<dyn VersionProbe>,
}

impl<'a> LaunchResolver<'a> {
    /// A resolver for `config`, with relative roots taken from `relay_dir`.
    #[must_use]
    pub fn new(config: &'a Config, relay_dir: &str) -> Self {
        Self {
            config,
            roots: PathRoots::from_config(config, relay_dir),
            probe: Arc::new(PeVersionProbe),
        }
    }

    /// Replaces the version probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn VersionProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Resolves the main executable of `game_key`, or `tool` when given.
    ///
    /// A missing launch key is computed and stored. When the target is
    /// checked, the entry's stats record the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`]; its [`exit_code`](LaunchError::exit_code)
    /// is the code to report.
    pub fn resolve(
        &self,
        registry: &mut Registry,
        game_key: Uuid,
        tool: Option<&str>,
    ) -> Result<ResolvedLaunch, LaunchError> {
        if let Err(e) = validate_config(self.config) {
            error!(error = %e, "config invalid during launch");
            return Err(LaunchError::ConfigInvalid(e.to_string()));
        }

        let Some(game) = registry.find_mut(game_key) else {
            warn!(key = %game_key, "game key not found");
            return Err(LaunchError::GameNotFound(game_key));
        };

        if game.ensure_launch_key(&self.roots) {
            info!(game = %game.display_name, key = %game.launch_key, "computed missing launch key");
        }

        let tool = tool.filter(|t| !t.trim().is_empty());
        let contract = match tool {
            Some(tool) => tool_contract(game, tool)?,
            None => main_contract(game),
        };

        let resolver = TokenResolver::new(&self.roots);
        let target = match resolver.resolve(contract.target_path(), &game.install, Some(&contract)) {
            Ok(target) => target,
            Err(warning) => {
                warn!(game = %game.display_name, raw = %contract.target_path(), %warning, "invalid launch target");
                return Err(LaunchError::UnresolvedTarget(warning));
            }
        };

        if target.is_empty() || !to_fs_path(&target).is_file() {
            game.stats.last_result = LastResult::MissingExe;
            game.stats.last_validated_utc = Some(Utc::now());
            error!(game = %game.display_name, target = %target, "launch target missing");
            return Err(LaunchError::TargetMissing { target });
        }

        let working_directory = match resolver.resolve(contract.working_directory(), &game.install, Some(&contract)) {
            Ok(dir) if !dir.is_empty() => dir,
            Ok(_) => parent(&target).unwrap_or_default(),
            Err(warning) => {
                warn!(game = %game.display_name, %warning, "invalid working directory, using target folder");
                parent(&target).unwrap_or_default()
            }
        };

        info!(
            target = %contract.target_path(),
            args = %contract.arguments(),
            workdir = %contract.working_directory(),
            "launch contract raw"
        );
        info!(
            target = %target,
            args = %contract.arguments(),
            workdir = %working_directory,
            "launch contract resolved"
        );

        let now = Utc::now();
        game.stats.last_result = LastResult::Ok;
        game.stats.last_played_utc = Some(now);
        game.stats.last_validated_utc = Some(now);

        Ok(ResolvedLaunch {
            game_key,
            display_name: game.display_name.clone(),
            token_summary: token_summary(contract.target_path(), contract.working_directory()),
            product_summary: self.product_summary(&target),
            working_directory_exists: !working_directory.is_empty() && to_fs_path(&working_directory).is_dir(),
            arguments: contract.arguments().to_string(),
            target,
            working_directory,
            is_tool: tool.is_some(),
            raw: contract,
        })
    }

    fn product_summary(&self, target: &str) -> String {
        if !target.to_lowercase().ends_with(".exe") {
            return String::new();
        }
        let info = self.probe.probe(&to_fs_path(target));
        [info.product_name.as_str(), info.file_version.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Stored contract of a tool inside the game folder, or an ad hoc one.
fn tool_contract(game: &GameEntry, raw_tool: &str) -> Result<LaunchContract, LaunchError> {
    let tool = normalize_path(raw_tool);
    let game_folder = normalize_path(game.install.game_folder());

    if tool.is_empty() || !to_fs_path(&tool).is_file() {
        error!(tool = %raw_tool, "tool executable missing");
        return Err(LaunchError::ToolMissing(raw_tool.to_string()));
    }
    if game_folder.is_empty() || !is_within(&tool, &game_folder) {
        error!(tool = %tool, game_folder = %game_folder, "tool path is outside game folder");
        return Err(LaunchError::ToolOutsideGameFolder { tool, game_folder });
    }

    if let Some(stored) = game.launch.tool(&tool).filter(|c| c.is_valid()) {
        return Ok(stored.clone());
    }
    let workdir = parent(&tool).unwrap_or(game_folder);
    Ok(LaunchContract::new(tool, "", workdir))
}

/// Main contract of a game, synthesized from the install info when unset.
fn main_contract(game: &GameEntry) -> LaunchContract {
    if game.launch.main.is_valid() {
        return game.launch.main.clone();
    }

    let install = &game.install;
    let workdir = if install.working_dir.trim().is_empty() {
        parent(&install.exe_path).unwrap_or_else(|| install.base_folder.clone())
    } else {
        install.working_dir.clone()
    };
    LaunchContract::new(install.exe_path.clone(), install.args.clone(), workdir)
}
