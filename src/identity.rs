//! Launch identity: a stable key for a (target, arguments, working directory)
//! triple.
//!
//! Keys are computed over tokenized paths, so an entry keeps its key when the
//! whole library moves to another drive. Arguments are hashed as stored;
//! a path embedded in the arguments therefore changes the key on relocation.

use crate::paths::canonical::{build_identity_string, compute_sha256_hex, normalize_arguments};
use crate::paths::{PathRoots, PathTokenizer};
use crate::storage::GameEntry;

/// SHA-256 hex of the canonical identity string of a contract.
#[must_use]
pub fn build_launch_key(target: &str, arguments: &str, working_directory: &str) -> String {
    compute_sha256_hex(&build_identity_string(target, arguments, working_directory))
}

/// Trimmed, case-insensitive key equality. Empty keys never match.
#[must_use]
pub fn is_match(left: &str, right: &str) -> bool {
    let left = left.trim();
    let right = right.trim();
    !left.is_empty() && !right.is_empty() && left.eq_ignore_ascii_case(right)
}

/// True when an entry without a launch key should be matched by raw
/// executable path instead.
#[must_use]
pub fn prefer_exe_path_fallback(arguments: &str) -> bool {
    normalize_arguments(arguments).is_empty()
}

/// Launch key of a registered game.
///
/// Target and working directory come from the main contract, falling back to
/// the install info per field, and are tokenized against `roots` first.
#[must_use]
pub fn build_launch_key_for_game(game: &GameEntry, roots: &PathRoots) -> String {
    let contract = &game.launch.main;
    let raw_target = if contract.target_path().trim().is_empty() {
        game.install.exe_path.as_str()
    } else {
        contract.target_path()
    };
    let raw_workdir = if contract.working_directory().trim().is_empty() {
        game.install.working_dir.as_str()
    } else {
        contract.working_directory()
    };
    let arguments = if contract.is_valid() {
        contract.arguments()
    } else {
        game.install.args.as_str()
    };

    let tokenizer = PathTokenizer::new(roots);
    let target = tokenizer.tokenize(raw_target, &game.install);
    let workdir = tokenizer.tokenize(raw_workdir, &game.install);
    build_launch_key(&target, arguments, &workdir)
}
