use super::rules::penalized_token_count;
use crate::paths::canonical::contains_ignore_case;

/// Starting score of every candidate.
pub const BASE_SCORE: f64 = 1000.0;
/// Subtracted per penalized token in the file name.
pub const TOKEN_PENALTY: f64 = 350.0;
/// Subtracted per directory level below the game folder.
pub const DEPTH_PENALTY: f64 = 45.0;
/// Cap of the size bonus (one point per megabyte).
pub const MAX_SIZE_BONUS: f64 = 500.0;
/// Product name mentions the folder name.
pub const PRODUCT_NAME_BONUS: f64 = 250.0;
/// File description mentions the folder name.
pub const DESCRIPTION_BONUS: f64 = 200.0;
/// File name mentions the folder name.
pub const FILE_NAME_BONUS: f64 = 120.0;

/// Everything the main-candidate score looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInput<'a> {
    /// File name without extension.
    pub file_stem: &'a str,
    /// Directory levels between the game folder and the executable.
    pub depth: usize,
    /// File size.
    pub size_bytes: u64,
    /// Version resource `ProductName`.
    pub product_name: &'a str,
    /// Version resource `FileDescription`.
    pub file_description: &'a str,
    /// Name of the top-level game folder.
    pub folder_name: &'a str,
}

/// Likelihood that an executable is the game's primary entry point. Higher
/// wins.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_main_candidate(input: &ScoreInput<'_>) -> f64 {
    let mut score = BASE_SCORE;

    score -= TOKEN_PENALTY * penalized_token_count(input.file_stem) as f64;
    score -= DEPTH_PENALTY * input.depth as f64;
    score += (input.size_bytes as f64 / 1_000_000.0).min(MAX_SIZE_BONUS);

    if contains_ignore_case(input.product_name, input.folder_name) {
        score += PRODUCT_NAME_BONUS;
    }
    if contains_ignore_case(input.file_description, input.folder_name) {
        score += DESCRIPTION_BONUS;
    }
    if contains_ignore_case(input.file_stem, input.folder_name) {
        score += FILE_NAME_BONUS;
    }

    score
}
