//! Name similarity scoring
//!
//! Pure functions comparing a name against another name or an alias set.
//! Scores are in [0.0, 1.0].
//!
//! # Algorithm
//! - Normalize: lowercase, trim surrounding whitespace
//! - Short names (initials, nicknames) only match exactly: fuzzy ratios
//!   between a 3-letter nickname and a long unrelated name are spuriously high
//! - Empty names never match anything
//! - Otherwise the Ratcliff/Obershelp ratio `2 * M / T` from `difflib`, where
//!   `M` is the number of characters in recursively found longest common
//!   blocks and `T` the combined length

use difflib::sequencematcher::SequenceMatcher;

/// Names of at most this many characters only match exactly
pub const DEFAULT_SHORT_NAME_MAX_LEN: usize = 4;

/// Alias similarity that counts as an alias match
pub const ALIAS_MATCH_THRESHOLD: f64 = 0.9;

/// Similarity between two names using the default short-name rule
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_with(a, b, DEFAULT_SHORT_NAME_MAX_LEN)
}

/// Similarity between two names with an explicit short-name length
///
/// # Arguments
/// * `a`, `b` - Names to compare (any case, surrounding whitespace ignored)
/// * `short_name_max_len` - Names with at most this many characters score
///   1.0 on exact equality and 0.0 otherwise
///
/// Blank names (empty after trimming) score 0.0 against everything,
/// including another blank name.
///
/// # Returns
/// Similarity score (0.0-1.0), symmetric in its arguments
pub fn similarity_with(a: &str, b: &str, short_name_max_len: usize) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len <= short_name_max_len || b_len <= short_name_max_len {
        return if a == b { 1.0 } else { 0.0 };
    }

    // Block matching depends on argument order; compare in canonical order
    // so the score is symmetric.
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();

    ratio(first.as_slice(), second.as_slice())
}

/// Best similarity of `name` against a candidate's aliases
///
/// Standalone alias check with the default short-name rule. The matcher
/// calls [`best_alias`] instead, which also reports which alias won and
/// honours the configured short-name length.
///
/// # Returns
/// `(is_match, score)` where `is_match` is true when the best score exceeds
/// 0.9. A candidate without aliases yields `(false, 0.0)`.
pub fn alias_score<S: AsRef<str>>(name: &str, aliases: &[S]) -> (bool, f64) {
    match best_alias(name, aliases, DEFAULT_SHORT_NAME_MAX_LEN) {
        Some((_, score)) => (score > ALIAS_MATCH_THRESHOLD, score),
        None => (false, 0.0),
    }
}

/// Index and score of the best-scoring alias
///
/// Ties keep the earliest alias. Returns `None` for an empty alias list.
pub fn best_alias<S: AsRef<str>>(
    name: &str,
    aliases: &[S],
    short_name_max_len: usize,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, alias) in aliases.iter().enumerate() {
        let score = similarity_with(name, alias.as_ref(), short_name_max_len);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }
    best
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let mut matcher = SequenceMatcher::<char>::new(a, b);
    f64::from(matcher.ratio())
}
