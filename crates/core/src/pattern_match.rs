//! Wildcard pattern matching for `like` filters.
//!
//! Provides the single canonical definition of the `like` pattern language.
//! The in-memory evaluator calls [`like`] directly; the document translator
//! compiles [`wildcard_segments`] into an anchored regular expression, so
//! both backends agree on what a pattern means.
//!
//! # Pattern language
//!
//! - `*` matches zero or more arbitrary characters (newlines included)
//! - every other character matches itself
//!
//! The pattern is matched against the **entire** value. Matching is
//! case-sensitive and operates on Unicode scalar values. There is no escape
//! syntax: a literal `*` cannot be expressed.

/// The only wildcard the pattern language recognizes.
pub const WILDCARD: char = '*';

/// Whole-value wildcard matching.
///
/// ```
/// use flowdex_core::pattern_match::like;
/// assert!(like("4f1c_job1", "*_job1"));
/// assert!(like("travels_sub", "travels*"));
/// assert!(!like("travels", "*_sub"));
/// ```
pub fn like(value: &str, pattern: &str) -> bool {
    let v: Vec<char> = value.chars().collect();
    let p: Vec<char> = pattern.chars().collect();

    // Greedy scan with single-point backtracking to the last star.
    let (mut vi, mut pi) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while vi < v.len() {
        if pi < p.len() && p[pi] == WILDCARD {
            star = Some((pi, vi));
            pi += 1;
        } else if pi < p.len() && p[pi] == v[vi] {
            vi += 1;
            pi += 1;
        } else if let Some((star_pi, star_vi)) = star {
            // Let the last star absorb one more character and retry.
            pi = star_pi + 1;
            vi = star_vi + 1;
            star = Some((star_pi, star_vi + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|c| *c == WILDCARD)
}

/// Splits a pattern into the literal runs between wildcards.
///
/// A pattern with `n` wildcards always yields `n + 1` segments (possibly
/// empty), so joining the segments with "any characters" reproduces the
/// pattern exactly.
///
/// ```
/// use flowdex_core::pattern_match::wildcard_segments;
/// assert_eq!(wildcard_segments("*_job1"), vec!["", "_job1"]);
/// assert_eq!(wildcard_segments("a*b*"), vec!["a", "b", ""]);
/// ```
pub fn wildcard_segments(pattern: &str) -> Vec<&str> {
    pattern.split(WILDCARD).collect()
}
