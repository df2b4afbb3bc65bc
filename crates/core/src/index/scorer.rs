//! Approximate substring scoring.
//!
//! The score of a pattern against a text is
//! `errors / pattern_len + start / distance`, where `errors` is the smallest
//! edit distance between the pattern and any substring of the text and
//! `start` is the character offset where that substring begins. Scores are
//! clamped to `1.0`; `0.0` is a perfect match at the start of the text.

/// Lowercase a string into characters for scoring.
pub fn prepare(text: &str) -> Vec<char> {
    text.to_lowercase().chars().collect()
}

/// Score `query` against `text`. Both are compared case-insensitively.
pub fn fuzzy_score(query: &str, text: &str, distance: u32) -> f64 {
    score_prepared(&prepare(query), &prepare(text), distance)
}

/// Score an already prepared pattern against an already prepared text.
///
/// An empty pattern never matches and scores `1.0`.
pub fn score_prepared(pattern: &[char], text: &[char], distance: u32) -> f64 {
    let m = pattern.len();
    if m == 0 {
        return 1.0;
    }
    if pattern == text {
        return 0.0;
    }

    // Each cell holds (edit cost, start offset of the aligned substring).
    // Row 0 is free everywhere so a match may begin at any offset.
    let mut prev: Vec<(usize, usize)> = (0..=text.len()).map(|j| (0, j)).collect();
    let mut curr: Vec<(usize, usize)> = vec![(0, 0); text.len() + 1];

    for (i, p) in pattern.iter().enumerate() {
        curr[0] = (i + 1, 0);

        for (j, t) in text.iter().enumerate() {
            let cost = if p == t { 0 } else { 1 };

            let substitution = (prev[j].0 + cost, prev[j].1);
            let deletion = (prev[j + 1].0 + 1, prev[j + 1].1);
            let insertion = (curr[j].0 + 1, curr[j].1);

            curr[j + 1] = substitution.min(deletion).min(insertion);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev.iter()
        .map(|&(errors, start)| combine(errors, start, m, distance))
        .fold(1.0, f64::min)
}

fn combine(errors: usize, start: usize, pattern_len: usize, distance: u32) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;

    if distance == 0 {
        return if start == 0 { accuracy.min(1.0) } else { 1.0 };
    }

    (accuracy + start as f64 / distance as f64).min(1.0)
}
