//! Word-level diff between two titles
//!
//! Both titles are lowercased and split into words and the whitespace runs
//! between them. The diff keeps the fewest edited tokens; whitespace that is
//! inserted or removed along with a word counts toward the length.

use similar::{ChangeTag, TextDiff};

/// Total characters of the tokens inserted or removed to turn `from` into `to`
///
/// Identical titles (ignoring case) score 0.
pub fn word_diff_length(from: &str, to: &str) -> usize {
    let from = from.to_lowercase();
    let to = to.to_lowercase();

    TextDiff::from_words(&from, &to)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .map(|change| change.value().chars().count())
        .sum()
}
