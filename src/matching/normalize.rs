use std::fmt;

/// Canonical matching key derived from a raw trait, folder, or file name.
///
/// Keys only ever contain `[a-z0-9]`, so normalizing a key again yields the same key.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return `true` when nothing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return `true` when `needle` occurs inside this key.
    ///
    /// Matching is directional: callers test the trait key against the candidate key, never the
    /// reverse.
    pub fn contains(&self, needle: &NormalizedKey) -> bool {
        self.0.contains(needle.as_str())
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reduce a raw name to its [`NormalizedKey`].
///
/// Steps:
/// 1. drop a trailing rarity/index suffix: a run of `#`, `_` or `-` followed by digits at the end
///    (`Background#12`, `eyes_07`, `hat-3`);
/// 2. lowercase;
/// 3. delete every character outside `[a-z0-9]`.
pub fn normalize(raw: &str) -> NormalizedKey {
    let stem = strip_rarity_suffix(raw.trim());
    let key = stem
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    NormalizedKey(key)
}

fn strip_rarity_suffix(s: &str) -> &str {
    let without_digits = s.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == s.len() {
        return s;
    }
    let without_sep = without_digits.trim_end_matches(['#', '_', '-']);
    if without_sep.len() == without_digits.len() {
        return s;
    }
    without_sep
}

#[cfg(test)]
#[path = "../../tests/unit/matching/normalize.rs"]
mod tests;
