//! Version comparison and range matching
//!
//! Versions compare numerically, component by component, with missing
//! components treated as 0 (`1.2` == `1.2.0`, `1.10.0` > `1.9.0`). A
//! component that is not a number contributes its leading digits, or 0.
//!
//! Supported ranges:
//!
//! | Range | Matches |
//! |---|---|
//! | `1.2.3` | exactly `1.2.3` |
//! | `^1.2.0` | same major |
//! | `~1.2.0` | same major and minor |
//! | `1.2.0-2.0.0` | inclusive numeric bounds |
//! | `*` | anything |

use std::cmp::Ordering;

/// Numeric value of one dot-separated component
fn component(part: &str) -> u64 {
    let digits: String = part.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn components(version: &str) -> Vec<u64> {
    version.trim().split('.').map(component).collect()
}

/// Numeric ordering of two versions
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (components(a), components(b));
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Whether `candidate` is strictly newer than `current`
pub fn is_newer(current: &str, candidate: &str) -> bool {
    compare_versions(candidate, current) == Ordering::Greater
}

/// Whether `version` satisfies `range`
pub fn matches_range(range: &str, version: &str) -> bool {
    let (range, version) = (range.trim(), version.trim());
    if range == version || range == "*" {
        return true;
    }
    if let Some(base) = range.strip_prefix('^') {
        return components(base).first() == components(version).first();
    }
    if let Some(base) = range.strip_prefix('~') {
        let (base, version) = (components(base), components(version));
        let major_minor = |v: &[u64]| (v.first().copied(), v.get(1).copied().unwrap_or(0));
        return major_minor(&base) == major_minor(&version);
    }
    if let Some((min, max)) = range.split_once('-') {
        return compare_versions(version, min) != Ordering::Less
            && compare_versions(version, max) != Ordering::Greater;
    }
    false
}

/// The newest of `versions`; the first one wins ties
pub fn latest_version<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions.into_iter().fold(None, |best, v| match best {
        Some(b) if !is_newer(b, v) => Some(b),
        _ => Some(v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_newer() {
        assert!(is_newer("1.2.0", "1.3.0"));
        assert!(!is_newer("1.3.0", "1.2.0"));
        assert!(!is_newer("1.2.0", "1.2.0"));
        assert!(is_newer("1.9.0", "1.10.0"));
        assert!(is_newer("1.2", "1.2.1"));
        assert!(!is_newer("1.2.0", "1.2"));
        assert!(is_newer("2.0.0-beta", "2.0.1"));
    }

    #[test]
    fn test_caret_matches_major() {
        assert!(matches_range("^1.2.0", "1.9.9"));
        assert!(matches_range("^1.2.0", "1.0.0"));
        assert!(!matches_range("^1.2.0", "2.0.0"));
        // numeric, not prefix: 10.x is not major 1
        assert!(!matches_range("^1.2.0", "10.0.0"));
    }

    #[test]
    fn test_tilde_matches_major_minor() {
        assert!(!matches_range("~1.2.0", "1.3.0"));
        assert!(matches_range("~1.2.0", "1.2.9"));
        assert!(!matches_range("~1.2.0", "1.20.0"));
    }

    #[test]
    fn test_hyphen_range_is_numeric() {
        assert!(matches_range("1.2.3-2.0.0", "1.10.0"));
        assert!(matches_range("1.2.3-2.0.0", "1.2.3"));
        assert!(matches_range("1.2.3-2.0.0", "2.0.0"));
        assert!(!matches_range("1.2.3-2.0.0", "2.0.1"));
        assert!(!matches_range("1.2.3-2.0.0", "1.2.2"));
    }

    #[test]
    fn test_exact_and_unknown_ranges() {
        assert!(matches_range("1.0.0", "1.0.0"));
        assert!(!matches_range("1.0.0", "1.0.1"));
        assert!(matches_range("*", "3.1.4"));
        assert!(!matches_range(">=1.0.0", "2.0.0"));
    }

    #[test]
    fn test_latest_version() {
        assert_eq!(
            latest_version(["1.2.0", "1.10.0", "1.9.3"]),
            Some("1.10.0")
        );
        assert_eq!(latest_version(["1.0", "1.0.0"]), Some("1.0"));
        assert_eq!(latest_version(Vec::<&str>::new()), None);
    }
}
