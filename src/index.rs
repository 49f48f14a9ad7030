//! File index resolution.
//!
//! Ordinals shown by `/list` are 1-based positions into a lexically sorted
//! listing. Every indexed command resolves its arguments against a listing
//! fetched for that command invocation; a listing is never reused across
//! commands, because the directory may have changed in between.

/// Partition of raw index tokens against one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Tokens that resolved: (1-based ordinal, file name).
    pub resolved: Vec<(usize, String)>,
    /// Tokens that were non-numeric, zero, or out of range.
    pub invalid: Vec<String>,
}

impl Resolution {
    /// Whether anything resolved.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Resolve raw index tokens against a freshly fetched listing.
///
/// Tokens are 1-based as presented to the user; conversion to 0-based
/// happens here, before the bounds check.
pub fn resolve_indices(listing: &[String], tokens: &[String]) -> Resolution {
    let mut resolution = Resolution::default();

    for token in tokens {
        match token.parse::<usize>() {
            Ok(ordinal) if ordinal >= 1 && ordinal <= listing.len() => {
                resolution
                    .resolved
                    .push((ordinal, listing[ordinal - 1].clone()));
            }
            _ => resolution.invalid.push(token.clone()),
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_file_resolves_one() {
        let files = listing(&["only.txt"]);

        let resolution = resolve_indices(&files, &tokens(&["1"]));
        assert_eq!(resolution.resolved, vec![(1, "only.txt".to_string())]);
        assert!(resolution.invalid.is_empty());
    }

    #[test]
    fn test_zero_is_invalid() {
        let files = listing(&["only.txt"]);

        let resolution = resolve_indices(&files, &tokens(&["0"]));
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.invalid, tokens(&["0"]));
    }

    #[test]
    fn test_past_end_is_invalid() {
        let files = listing(&["only.txt"]);

        let resolution = resolve_indices(&files, &tokens(&["2"]));
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.invalid, tokens(&["2"]));
    }

    #[test]
    fn test_non_numeric_is_invalid() {
        let files = listing(&["a.txt", "b.txt"]);

        let resolution = resolve_indices(&files, &tokens(&["x", "-1", "1.5"]));
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.invalid, tokens(&["x", "-1", "1.5"]));
    }

    #[test]
    fn test_mixed_partition() {
        let files = listing(&["a.txt", "b.txt"]);

        let resolution = resolve_indices(&files, &tokens(&["1", "5"]));
        assert_eq!(resolution.resolved, vec![(1, "a.txt".to_string())]);
        assert_eq!(resolution.invalid, tokens(&["5"]));
    }

    #[test]
    fn test_ordinals_are_one_based() {
        let files = listing(&["a.txt", "b.txt", "c.txt"]);

        let resolution = resolve_indices(&files, &tokens(&["2"]));
        assert_eq!(resolution.resolved, vec![(2, "b.txt".to_string())]);
    }

    #[test]
    fn test_empty_listing_rejects_everything() {
        let resolution = resolve_indices(&[], &tokens(&["1"]));
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.invalid, tokens(&["1"]));
    }

    #[test]
    fn test_duplicate_tokens_resolve_independently() {
        let files = listing(&["a.txt"]);

        let resolution = resolve_indices(&files, &tokens(&["1", "1"]));
        assert_eq!(resolution.resolved.len(), 2);
    }
}
