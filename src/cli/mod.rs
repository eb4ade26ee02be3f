//! CLI entry points for the two benchmark tools
//!
//! `commands` holds the command bodies; this module carries the shared
//! argument helpers.

pub mod commands;

/// Split a semicolon-delimited bucket list, dropping empty segments.
///
/// `"a;;b;"` yields `["a", "b"]`.
pub fn split_buckets(raw: &str) -> Vec<String> {
    raw.split(';')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Validate the lister's positional arguments: exactly one non-empty value
/// is accepted; anything else (missing, empty, surplus) is a usage error.
pub fn single_nonempty_arg(args: &[String]) -> Option<&str> {
    match args {
        [raw] if !raw.is_empty() => Some(raw),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_buckets() {
        assert_eq!(split_buckets("a;b"), vec!["a", "b"]);
        assert_eq!(split_buckets("a"), vec!["a"]);
    }

    #[test]
    fn test_split_buckets_filters_empty_segments() {
        assert_eq!(split_buckets("a;;b;"), vec!["a", "b"]);
        assert_eq!(split_buckets(";a;"), vec!["a"]);
    }

    #[test]
    fn test_split_buckets_all_empty() {
        assert!(split_buckets("").is_empty());
        assert!(split_buckets(";;;").is_empty());
    }

    #[test]
    fn test_single_nonempty_arg() {
        let args = vec!["a;b".to_string()];
        assert_eq!(single_nonempty_arg(&args), Some("a;b"));
    }

    #[test]
    fn test_single_nonempty_arg_rejects_bad_counts() {
        assert_eq!(single_nonempty_arg(&[]), None);
        assert_eq!(single_nonempty_arg(&["".to_string()]), None);
        assert_eq!(
            single_nonempty_arg(&["a".to_string(), "b".to_string()]),
            None
        );
    }
}
