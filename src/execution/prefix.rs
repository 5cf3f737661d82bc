//! Chunk-prefixing filter for forwarded output.

/// Rewrite one output chunk by prepending `"<prefix> "`.
///
/// Pass-through with no buffering across chunks: each chunk is transformed
/// independently, so a chunk boundary that splits a line produces two
/// separately-prefixed fragments. Line-atomicity is not a guarantee here;
/// the prefix exists to disambiguate interleaved output from concurrently
/// running commands.
pub(crate) fn prefix_chunk(prefix: &str, chunk: &str) -> String {
    format!("{} {}", prefix, chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_prepended_with_space() {
        assert_eq!(prefix_chunk("web", "listening on :3000\n"), "web listening on :3000\n");
    }

    #[test]
    fn test_prefix_applied_once_per_chunk() {
        let out = prefix_chunk("db", "line1\nline2\n");
        assert!(out.starts_with("db "));
        assert_eq!(out.matches("db ").count(), 1);
    }

    #[test]
    fn test_split_line_gets_two_prefixes() {
        // A line split across two chunks is prefixed twice; accepted limitation.
        let a = prefix_chunk("w", "hel");
        let b = prefix_chunk("w", "lo\n");
        assert!(a.starts_with("w "));
        assert!(b.starts_with("w "));
    }

    #[test]
    fn test_empty_chunk() {
        assert_eq!(prefix_chunk("x", ""), "x ");
    }
}
