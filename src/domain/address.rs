//! Address normalization applied before any cache or join lookup.

/// Normalize a raw address into a cache/join key.
///
/// Strips surrounding whitespace only. Internal whitespace is preserved and
/// the key stays case-sensitive, so the same string always maps to the same
/// cache entry regardless of how it was padded in the input file.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize(" 10 Rue A "), "10 Rue A");
        assert_eq!(normalize("10 Rue A"), "10 Rue A");
        assert_eq!(normalize("\t10 Rue A\n"), "10 Rue A");
    }

    #[test]
    fn preserves_internal_whitespace_and_case() {
        assert_eq!(normalize("10  Rue  A"), "10  Rue  A");
        assert_ne!(normalize("10 rue a"), normalize("10 Rue A"));
    }

    #[test]
    fn whitespace_variants_share_a_key() {
        let variants = [" 10 Rue A ", "10 Rue A", "  10 Rue A"];
        let keys: Vec<_> = variants.iter().map(|v| normalize(v)).collect();
        assert!(keys.iter().all(|k| k == "10 Rue A"));
    }
}
