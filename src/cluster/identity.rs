//! Server identity generation for restored clusters
//!
//! A restored cluster must write its WAL stream under an identity that is
//! lexically distinct from the source cluster's, or the two would corrupt
//! each other's backup streams in the shared object store. The new
//! identity is the cluster's own name plus a sortable UTC timestamp.

use chrono::{DateTime, Utc};

/// Mint a new server identity for `base_name` at the current instant.
///
/// Two restores of the same base name within the same wall-clock second
/// produce the same identity; the second-granularity window is an
/// accepted trade-off of the published identity format.
pub fn generate(base_name: &str) -> String {
    generate_at(base_name, Utc::now())
}

/// Pure core of [`generate`]: `{base_name}-{YYYYMMDD-HHMMSS}`.
pub fn generate_at(base_name: &str, at: DateTime<Utc>) -> String {
    format!("{base_name}-{}", at.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_at_format() {
        let at = Utc.with_ymd_and_hms(2025, 10, 13, 13, 54, 0).unwrap();
        assert_eq!(generate_at("chef-360", at), "chef-360-20251013-135400");
    }

    #[test]
    fn test_generate_at_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(generate_at("pg", at), generate_at("pg", at));
    }

    #[test]
    fn test_identities_differ_across_seconds() {
        let first = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 7).unwrap();
        assert_ne!(generate_at("pg", first), generate_at("pg", second));
    }

    #[test]
    fn test_generated_identity_shape() {
        let identity = generate("chef-360");
        let suffix = identity.strip_prefix("chef-360-").unwrap();
        let (date, time) = suffix.split_once('-').unwrap();
        assert_eq!(date.len(), 8);
        assert_eq!(time.len(), 6);
        assert!(date.chars().all(|c| c.is_ascii_digit()));
        assert!(time.chars().all(|c| c.is_ascii_digit()));
    }
}
