//! Link identifier and slug generation.
//!
//! Every link gets a UUIDv7 id: a 48-bit millisecond timestamp prefix followed by
//! random bits, so ids sort by creation time. The slug is the **last 8
//! characters** of the id's lowercase hyphenated form, i.e. the random tail.
//! That is the only slicing rule in the crate: [`derive_slug`] produces slugs and
//! [`is_valid_slug`] checks incoming ones against the same shape.

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

/// Number of characters in a slug.
pub const SLUG_LEN: usize = 8;

/// Shape of every slug [`derive_slug`] can produce.
static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{8}$").expect("slug regex is valid"));

/// Generates a new time-ordered unique identifier.
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

/// Derives the slug for an identifier.
///
/// # Examples
///
/// ```ignore
/// let id = Uuid::parse_str("01890a5d-ac96-774b-bcce-b302099a8057").unwrap();
/// assert_eq!(derive_slug(&id), "099a8057");
/// ```
pub fn derive_slug(id: &Uuid) -> String {
    let canonical = id.hyphenated().to_string();
    canonical[canonical.len() - SLUG_LEN..].to_string()
}

/// Returns true if `candidate` has the shape of a derived slug.
pub fn is_valid_slug(candidate: &str) -> bool {
    SLUG_REGEX.is_match(candidate)
}

/// Joins the configured prefix and a slug into the public short URL.
///
/// A trailing slash on the prefix is ignored so `https://s.io/` and `https://s.io`
/// produce the same URL.
pub fn compose_short_url(prefix: &str, slug: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_is_v7() {
        let id = new_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_new_ids_are_time_ordered() {
        let first = new_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_id();
        assert!(first < second);
    }

    #[test]
    fn test_derive_slug_takes_last_eight_characters() {
        let id = Uuid::parse_str("01890a5d-ac96-774b-bcce-b302099a8057").unwrap();
        assert_eq!(derive_slug(&id), "099a8057");
    }

    #[test]
    fn test_derive_slug_has_correct_length() {
        let slug = derive_slug(&new_id());
        assert_eq!(slug.len(), SLUG_LEN);
    }

    #[test]
    fn test_derived_slug_is_valid() {
        for _ in 0..100 {
            let slug = derive_slug(&new_id());
            assert!(is_valid_slug(&slug), "{slug} should be valid");
        }
    }

    #[test]
    fn test_derive_slug_is_deterministic() {
        let id = new_id();
        assert_eq!(derive_slug(&id), derive_slug(&id));
    }

    #[test]
    fn test_derive_slug_produces_unique_slugs() {
        let slugs: HashSet<String> = (0..1000).map(|_| derive_slug(&new_id())).collect();
        assert_eq!(slugs.len(), 1000);
    }

    #[test]
    fn test_is_valid_slug_rejects_other_shapes() {
        assert!(!is_valid_slug("unknownslug"));
        assert!(!is_valid_slug("abc"));
        assert!(!is_valid_slug("ABCDEF12"));
        assert!(!is_valid_slug("abcdefg!"));
        assert!(!is_valid_slug("0123456789"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_is_valid_slug_accepts_hex() {
        assert!(is_valid_slug("deadbeef"));
        assert!(is_valid_slug("01234567"));
    }

    #[test]
    fn test_compose_short_url() {
        assert_eq!(
            compose_short_url("https://s.example.com", "deadbeef"),
            "https://s.example.com/deadbeef"
        );
        assert_eq!(
            compose_short_url("https://s.example.com/", "deadbeef"),
            "https://s.example.com/deadbeef"
        );
    }
}
