//! Bidirectional mapping between the platform's language slugs and the
//! translation service's locale-qualified codes.
//!
//! The table is fixed and loaded once per process. Lookups are pure: a code
//! outside the table maps to `None` in both directions, and callers treat
//! `None` as "skip language-specific behavior for this code".

use std::collections::HashMap;
use std::sync::OnceLock;

/// (platform slug, remote code). Must stay a bijection; `map()` asserts it
/// in debug builds.
const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("ar", "ar-SA"),
    ("cs", "cs-CZ"),
    ("da", "da-DK"),
    ("de", "de-DE"),
    ("el", "el-GR"),
    ("en", "en-US"),
    ("en-gb", "en-GB"),
    ("es", "es-ES"),
    ("fi", "fi-FI"),
    ("fr", "fr-FR"),
    ("he", "he-IL"),
    ("hi", "hi-IN"),
    ("hu", "hu-HU"),
    ("it", "it-IT"),
    ("ja", "ja-JP"),
    ("ko", "ko-KR"),
    ("nl", "nl-NL"),
    ("no", "nb-NO"),
    ("pl", "pl-PL"),
    ("pt", "pt-PT"),
    ("pt-br", "pt-BR"),
    ("ro", "ro-RO"),
    ("ru", "ru-RU"),
    ("sv", "sv-SE"),
    ("th", "th-TH"),
    ("tr", "tr-TR"),
    ("uk", "uk-UA"),
    ("vi", "vi-VN"),
    ("zh", "zh-CN"),
    ("zh-tw", "zh-TW"),
];

struct LanguageMap {
    forward: HashMap<&'static str, &'static str>,
    reverse: HashMap<&'static str, &'static str>,
}

fn map() -> &'static LanguageMap {
    static MAP: OnceLock<LanguageMap> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut forward = HashMap::with_capacity(LANGUAGE_TABLE.len());
        let mut reverse = HashMap::with_capacity(LANGUAGE_TABLE.len());
        for &(host, remote) in LANGUAGE_TABLE {
            let prev_f = forward.insert(host, remote);
            let prev_r = reverse.insert(remote, host);
            debug_assert!(
                prev_f.is_none() && prev_r.is_none(),
                "language table must be a bijection"
            );
        }
        LanguageMap { forward, reverse }
    })
}

/// Map a platform language slug to the remote service's code.
pub fn to_remote(host_code: &str) -> Option<&'static str> {
    map().forward.get(host_code).copied()
}

/// Map a remote service language code back to the platform slug.
pub fn to_host(remote_code: &str) -> Option<&'static str> {
    map().reverse.get(remote_code).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Round-trip Tests ====================

    #[test]
    fn test_round_trip_all_host_codes() {
        for &(host, _) in LANGUAGE_TABLE {
            let remote = to_remote(host).expect("host code should map");
            assert_eq!(
                to_host(remote),
                Some(host),
                "round trip failed for {}",
                host
            );
        }
    }

    #[test]
    fn test_round_trip_all_remote_codes() {
        for &(_, remote) in LANGUAGE_TABLE {
            let host = to_host(remote).expect("remote code should map");
            assert_eq!(to_remote(host), Some(remote));
        }
    }

    // ==================== Known Code Tests ====================

    #[test]
    fn test_to_remote_english() {
        assert_eq!(to_remote("en"), Some("en-US"));
    }

    #[test]
    fn test_to_host_spanish() {
        assert_eq!(to_host("es-ES"), Some("es"));
    }

    #[test]
    fn test_regional_variants_are_distinct() {
        assert_eq!(to_remote("pt"), Some("pt-PT"));
        assert_eq!(to_remote("pt-br"), Some("pt-BR"));
        assert_eq!(to_host("zh-TW"), Some("zh-tw"));
    }

    // ==================== Unknown Code Tests ====================

    #[test]
    fn test_unknown_host_code_is_none() {
        assert_eq!(to_remote("xx"), None);
        assert_eq!(to_remote(""), None);
    }

    #[test]
    fn test_unknown_remote_code_is_none() {
        assert_eq!(to_host("xx-XX"), None);
        assert_eq!(to_host(""), None);
    }

    #[test]
    fn test_directions_are_not_confused() {
        // A remote code is not a valid host code and vice versa.
        assert_eq!(to_remote("en-US"), None);
        assert_eq!(to_host("en"), None);
    }
}
