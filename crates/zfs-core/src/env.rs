//! Environment variable helpers used by `HandleConfig::from_env` and the
//! logger.

use std::str::FromStr;

/// Parse `key` as `T`, falling back to `default` when unset or unparsable.
#[inline]
pub fn env_get<T: FromStr>(key: &str, default: T) -> T {
    env_get_opt(key).unwrap_or(default)
}

/// `Some(T)` only when `key` is set and parses.
#[inline]
pub fn env_get_opt<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// "1", "true", "yes", "on" (any case) are true; any other value is false;
/// unset gives `default`.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_gives_default() {
        let n: usize = env_get("__ZFS_TEST_UNSET__", 7);
        assert_eq!(n, 7);
        assert!(env_get_bool("__ZFS_TEST_UNSET__", true));
        assert_eq!(env_get_str("__ZFS_TEST_UNSET__", "dflt"), "dflt");
        assert_eq!(env_get_opt::<u64>("__ZFS_TEST_UNSET__"), None);
    }

    #[test]
    fn set_values_parse() {
        std::env::set_var("__ZFS_TEST_NUM__", " 4096 ");
        assert_eq!(env_get("__ZFS_TEST_NUM__", 0usize), 4096);
        std::env::set_var("__ZFS_TEST_NUM__", "lots");
        assert_eq!(env_get("__ZFS_TEST_NUM__", 9usize), 9);
        std::env::remove_var("__ZFS_TEST_NUM__");
    }

    #[test]
    fn bool_spellings() {
        for yes in ["1", "true", "YES", "On"] {
            std::env::set_var("__ZFS_TEST_BOOL__", yes);
            assert!(env_get_bool("__ZFS_TEST_BOOL__", false), "{}", yes);
        }
        for no in ["0", "false", "nope"] {
            std::env::set_var("__ZFS_TEST_BOOL__", no);
            assert!(!env_get_bool("__ZFS_TEST_BOOL__", true), "{}", no);
        }
        std::env::remove_var("__ZFS_TEST_BOOL__");
    }
}
