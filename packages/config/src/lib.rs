// ABOUTME: Configuration and environment variable management for Tracksync
// ABOUTME: Env var names plus lenient parsing helpers shared by the binaries

pub mod constants;

pub use constants::*;

use std::env;
use std::str::FromStr;
use tracing::warn;

/// Read an environment variable, treating empty values as unset.
pub fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable, falling back to `default` when it
/// is unset or unparseable. Unparseable values are logged.
pub fn env_parse_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env_string(name) {
        Some(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "Ignoring invalid value '{}' for {}, using default {}",
                    raw, name, default
                );
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_or_falls_back_on_garbage() {
        env::set_var("TRACKSYNC_TEST_PARSE_GARBAGE", "not-a-number");
        assert_eq!(env_parse_or("TRACKSYNC_TEST_PARSE_GARBAGE", 42u64), 42);
        env::remove_var("TRACKSYNC_TEST_PARSE_GARBAGE");
    }

    #[test]
    fn test_env_parse_or_reads_value() {
        env::set_var("TRACKSYNC_TEST_PARSE_OK", " 15 ");
        assert_eq!(env_parse_or("TRACKSYNC_TEST_PARSE_OK", 30u64), 15);
        env::remove_var("TRACKSYNC_TEST_PARSE_OK");
    }

    #[test]
    fn test_env_string_treats_blank_as_unset() {
        env::set_var("TRACKSYNC_TEST_BLANK", "   ");
        assert_eq!(env_string("TRACKSYNC_TEST_BLANK"), None);
        env::remove_var("TRACKSYNC_TEST_BLANK");
    }
}
