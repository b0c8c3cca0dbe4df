//! Base address resolution

/// Environment variable that overrides the service base URL
pub const BASE_URL_ENV_VAR: &str = "INNOVATOR_API_BASE_URL";

/// Base URL used by debug builds when nothing else is configured
pub const DEV_BASE_URL: &str = "http://localhost:8000";

/// Path of the clarification operation
pub const CLARIFY_PATH: &str = "/clarify";

/// Path of the generation operation
pub const GENERATE_PATH: &str = "/generate";

/// Pick the base URL from the first non-blank candidate.
///
/// Order: explicit value (CLI flag), environment override, config file,
/// development default (debug builds only), empty prefix.
pub fn resolve_base_url(
    explicit: Option<&str>,
    env_override: Option<&str>,
    from_config: Option<&str>,
    dev: bool,
) -> String {
    let chosen = [explicit, env_override, from_config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty());

    match chosen {
        Some(url) => normalize(url),
        None if dev => DEV_BASE_URL.to_string(),
        None => String::new(),
    }
}

/// Same as [`resolve_base_url`], reading the environment override itself
pub fn resolve_from_env(explicit: Option<&str>, from_config: Option<&str>) -> String {
    let env_value = std::env::var(BASE_URL_ENV_VAR).ok();
    resolve_base_url(
        explicit,
        env_value.as_deref(),
        from_config,
        cfg!(debug_assertions),
    )
}

/// Join a base URL and an operation path
pub fn join(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn normalize(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        let url = resolve_base_url(
            Some("https://a.example"),
            Some("https://b.example"),
            Some("https://c.example"),
            true,
        );
        assert_eq!(url, "https://a.example");
    }

    #[test]
    fn test_env_before_config() {
        let url = resolve_base_url(None, Some("https://b.example/"), Some("https://c.example"), false);
        assert_eq!(url, "https://b.example");
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let url = resolve_base_url(Some("  "), Some(""), Some("https://c.example"), false);
        assert_eq!(url, "https://c.example");
    }

    #[test]
    fn test_dev_default_then_empty() {
        assert_eq!(resolve_base_url(None, None, None, true), DEV_BASE_URL);
        assert_eq!(resolve_base_url(None, None, None, false), "");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("http://localhost:8000", CLARIFY_PATH), "http://localhost:8000/clarify");
        assert_eq!(join("http://host/api/", GENERATE_PATH), "http://host/api/generate");
    }
}
