/// Configures timeout and retry behavior shared by every request of a client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry every failed attempt instead of only retryable/temporary errors.
    pub retry_response_errors: bool,
    /// Rewind seekable bodies to their start before a retried attempt.
    pub reset_seeker_to_zero: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry_response_errors: false,
            reset_seeker_to_zero: false,
        }
    }
}

impl ClientOptions {
    /// Reads options from the environment, falling back to defaults.
    ///
    /// Reads:
    /// - `HTTPC_TIMEOUT_MS` — per-attempt timeout in milliseconds
    /// - `HTTPC_RETRY_RESPONSE_ERRORS` — `true`/`false`/`1`/`0`
    /// - `HTTPC_RESET_SEEKER_TO_ZERO` — `true`/`false`/`1`/`0`
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        if let Some(raw) = lookup("HTTPC_TIMEOUT_MS") {
            options.timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| format!("HTTPC_TIMEOUT_MS is not a number: {raw}"))?;
        }
        if let Some(raw) = lookup("HTTPC_RETRY_RESPONSE_ERRORS") {
            options.retry_response_errors = parse_flag("HTTPC_RETRY_RESPONSE_ERRORS", &raw)?;
        }
        if let Some(raw) = lookup("HTTPC_RESET_SEEKER_TO_ZERO") {
            options.reset_seeker_to_zero = parse_flag("HTTPC_RESET_SEEKER_TO_ZERO", &raw)?;
        }
        Ok(options)
    }
}

fn parse_flag(name: &str, raw: &str) -> std::result::Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(format!("{name} is not a boolean: {raw}")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::ClientOptions;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn unset_environment_yields_defaults() {
        let options = ClientOptions::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(options, ClientOptions::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let options = ClientOptions::from_lookup(lookup(&[
            ("HTTPC_TIMEOUT_MS", "250"),
            ("HTTPC_RETRY_RESPONSE_ERRORS", "TRUE"),
            ("HTTPC_RESET_SEEKER_TO_ZERO", "1"),
        ]))
        .expect("valid env");
        assert_eq!(options.timeout_ms, 250);
        assert!(options.retry_response_errors);
        assert!(options.reset_seeker_to_zero);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = ClientOptions::from_lookup(lookup(&[("HTTPC_TIMEOUT_MS", "soon")]))
            .expect_err("not a number");
        assert!(err.contains("HTTPC_TIMEOUT_MS"));

        let err = ClientOptions::from_lookup(lookup(&[("HTTPC_RESET_SEEKER_TO_ZERO", "maybe")]))
            .expect_err("not a flag");
        assert!(err.contains("HTTPC_RESET_SEEKER_TO_ZERO"));
    }
}
