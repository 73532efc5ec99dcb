//! Environment-based credential discovery

use crate::config::Credential;
use std::env;

/// Environment variables holding OpenRouter keys, in rotation order, with
/// the label each one is known by.
pub const CREDENTIAL_ENV_VARS: [(&str, &str); 3] = [
    ("OPENROUTER_API", "openrouter-default"),
    ("OPENROUTER_API_1", "openrouter-one"),
    ("OPENROUTER_API_2", "openrouter-two"),
];

/// Load API keys from the process environment.
pub fn load_credentials_from_env() -> Vec<Credential> {
    credentials_from_lookup(|name| env::var(name).ok())
}

/// Builds the credential list from an arbitrary variable lookup.
/// Unset and blank variables are skipped.
pub fn credentials_from_lookup<F>(lookup: F) -> Vec<Credential>
where
    F: Fn(&str) -> Option<String>,
{
    CREDENTIAL_ENV_VARS
        .iter()
        .filter_map(|(var, label)| {
            let value = lookup(var)?;
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                Some(Credential::new(*label, value))
            }
        })
        .collect()
}
