use secrecy::ExposeSecret;

use crate::schema::RelayConfig;

/// A configuration problem that prevents the bot from starting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("bot token is missing: set BOT_TOKEN or telegram.token")]
    MissingToken,

    #[error("bot token references an unset variable: {placeholder}")]
    UnresolvedToken { placeholder: String },

    #[error("telegram.poll_timeout_secs must be greater than zero")]
    ZeroPollTimeout,

    #[error("instagram.api_base must not be empty")]
    EmptyApiBase,

    #[error("instagram.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check a fully resolved config (file plus env overrides).
pub fn validate(config: &RelayConfig) -> Result<(), ValidationError> {
    if !config.telegram.has_token() {
        return Err(ValidationError::MissingToken);
    }
    if let Some(placeholder) = unresolved_placeholder(config.telegram.token.expose_secret()) {
        return Err(ValidationError::UnresolvedToken { placeholder });
    }
    if config.telegram.poll_timeout_secs == 0 {
        return Err(ValidationError::ZeroPollTimeout);
    }
    if config.instagram.api_base.trim().is_empty() {
        return Err(ValidationError::EmptyApiBase);
    }
    if config.instagram.request_timeout_secs == 0 {
        return Err(ValidationError::ZeroRequestTimeout);
    }
    Ok(())
}

/// First `${...}` left behind by env substitution, if any.
fn unresolved_placeholder(value: &str) -> Option<String> {
    let start = value.find("${")?;
    let rest = &value[start..];
    let end = rest.find('}').map_or(rest.len(), |i| i + 1);
    Some(rest[..end].to_string())
}
