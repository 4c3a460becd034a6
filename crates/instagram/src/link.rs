use std::fmt;

use crate::error::{Error, Result};

/// Substring that marks a message as an Instagram link.
pub const INSTAGRAM_DOMAIN: &str = "instagram.com";

const MAX_SHORTCODE_LEN: usize = 64;

/// Loose check used to accept a message as a link: any text containing the
/// domain passes, URL or not.
#[must_use]
pub fn is_instagram_link(text: &str) -> bool {
    text.contains(INSTAGRAM_DOMAIN)
}

/// Take the post shortcode out of a link.
///
/// The query string is cut first, then one trailing `/`, and the last path
/// segment is returned. `https://www.instagram.com/reel/ABC123/?igsh=x`
/// yields `ABC123`. The result is not validated; see [`Shortcode::parse`].
#[must_use]
pub fn extract_shortcode(link: &str) -> &str {
    let link = link.trim();
    let without_query = link.split_once('?').map_or(link, |(path, _)| path);
    let trimmed = without_query.strip_suffix('/').unwrap_or(without_query);
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// A post identifier that is safe to use as a lookup key and as a
/// directory name component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcode(String);

impl Shortcode {
    /// Accepts 1 to 64 characters from `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::invalid_shortcode("link has no post identifier"));
        }
        if raw.len() > MAX_SHORTCODE_LEN {
            return Err(Error::invalid_shortcode(format!(
                "identifier longer than {MAX_SHORTCODE_LEN} characters"
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(Error::invalid_shortcode(format!(
                "unexpected character {bad:?} in {raw:?}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Extract and validate in one step.
    pub fn from_link(link: &str) -> Result<Self> {
        Self::parse(extract_shortcode(link))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Shortcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Shortcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
