use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_THUMBNAIL_VARIANTS;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThumbnailVariantsError {
    #[error("at least one thumbnail variant is required")]
    Empty,

    #[error("invalid thumbnail variant '{0}': only letters, digits, 'x' and '-' are allowed")]
    InvalidToken(String),
}

/// Resize presets the thumbnail generator produces for every uploaded image.
///
/// Configured once and shared by the upload pipeline (which polls for one
/// variant) and the deletion pipeline (which removes all of them), so the two
/// never disagree on what exists in storage. Order is preserved, duplicates
/// are dropped and the set is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ThumbnailVariants(Vec<String>);

impl ThumbnailVariants {
    pub fn new<I, S>(variants: I) -> Result<Self, ThumbnailVariantsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens: Vec<String> = Vec::new();
        for raw in variants {
            let token = raw.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            if !token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                return Err(ThumbnailVariantsError::InvalidToken(token.to_string()));
            }
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }

        if tokens.is_empty() {
            return Err(ThumbnailVariantsError::Empty);
        }
        Ok(ThumbnailVariants(tokens))
    }

    pub fn contains(&self, variant: &str) -> bool {
        self.0.iter().any(|v| v == variant)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First configured variant, used when an upload does not name one.
    pub fn primary(&self) -> &str {
        &self.0[0]
    }
}

impl Default for ThumbnailVariants {
    fn default() -> Self {
        ThumbnailVariants(
            DEFAULT_THUMBNAIL_VARIANTS
                .iter()
                .map(|v| v.to_string())
                .collect(),
        )
    }
}

impl FromStr for ThumbnailVariants {
    type Err = ThumbnailVariantsError;

    /// Parse a comma-separated list such as `"40x40,200x200"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThumbnailVariants::new(s.split(','))
    }
}

impl TryFrom<Vec<String>> for ThumbnailVariants {
    type Error = ThumbnailVariantsError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        ThumbnailVariants::new(value)
    }
}

impl From<ThumbnailVariants> for Vec<String> {
    fn from(value: ThumbnailVariants) -> Self {
        value.0
    }
}

impl fmt::Display for ThumbnailVariants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}
