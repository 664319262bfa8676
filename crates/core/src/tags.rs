#![forbid(unsafe_code)]

pub const MAX_TAG_NAME_CHARS: usize = 64;

/// A tag name in canonical form: trimmed and lowercased.
///
/// Two spellings that differ only in surrounding whitespace or case name the same tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagName(String);

impl TagName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn normalize(raw: &str) -> Result<Self, TagNameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TagNameError::Empty);
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return Err(TagNameError::ContainsControl);
        }
        let folded = trimmed.to_lowercase();
        if folded.chars().count() > MAX_TAG_NAME_CHARS {
            return Err(TagNameError::TooLong);
        }
        Ok(Self(folded))
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagNameError {
    Empty,
    TooLong,
    ContainsControl,
}

impl TagNameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "tag name must not be empty",
            Self::TooLong => "tag name is too long",
            Self::ContainsControl => "tag name contains control characters",
        }
    }
}
