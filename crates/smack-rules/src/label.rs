//! Smack labels.
//!
//! A [`Label`] is a length-checked string used as a map key for subjects and
//! objects. A `Label` only enforces the length bound and the absence of NUL
//! bytes; whether a string is a syntactically acceptable Smack label is
//! decided by a [`LabelValidator`].

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Maximum length of a Smack label, in bytes.
pub const SMACK_LABEL_LEN: usize = 23;

/// A subject or object label.
///
/// Compared byte-for-byte; no normalization is performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Creates a label, rejecting text longer than [`SMACK_LABEL_LEN`] and
    /// text containing a NUL byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use smack_rules::Label;
    ///
    /// let label = Label::new("System::Shared").unwrap();
    /// assert_eq!(label.as_str(), "System::Shared");
    /// assert!(Label::new("a-label-that-is-far-too-long").is_err());
    /// ```
    pub fn new<S: Into<String>>(text: S) -> Result<Self> {
        let text = text.into();
        if text.len() > SMACK_LABEL_LEN {
            return Err(Error::label_too_long(text, SMACK_LABEL_LEN));
        }
        if text.contains('\0') {
            return Err(Error::InvalidLabel { label: text });
        }
        Ok(Self(text))
    }

    /// Creates a label that must also pass `validator`.
    pub fn validated<S, V>(text: S, validator: &V) -> Result<Self>
    where
        S: Into<String>,
        V: LabelValidator + ?Sized,
    {
        let label = Self::new(text)?;
        if !validator.is_valid_label(label.as_str()) {
            return Err(Error::InvalidLabel { label: label.0 });
        }
        Ok(label)
    }

    /// Returns the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the label length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty label.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts into the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Label {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Label {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::new(text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Decides whether a string is an acceptable label.
pub trait LabelValidator {
    /// Returns `true` if `text` may be used as a label.
    fn is_valid_label(&self, text: &str) -> bool;
}

impl<F> LabelValidator for F
where
    F: Fn(&str) -> bool,
{
    fn is_valid_label(&self, text: &str) -> bool {
        self(text)
    }
}

/// The Smack label syntax.
///
/// A label is 1 to [`SMACK_LABEL_LEN`] bytes of printable ASCII, must not
/// start with `-`, and must not contain `/`, `"`, `\` or `'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmackLabelValidator;

impl LabelValidator for SmackLabelValidator {
    fn is_valid_label(&self, text: &str) -> bool {
        let bytes = text.as_bytes();
        if bytes.is_empty() || bytes.len() > SMACK_LABEL_LEN || bytes[0] == b'-' {
            return false;
        }
        bytes
            .iter()
            .all(|b| matches!(b, b'!'..=b'~') && !matches!(b, b'/' | b'"' | b'\\' | b'\''))
    }
}

/// Checks `text` against [`SmackLabelValidator`].
pub fn is_valid_label(text: &str) -> bool {
    SmackLabelValidator.is_valid_label(text)
}
