//! Telephone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Telephone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum TelephoneError {
    /// The input string is empty.
    #[error("telephone cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("telephone must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains too few digits to be a phone number.
    #[error("telephone must contain at least {min} digits")]
    TooFewDigits {
        /// Minimum number of digits required.
        min: usize,
    },
    /// The input contains a character that is not valid in a phone number.
    #[error("telephone contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A telephone number.
///
/// Stored as entered (no normalization), validated structurally: an optional
/// leading `+`, digits, and common separators (spaces, dashes, dots,
/// parentheses). Uniqueness comparisons in the database use the stored form.
///
/// ## Examples
///
/// ```
/// use tradepost_core::Telephone;
///
/// assert!(Telephone::parse("1234567890").is_ok());
/// assert!(Telephone::parse("+1 (555) 867-5309").is_ok());
/// assert!(Telephone::parse("").is_err());
/// assert!(Telephone::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Telephone(String);

impl Telephone {
    /// Maximum length of a telephone number.
    pub const MAX_LENGTH: usize = 32;

    /// Minimum number of digits a telephone number must contain.
    pub const MIN_DIGITS: usize = 7;

    /// Parse a `Telephone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 32 characters
    /// - Contains fewer than 7 digits
    /// - Contains characters other than digits, `+`, spaces, dashes, dots,
    ///   or parentheses
    pub fn parse(s: &str) -> Result<Self, TelephoneError> {
        if s.is_empty() {
            return Err(TelephoneError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(TelephoneError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        for (i, c) in s.chars().enumerate() {
            let valid = c.is_ascii_digit()
                || matches!(c, ' ' | '-' | '.' | '(' | ')')
                || (c == '+' && i == 0);
            if !valid {
                return Err(TelephoneError::InvalidCharacter(c));
            }
        }

        let digits = s.chars().filter(char::is_ascii_digit).count();
        if digits < Self::MIN_DIGITS {
            return Err(TelephoneError::TooFewDigits {
                min: Self::MIN_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the telephone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Telephone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Telephone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Telephone {
    type Err = TelephoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Telephone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
