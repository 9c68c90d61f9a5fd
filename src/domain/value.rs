use std::fmt;

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// M4U account user name (`USER=` header line).
///
/// Invariant: non-empty after trimming.
pub struct Username(String);

impl Username {
    /// Header key used by the M4U protocol (`USER`).
    pub const FIELD: &'static str = "USER";

    /// Create a validated [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated user name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// M4U account password (`PASSWORD=` header line).
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Header key used by the M4U protocol (`PASSWORD`).
    pub const FIELD: &'static str = "PASSWORD";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Normalized recipient or sender phone number.
///
/// Invariant: a single leading `+` followed by one or more ASCII digits.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Field name reported in validation errors.
    pub const FIELD: &'static str = "phone_number";

    /// Strip everything but digits from `input` and prefix the result with `+`.
    ///
    /// Fails when no digit survives, e.g. for `""` or `"ext"`.
    pub fn normalize(input: impl AsRef<str>) -> Result<Self, ValidationError> {
        let digits = input
            .as_ref()
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>();
        if digits.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(format!("+{digits}")))
    }

    /// Normalized value, including the leading `+`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text.
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Field name reported in validation errors.
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Wrap a fragment cut from text that already passed [`MessageText::new`].
    pub(crate) fn from_fragment(fragment: String) -> Self {
        Self(fragment)
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, which is what the gateway's segment limit counts.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Caller-chosen numeric message id, echoed back by the gateway in replies
/// when message-id mode is enabled.
pub struct MessageId(u64);

impl MessageId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unix timestamp in seconds, as reported for received replies.
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// Create a timestamp value (no range validation is performed).
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the underlying timestamp in seconds.
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// M4U status code, the leading integer of a response body.
///
/// This value is preserved as-is even when the code is unknown to this crate.
pub struct StatusCode(i32);

impl StatusCode {
    /// Construct a status code from its integer representation.
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// Get the integer code as provided by the gateway.
    pub fn as_i32(self) -> i32 {
        self.0
    }

    /// Map this code to a known status code variant, if one exists.
    pub fn known(self) -> Option<KnownStatusCode> {
        KnownStatusCode::from_code(self.0)
    }

    /// Returns `true` for the plain success code (100).
    pub fn is_ok(self) -> bool {
        self.known() == Some(KnownStatusCode::Ok)
    }

    /// Returns `true` when a reply listing follows the status line (150).
    pub fn has_replies(self) -> bool {
        self.known() == Some(KnownStatusCode::RepliesPresent)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Known M4U status codes.
///
/// Every other code is a command-specific failure or empty-result signal.
pub enum KnownStatusCode {
    /// Messages accepted, or credits reported.
    Ok,
    /// A reply listing follows the status line.
    RepliesPresent,
}

impl KnownStatusCode {
    /// Convert a raw integer code into a known variant.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            100 => Self::Ok,
            150 => Self::RepliesPresent,
            _ => return None,
        })
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 100,
            Self::RepliesPresent => 150,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_newtypes_trim_or_validate() {
        let user = Username::new(" acme ").unwrap();
        assert_eq!(user.as_str(), "acme");
        assert!(Username::new("  ").is_err());

        let password = Password::new(" secret ").unwrap();
        assert_eq!(password.as_str(), " secret ");
        assert!(Password::new("").is_err());

        let msg = MessageText::new(" hi ").unwrap();
        assert_eq!(msg.as_str(), " hi ");
        assert!(MessageText::new("  ").is_err());
    }

    #[test]
    fn password_debug_is_redacted() {
        let password = Password::new("hunter2").unwrap();
        assert_eq!(format!("{password:?}"), "Password(***)");
    }

    #[test]
    fn phone_number_keeps_digits_only() {
        let phone = PhoneNumber::normalize("+1 (234) 567-8900 ext").unwrap();
        assert_eq!(phone.as_str(), "+12345678900");

        let phone = PhoneNumber::normalize("0412 345 678").unwrap();
        assert_eq!(phone.as_str(), "+0412345678");
    }

    #[test]
    fn phone_number_without_digits_is_rejected() {
        for input in ["", "   ", "+", "ext"] {
            assert_eq!(
                PhoneNumber::normalize(input),
                Err(ValidationError::Empty {
                    field: PhoneNumber::FIELD
                }),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn message_text_counts_characters_not_bytes() {
        let msg = MessageText::new("héllo").unwrap();
        assert_eq!(msg.char_len(), 5);
    }

    #[test]
    fn status_code_known_mapping() {
        assert!(StatusCode::new(100).is_ok());
        assert!(StatusCode::new(150).has_replies());
        assert!(!StatusCode::new(150).is_ok());
        assert_eq!(StatusCode::new(400).known(), None);
        assert_eq!(KnownStatusCode::RepliesPresent.code(), 150);
    }
}
