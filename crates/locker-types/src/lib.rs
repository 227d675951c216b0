//! Validated text types shared across the locker crates.
//!
//! Every value that ends up as a path segment or as a field of a `|`-delimited
//! record passes through one of these types first, so the stores never have to
//! re-check what they are handed.

/// Field separator reserved by the on-disk record formats.
pub const FIELD_DELIMITER: char = '|';

/// Maximum accepted username length, in bytes.
pub const USERNAME_MAX_LEN: usize = 64;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input was empty, or blank where a blank value is meaningless
    #[error("Text cannot be empty")]
    Empty,

    /// The input was longer than the type allows
    #[error("Text exceeds maximum length of {max} bytes")]
    TooLong { max: usize },

    /// The input contained a character outside the allowed set
    #[error("Invalid character {0:?}")]
    InvalidCharacter(char),

    /// The input is not usable as a single plain path segment
    #[error("Not a plain file name: {0}")]
    NotAFileName(String),
}

/// A locker account name.
///
/// Usernames are used verbatim as a directory name under the data directory and
/// as the prefix of the per-user metadata file, so the accepted alphabet is
/// deliberately small: lowercase ASCII letters, digits, `_` and `-`.
///
/// Without `.` a username can never spell `users.txt` or `<other>_files.txt`,
/// and without uppercase two accounts cannot alias on a case-insensitive
/// filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validates `input` against the username allow-list.
    ///
    /// The input is not trimmed: surrounding whitespace is an invalid character.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input.is_empty() {
            return Err(TextError::Empty);
        }
        if input.len() > USERNAME_MAX_LEN {
            return Err(TextError::TooLong {
                max: USERNAME_MAX_LEN,
            });
        }
        if let Some(bad) = input.chars().find(|c| !Self::is_allowed(*c)) {
            return Err(TextError::InvalidCharacter(bad));
        }
        Ok(Self(input.to_owned()))
    }

    fn is_allowed(c: char) -> bool {
        matches!(c, 'a'..='z' | '0'..='9' | '_' | '-')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single, plain file name.
///
/// Guarantees the value can be joined onto a directory without escaping it and
/// can be written into a `|`-delimited record without breaking the field count:
/// no separators, no `.`/`..`, no [`FIELD_DELIMITER`], no line breaks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        if input == "." || input == ".." {
            return Err(TextError::NotAFileName(input.to_owned()));
        }
        if let Some(bad) = input
            .chars()
            .find(|c| matches!(c, '/' | '\\' | '\r' | '\n' | '\0') || *c == FIELD_DELIMITER)
        {
            return Err(TextError::InvalidCharacter(bad));
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_text_traits {
    ($ty:ident, $ctor:path) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ctor(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_text_traits!(Username, Username::parse);
impl_text_traits!(FileName, FileName::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_accepts_allow_list() {
        for name in ["alice", "bob_2", "x", "a-b-c", "0123"] {
            assert!(Username::parse(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn test_username_rejects_path_and_delimiter_characters() {
        let cases = [
            ("../etc", '.'),
            ("a/b", '/'),
            ("a\\b", '\\'),
            ("a|b", '|'),
            ("Alice", 'A'),
            (" alice", ' '),
            ("users.txt", '.'),
        ];
        for (input, bad) in cases {
            assert_eq!(
                Username::parse(input),
                Err(TextError::InvalidCharacter(bad)),
                "{input}"
            );
        }
    }

    #[test]
    fn test_username_rejects_empty_and_long() {
        assert_eq!(Username::parse(""), Err(TextError::Empty));
        let long = "a".repeat(USERNAME_MAX_LEN + 1);
        assert_eq!(
            Username::parse(long),
            Err(TextError::TooLong {
                max: USERNAME_MAX_LEN
            })
        );
        assert!(Username::parse("a".repeat(USERNAME_MAX_LEN)).is_ok());
    }

    #[test]
    fn test_file_name_accepts_ordinary_names() {
        for name in ["notes.txt", "report 2024.pdf", ".hidden", "a_b-c.tar.gz"] {
            assert_eq!(FileName::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_file_name_rejects_traversal_and_delimiter() {
        assert!(matches!(
            FileName::new(".."),
            Err(TextError::NotAFileName(_))
        ));
        assert!(matches!(FileName::new("."), Err(TextError::NotAFileName(_))));
        assert_eq!(
            FileName::new("../x"),
            Err(TextError::InvalidCharacter('/'))
        );
        assert_eq!(
            FileName::new("a|b.txt"),
            Err(TextError::InvalidCharacter('|'))
        );
        assert_eq!(
            FileName::new("line\nbreak"),
            Err(TextError::InvalidCharacter('\n'))
        );
        assert_eq!(FileName::new(" "), Err(TextError::Empty));
    }

    #[test]
    fn test_serde_round_trip_revalidates() {
        let name = FileName::new("notes.txt").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"notes.txt\"");

        let bad: Result<Username, _> = serde_json::from_str("\"Not Valid\"");
        assert!(bad.is_err());
    }
}
