//! Validated primitive value types shared by the VPR record crates.
//!
//! Each type guarantees its lexical rules once constructed, so record code can hold them
//! without re-checking. All of them serialise as plain strings and re-validate when
//! deserialised.

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    #[error("invalid id '{0}': expected 1-64 characters from [A-Za-z0-9-.]")]
    InvalidId(String),

    #[error("invalid uri '{0}': must not contain whitespace")]
    InvalidUri(String),

    #[error("invalid code '{0}': leading, trailing or repeated whitespace is not allowed")]
    InvalidCode(String),
}

/// Maximum length of a resource id.
pub const MAX_ID_LEN: usize = 64;

macro_rules! string_value {
    ($name:ident) => {
        impl $name {
            /// Returns the inner string as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::new(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $name::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

string_value!(NonEmptyText);

/// Logical id of a resource: 1 to 64 characters of `[A-Za-z0-9-.]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(String);

impl Id {
    /// Validates and wraps an id.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for empty input and [`TextError::InvalidId`] when the
    /// length or character set is wrong.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input.is_empty() {
            return Err(TextError::Empty);
        }

        let ok = input.len() <= MAX_ID_LEN
            && input
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.');
        if !ok {
            return Err(TextError::InvalidId(input.to_owned()));
        }

        Ok(Self(input.to_owned()))
    }

    /// Generates a fresh random id (hyphenated UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

string_value!(Id);

/// A URI. Content is not resolved, only checked for emptiness and whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri(String);

impl Uri {
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for empty input and [`TextError::InvalidUri`] if the input
    /// contains whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input.is_empty() {
            return Err(TextError::Empty);
        }
        if input.chars().any(char::is_whitespace) {
            return Err(TextError::InvalidUri(input.to_owned()));
        }
        Ok(Self(input.to_owned()))
    }
}

string_value!(Uri);

/// A code drawn from some code system.
///
/// Codes may contain single inner spaces but no leading, trailing or repeated whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(String);

impl Code {
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for empty input and [`TextError::InvalidCode`] when
    /// whitespace is misplaced.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input.is_empty() {
            return Err(TextError::Empty);
        }

        let mut previous_was_space = true;
        for c in input.chars() {
            let is_space = c.is_whitespace();
            if is_space && (previous_was_space || c != ' ') {
                return Err(TextError::InvalidCode(input.to_owned()));
            }
            previous_was_space = is_space;
        }
        if previous_was_space {
            return Err(TextError::InvalidCode(input.to_owned()));
        }

        Ok(Self(input.to_owned()))
    }
}

string_value!(Code);
