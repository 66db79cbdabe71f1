//! Custom serde deserializers for config normalization.
//!
//! Share lists come from hand-edited JSON and CSV files, so optional fields
//! show up as missing keys, `null`, empty strings or padded strings. These
//! helpers fold all of them into a clean `Option<String>`.

use serde::{Deserialize, Deserializer};

/// Deserializes an optional string, treating blank values as `None`.
///
/// Surrounding whitespace is trimmed from non-blank values.
///
/// # Examples
/// ```text
/// Input:  ""         -> None
/// Input:  "  "       -> None
/// Input:  null       -> None
/// Input:  " admin "  -> Some("admin")
/// ```
pub fn empty_string_as_none<'a, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'a>,
{
    let value = Option::<String>::deserialize(deserializer)?;

    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Deserializes an optional secret, treating only the empty string as `None`.
///
/// Unlike [`empty_string_as_none`] the value is kept byte for byte, since
/// leading or trailing spaces can be part of a password.
pub fn empty_secret_as_none<'a, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'a>,
{
    let value = Option::<String>::deserialize(deserializer)?;

    Ok(value.filter(|s| !s.is_empty()))
}

/// Deserializes a required string and trims surrounding whitespace.
pub fn trimmed<'a, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'a>,
{
    let s = String::deserialize(deserializer)?;

    Ok(s.trim().to_string())
}
