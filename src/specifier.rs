//! Specifier keys for the registry
//!
//! Every entry in the container is addressed by a specifier: a `"type:name"`
//! pair such as `"orm-adapter:post"` or `"service:mailer"`. The type groups
//! related entries (all actions, all serializers); the name picks one entry
//! out of the group.

use crate::{ContainerError, Result};
use std::fmt;
use std::str::FromStr;

/// A validated `"type:name"` registry key.
///
/// Both tokens must be non-empty and must not contain `:`. Bare type strings
/// (no colon) are rejected here; the bulk APIs (`lookup_all`,
/// `available_for_type`) take type names directly instead.
///
/// # Examples
///
/// ```rust
/// use strata_di::Specifier;
///
/// let spec: Specifier = "orm-adapter:post".parse().unwrap();
/// assert_eq!(spec.type_name(), "orm-adapter");
/// assert_eq!(spec.name(), "post");
/// assert_eq!(spec.to_string(), "orm-adapter:post");
///
/// assert!("orm-adapter".parse::<Specifier>().is_err());
/// assert!(":post".parse::<Specifier>().is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Specifier {
    type_name: String,
    name: String,
}

impl Specifier {
    /// Build a specifier from its two tokens.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata_di::Specifier;
    ///
    /// let spec = Specifier::new("service", "db").unwrap();
    /// assert_eq!(spec.to_string(), "service:db");
    /// ```
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let type_name = type_name.into();
        let name = name.into();
        validate_token(&type_name, "type")?;
        validate_token(&name, "name")?;
        Ok(Self { type_name, name })
    }

    /// Parse a `"type:name"` string.
    ///
    /// Exactly one `:` separates the tokens; anything else is
    /// [`ContainerError::InvalidSpecifier`].
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((type_name, name)) = raw.split_once(':') else {
            return Err(ContainerError::invalid_specifier(
                raw,
                "expected `type:name`, found no `:`",
            ));
        };
        if type_name.is_empty() {
            return Err(ContainerError::invalid_specifier(raw, "empty type"));
        }
        if name.is_empty() {
            return Err(ContainerError::invalid_specifier(raw, "empty name"));
        }
        if name.contains(':') {
            return Err(ContainerError::invalid_specifier(raw, "more than one `:`"));
        }
        Ok(Self {
            type_name: type_name.to_owned(),
            name: name.to_owned(),
        })
    }

    /// The type token, e.g. `"orm-adapter"` in `"orm-adapter:post"`.
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The name token, e.g. `"post"` in `"orm-adapter:post"`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether this specifier belongs to the given type.
    #[inline]
    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }

    /// Re-target this specifier's name under another type.
    ///
    /// Handy for fallback conventions like `"serializer:post"` →
    /// `"serializer:application"`.
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self> {
        Self::new(self.type_name.clone(), name)
    }
}

/// A bare type token must be non-empty and colon-free. Shared by the bulk
/// APIs that take a type rather than a full specifier.
pub(crate) fn validate_type_name(type_name: &str) -> Result<()> {
    if type_name.is_empty() {
        return Err(ContainerError::invalid_specifier(type_name, "empty type"));
    }
    if type_name.contains(':') {
        return Err(ContainerError::invalid_specifier(
            type_name,
            "expected a bare type, found `:`",
        ));
    }
    Ok(())
}

fn validate_token(token: &str, which: &'static str) -> Result<()> {
    if token.is_empty() {
        return Err(ContainerError::invalid_specifier(
            token,
            match which {
                "type" => "empty type",
                _ => "empty name",
            },
        ));
    }
    if token.contains(':') {
        return Err(ContainerError::invalid_specifier(token, "token contains `:`"));
    }
    Ok(())
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name, self.name)
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Specifier({}:{})", self.type_name, self.name)
    }
}

impl FromStr for Specifier {
    type Err = ContainerError;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Specifier {
    type Error = ContainerError;

    #[inline]
    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
