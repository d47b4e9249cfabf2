use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// The name of a placeholder found in a template, e.g. `ten` for `{ten}`.
///
/// Never empty. Identity is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceholderName(String);

impl PlaceholderName {
    /// Returns `None` for an empty name.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() { None } else { Some(Self(name)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlaceholderName {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PlaceholderName::new(value).ok_or("placeholder name must not be empty")
    }
}

impl From<PlaceholderName> for String {
    fn from(value: PlaceholderName) -> Self {
        value.0
    }
}

impl fmt::Display for PlaceholderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlaceholderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PlaceholderName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A placeholder together with the templates that reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderUsage {
    pub name: PlaceholderName,
    /// Template identities, in template load order.
    pub templates: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        assert!(PlaceholderName::new("").is_none());
        assert!(serde_json::from_str::<PlaceholderName>(r#""""#).is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let name = PlaceholderName::new("ho_ten").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), r#""ho_ten""#);
    }
}
