//! Path template resolution.
//!
//! A template such as `/subscriptions/{subscriptionId}/groups` is joined to a
//! base URL and every `{name}` placeholder is replaced by the matching path
//! parameter.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{Error, ParamLocation, ParameterValue, Parameters, Result};

// ASCII word characters only: `{café}` is literal text, not a placeholder.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{((?-u:\w)*(?-u:\s)*(?-u:\w)*)\}").expect("placeholder pattern is valid")
});

/// A path template, before parameter substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Create a new path template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Get the template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder names in order of appearance, duplicates included.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        PLACEHOLDER
            .captures_iter(&self.0)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str())
    }

    /// Join the template to `base_url` with exactly one `/` between them.
    #[must_use]
    pub fn join(&self, base_url: &str) -> String {
        let relative = self.0.strip_prefix('/').unwrap_or(&self.0);
        let mut url = String::with_capacity(base_url.len() + relative.len() + 1);
        url.push_str(base_url);
        if !url.is_empty() && !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(relative);
        url
    }

    /// Join to `base_url` and substitute every placeholder.
    ///
    /// Every occurrence of a placeholder is replaced, so `{id}` appearing
    /// twice yields the same value twice. Substituted values are never
    /// rescanned for placeholders.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingPathParameter`] if a placeholder has no parameter
    /// - [`Error::InvalidParameterType`] / [`Error::MissingParameterValue`]
    ///   if a parameter cannot be normalized
    ///
    /// # Example
    ///
    /// ```
    /// use stencil_core::{Parameters, PathTemplate};
    ///
    /// let template = PathTemplate::new("/users/{id}/posts");
    /// let params = Parameters::new().with("id", "jane doe");
    /// let url = template.resolve("https://api.example.com", &params).expect("resolved");
    /// assert_eq!(url, "https://api.example.com/users/jane%20doe/posts");
    /// ```
    pub fn resolve(&self, base_url: &str, params: &Parameters) -> Result<String> {
        let joined = self.join(base_url);
        let mut resolved: HashMap<String, String> = HashMap::new();
        let mut failure = None;

        let url = PLACEHOLDER.replace_all(&joined, |caps: &Captures<'_>| {
            if failure.is_some() {
                return String::new();
            }
            let name = caps.get(1).map_or("", |name| name.as_str());
            if let Some(value) = resolved.get(name) {
                return value.clone();
            }
            match self.substitution(name, params) {
                Ok(value) => {
                    resolved.insert(name.to_string(), value.clone());
                    value
                }
                Err(err) => {
                    failure = Some(err);
                    String::new()
                }
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(url.into_owned()),
        }
    }

    fn substitution(&self, name: &str, params: &Parameters) -> Result<String> {
        let value = params
            .get(name)
            .ok_or_else(|| Error::missing_path_parameter(name, self.as_str()))?;
        ParameterValue::from_json(name, ParamLocation::Path, value).map(|value| value.encoded())
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PathTemplate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PathTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for PathTemplate {
    fn from(template: String) -> Self {
        Self(template)
    }
}
