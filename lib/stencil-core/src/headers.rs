//! Case-insensitive request headers.

use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{Error, Result};

/// Well-known header names used by the preparation pipeline.
pub mod names {
    /// `Accept-Language`.
    pub const ACCEPT_LANGUAGE: &str = "accept-language";
    /// `Content-Type`.
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// `Transfer-Encoding`.
    pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
    /// Default header carrying the client request id.
    pub const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
}

/// Request headers.
///
/// Names are matched case-insensitively: setting `content-type` after
/// `Content-Type` replaces the existing entry. Each name holds a single
/// value. Entries iterate in insertion order until a header is removed.
/// Values are read back as UTF-8, so any `&str` given to [`Headers::set`]
/// is returned unchanged.
///
/// ```
/// use stencil_core::Headers;
///
/// let mut headers = Headers::new();
/// headers.set("Content-Type", "text/plain")?;
/// headers.set("content-type", "application/json")?;
/// assert_eq!(headers.len(), 1);
/// assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
/// # Ok::<(), stencil_core::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(HeaderMap);

impl Headers {
    /// Creates an empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, if present.
    ///
    /// Returns `None` for values that are not UTF-8, which only a
    /// [`HeaderMap`] converted with `From` can hold.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(value_str)
    }

    /// Returns `true` if a header named `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Sets `name` to `value`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the name or value is not a valid
    /// HTTP header.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| Error::invalid_header(format!("{name:?}: {err}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| Error::invalid_header(format!("value of {name:?}: {err}")))?;
        self.0.insert(header_name, header_value);
        Ok(())
    }

    /// Sets `name` to `value` unless the header is already present.
    ///
    /// Returns `true` if the value was set.
    pub fn set_if_absent(&mut self, name: &str, value: &str) -> Result<bool> {
        if self.contains(name) {
            return Ok(false);
        }
        self.set(name, value)?;
        Ok(true)
    }

    /// Removes `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0
            .remove(name)
            .and_then(|value| value_str(&value).map(ToString::to_string))
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Headers as `(lower-case name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(name, value)| value_str(value).map(|value| (name.as_str(), value)))
    }

    /// Underlying `http` header map.
    #[must_use]
    pub fn as_header_map(&self) -> &HeaderMap {
        &self.0
    }

    /// Consume into the underlying `http` header map.
    #[must_use]
    pub fn into_header_map(self) -> HeaderMap {
        self.0
    }

    /// Builds headers from name/value pairs, later pairs overwriting earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] on the first invalid pair.
    pub fn try_from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.set(name.as_ref(), value.as_ref())?;
        }
        Ok(headers)
    }
}

// `HeaderValue::to_str` rejects obs-text, but `set` accepts any UTF-8.
fn value_str(value: &HeaderValue) -> Option<&str> {
    std::str::from_utf8(value.as_bytes()).ok()
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        Self(map)
    }
}
