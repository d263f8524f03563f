//! Pipeline defaults.

use crate::ContentType;
use crate::headers::names;

/// Base URL joined to path templates when no base URL is given.
pub const DEFAULT_BASE_URL: &str = "https://management.azure.com";

/// Locale sent in `accept-language` when the caller sets none.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US";

/// Values applied by the preparation pipeline when the caller omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Base URL for path templates.
    pub base_url: String,
    /// Default `accept-language` header value.
    pub accept_language: String,
    /// Default `Content-Type` header value.
    pub content_type: String,
    /// Header carrying the generated client request id.
    pub client_request_id_header: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            content_type: ContentType::Json.as_str().to_string(),
            client_request_id_header: names::CLIENT_REQUEST_ID.to_string(),
        }
    }
}

impl Defaults {
    /// Create a new defaults builder.
    #[must_use]
    pub fn builder() -> DefaultsBuilder {
        DefaultsBuilder::default()
    }
}

/// Builder for [`Defaults`].
#[derive(Debug, Clone, Default)]
pub struct DefaultsBuilder {
    base_url: Option<String>,
    accept_language: Option<String>,
    content_type: Option<String>,
    client_request_id_header: Option<String>,
}

impl DefaultsBuilder {
    /// Set the base URL joined to path templates.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the default `accept-language` value.
    #[must_use]
    pub fn accept_language(mut self, locale: impl Into<String>) -> Self {
        self.accept_language = Some(locale.into());
        self
    }

    /// Set the default `Content-Type` value.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the header name used for client request ids.
    #[must_use]
    pub fn client_request_id_header(mut self, name: impl Into<String>) -> Self {
        self.client_request_id_header = Some(name.into());
        self
    }

    /// Build the defaults.
    #[must_use]
    pub fn build(self) -> Defaults {
        let defaults = Defaults::default();
        Defaults {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            accept_language: self.accept_language.unwrap_or(defaults.accept_language),
            content_type: self.content_type.unwrap_or(defaults.content_type),
            client_request_id_header: self
                .client_request_id_header
                .unwrap_or(defaults.client_request_id_header),
        }
    }
}
