//! Typed operation metadata carried alongside a descriptor.
//!
//! Generated API clients describe each operation once, statically. The
//! pipeline never interprets this metadata; it is stored on the descriptor
//! so transports and response handlers can look it up.

use std::fmt;

use crate::Method;

/// Where a parameter is placed in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// Path parameter (e.g., `/users/{id}`)
    Path,
    /// Query parameter (e.g., `?limit=10`)
    Query,
    /// Header parameter
    Header,
    /// Request body
    Body,
    /// Form data
    Form,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
            Self::Form => write!(f, "form"),
        }
    }
}

/// Metadata about a single operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamMeta {
    /// The parameter name used by callers.
    pub name: &'static str,
    /// The name sent on the wire, when it differs from `name`.
    pub serialized_name: Option<&'static str>,
    /// Where the parameter is sent.
    pub location: ParamLocation,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Whether the value is already URL-safe and must not be encoded again.
    pub skip_url_encoding: bool,
}

impl ParamMeta {
    /// Name used on the wire.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        self.serialized_name.unwrap_or(self.name)
    }
}

/// Static description of one API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    /// Operation identifier, e.g. `"users_get"`.
    pub name: &'static str,
    /// Verb the operation is sent with.
    pub http_method: Method,
    /// Path template, if the operation is addressed by template.
    pub path_template: Option<&'static str>,
    /// Declared parameters.
    pub parameters: &'static [ParamMeta],
}

impl OperationSpec {
    /// Parameters declared for a given location.
    pub fn parameters_in(&self, location: ParamLocation) -> impl Iterator<Item = &ParamMeta> {
        self.parameters
            .iter()
            .filter(move |param| param.location == location)
    }

    /// Required parameters, across all locations.
    pub fn required_parameters(&self) -> impl Iterator<Item = &ParamMeta> {
        self.parameters.iter().filter(|param| param.required)
    }
}
