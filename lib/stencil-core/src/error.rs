//! Error types for stencil.

use derive_more::{Display, Error, From};

use crate::ParamLocation;

/// Boxed error returned by external collaborators such as a schema serializer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for request preparation.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// A required descriptor field is absent.
    #[display("{_0} is required")]
    #[from(skip)]
    MissingField(#[error(not(source))] &'static str),

    /// Both a literal URL and a path template were supplied.
    #[display("url and path template are mutually exclusive, supply only one of them")]
    #[from(skip)]
    ConflictingUrlSpec,

    /// Neither a literal URL nor a path template was supplied.
    #[display("either a url or a path template must be supplied")]
    #[from(skip)]
    MissingUrlSpec,

    /// The method is not one of the supported HTTP verbs.
    #[display("unsupported HTTP method: {_0:?}")]
    #[from(skip)]
    InvalidMethod(#[error(not(source))] String),

    /// A template placeholder has no matching path parameter.
    #[display("path template {template:?} has a placeholder {{{name}}} with no matching path parameter")]
    #[from(skip)]
    MissingPathParameter {
        /// Placeholder name, without braces.
        name: String,
        /// The template being resolved.
        template: String,
    },

    /// A parameter is neither a string nor a `{value, skipUrlEncoding}` object.
    #[display("{location} parameter {name:?} must be a string or an object carrying a value")]
    #[from(skip)]
    InvalidParameterType {
        /// Parameter name.
        name: String,
        /// Where the parameter was destined.
        location: ParamLocation,
    },

    /// A `{value, skipUrlEncoding}` object has no usable `value`.
    #[display("{location} parameter {name:?} has no value")]
    #[from(skip)]
    MissingParameterValue {
        /// Parameter name.
        name: String,
        /// Where the parameter was destined.
        location: ParamLocation,
    },

    /// Query parameters were not supplied as a mapping.
    #[display("query parameters must be a mapping, got {_0}")]
    #[from(skip)]
    InvalidQueryParameters(#[error(not(source))] String),

    /// Header name or value rejected.
    #[display("invalid header: {_0}")]
    #[from(skip)]
    InvalidHeader(#[error(not(source))] String),

    /// A stream body cannot be buffered into an `http::Request`.
    #[display("stream bodies must be handed to the transport directly")]
    #[from(skip)]
    StreamBody,

    /// The schema serializer rejected the body, propagated unchanged.
    #[display("schema serialization failed: {_0}")]
    #[from(skip)]
    Serialization(BoxError),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Error assembling an `http::Request`.
    #[display("HTTP request error: {_0}")]
    #[from]
    Http(http::Error),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a missing path parameter error.
    #[must_use]
    pub fn missing_path_parameter(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self::MissingPathParameter {
            name: name.into(),
            template: template.into(),
        }
    }

    /// Create an invalid parameter type error.
    #[must_use]
    pub fn invalid_parameter_type(name: impl Into<String>, location: ParamLocation) -> Self {
        Self::InvalidParameterType {
            name: name.into(),
            location,
        }
    }

    /// Create a missing parameter value error.
    #[must_use]
    pub fn missing_parameter_value(name: impl Into<String>, location: ParamLocation) -> Self {
        Self::MissingParameterValue {
            name: name.into(),
            location,
        }
    }

    /// Create an invalid header error.
    #[must_use]
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader(message.into())
    }

    /// Wrap a schema serializer failure.
    #[must_use]
    pub fn serialization(source: impl Into<BoxError>) -> Self {
        Self::Serialization(source.into())
    }

    /// Returns `true` if the error comes from resolving a path or query parameter.
    #[must_use]
    pub const fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::MissingPathParameter { .. }
                | Self::InvalidParameterType { .. }
                | Self::MissingParameterValue { .. }
                | Self::InvalidQueryParameters(_)
        )
    }

    /// Returns the parameter name for parameter resolution errors.
    #[must_use]
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Self::MissingPathParameter { name, .. }
            | Self::InvalidParameterType { name, .. }
            | Self::MissingParameterValue { name, .. } => Some(name),
            _ => None,
        }
    }
}
