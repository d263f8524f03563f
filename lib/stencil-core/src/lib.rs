//! Core types for stencil HTTP request preparation.
//!
//! This crate turns caller-supplied request options into a transport-ready
//! [`RequestDescriptor`]:
//! - [`Method`] - HTTP verbs, parsed case-insensitively
//! - [`PathTemplate`] - `{placeholder}` templates joined to a base URL
//! - [`Parameters`] and [`ParameterValue`] - path and query parameter values
//! - [`append_query`] - query string composition
//! - [`Headers`] - case-insensitive header collection
//! - [`Body`], [`Schema`] and [`SchemaSerializer`] - body encoding
//! - [`PrepareOptions`] and [`RequestDescriptor::prepare`] - the pipeline
//! - [`Error`] and [`Result`] - error handling
//!
//! The crate never performs I/O. A transport consumes the descriptor, for
//! example through [`RequestDescriptor::into_http_request`].

mod body;
mod defaults;
mod error;
mod headers;
mod id;
mod method;
mod operation;
mod param;
mod path_template;
pub mod prelude;
mod prepare;
mod query;
mod request;
mod signal;

pub use body::{
    Body, BodyStream, ByteStream, ContentType, PassthroughSerializer, REQUEST_BODY_ROOT, Schema,
    SchemaSerializer,
};
pub use defaults::{DEFAULT_ACCEPT_LANGUAGE, DEFAULT_BASE_URL, Defaults, DefaultsBuilder};
pub use error::{BoxError, Error, Result};
pub use headers::{Headers, names as header};
pub use id::{IdGenerator, UuidGenerator};
pub use method::Method;
pub use operation::{OperationSpec, ParamLocation, ParamMeta};
pub use param::{ParameterValue, Parameters, encode_component};
pub use path_template::PathTemplate;
pub use prepare::PrepareOptions;
pub use query::{QueryMap, append_query};
pub use request::RequestDescriptor;
pub use signal::{AbortSignal, ProgressCallback, ProgressEvent};
