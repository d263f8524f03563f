//! Transport-agnostic HTTP request preparation.
//!
//! Build request descriptors from a literal URL or a path template with
//! parameters. Query strings, default headers and body encoding are applied
//! in one pass, and the result is handed to whatever transport you use.
//!
//! # Example
//!
//! ```
//! use stencil::prelude::*;
//! use stencil::serde_json::json;
//!
//! let factory = RequestFactory::builder()
//!     .base_url("https://api.example.com")
//!     .build();
//!
//! let request = factory.prepare(
//!     PrepareOptions::new("put")
//!         .path_template("/users/{id}")
//!         .path_parameters(Parameters::new().with("id", "a b"))
//!         .query_parameters(Parameters::new().with("api-version", "2024-01-01"))
//!         .body(json!({ "name": "Alice" })),
//! )?;
//!
//! assert_eq!(
//!     request.url(),
//!     "https://api.example.com/users/a%20b?api-version=2024-01-01"
//! );
//! assert_eq!(request.header("content-type"), Some("application/json; charset=utf-8"));
//! assert!(request.header("x-ms-client-request-id").is_some());
//!
//! let http_request = request.into_http_request()?;
//! assert_eq!(http_request.body().as_ref(), br#"{"name":"Alice"}"#);
//! # Ok::<(), stencil::Error>(())
//! ```
//!
//! Preparation is traced with the `tracing` crate under a `prepare_request`
//! span.

mod factory;
pub mod prelude;

pub use factory::{RequestFactory, RequestFactoryBuilder};

// Re-export core types
pub use stencil_core::{
    AbortSignal, Body, BodyStream, BoxError, ByteStream, ContentType, DEFAULT_ACCEPT_LANGUAGE,
    DEFAULT_BASE_URL, Defaults, DefaultsBuilder, Error, Headers, IdGenerator, Method,
    OperationSpec, ParamLocation, ParamMeta, ParameterValue, Parameters, PassthroughSerializer,
    PathTemplate, PrepareOptions, ProgressCallback, ProgressEvent, QueryMap, REQUEST_BODY_ROOT,
    RequestDescriptor, Result, Schema, SchemaSerializer, UuidGenerator, append_query,
    encode_component, header,
};

// Re-export serde_json for building bodies and parameter values
pub use serde_json;
