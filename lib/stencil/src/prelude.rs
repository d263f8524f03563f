//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types for easy glob
//! importing:
//!
//! ```
//! use stencil::prelude::*;
//! ```

pub use crate::{
    Body, Defaults, Error, Headers, Method, ParameterValue, Parameters, PathTemplate,
    PrepareOptions, RequestDescriptor, RequestFactory, Result, Schema, SchemaSerializer,
};
