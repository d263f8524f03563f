//! Prelude module for convenient imports.
//!
//! ```
//! use stencil_core::prelude::*;
//! ```

pub use crate::{
    Body, Defaults, Error, Headers, Method, ParameterValue, Parameters, PathTemplate,
    PrepareOptions, RequestDescriptor, Result, Schema, SchemaSerializer,
};
