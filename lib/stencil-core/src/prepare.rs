//! The request preparation pipeline.
//!
//! [`RequestDescriptor::prepare`] fills a descriptor from [`PrepareOptions`]
//! in a fixed order:
//!
//! 1. method validation
//! 2. URL resolution, from a literal URL or a path template
//! 3. query composition
//! 4. caller headers, then default headers
//! 5. body encoding
//! 6. passthrough handles
//!
//! A failing stage leaves the descriptor partially updated; discard it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::body::BodyEncoding;
use crate::headers::names;
use crate::query::append_query;
use crate::{
    AbortSignal, Body, Defaults, Error, IdGenerator, Method, OperationSpec, Parameters,
    PassthroughSerializer, PathTemplate, ProgressCallback, RequestDescriptor, Result, Schema,
    SchemaSerializer, UuidGenerator,
};

/// Everything the pipeline needs to build one request.
///
/// # Example
///
/// ```
/// use stencil_core::{Parameters, PrepareOptions};
///
/// let request = PrepareOptions::new("get")
///     .path_template("/subscriptions/{subscriptionId}/resourcegroups")
///     .path_parameters(Parameters::new().with("subscriptionId", "sub 1"))
///     .query_parameters(Parameters::new().with("api-version", "2024-03-01"))
///     .prepare()?;
///
/// assert_eq!(
///     request.url(),
///     "https://management.azure.com/subscriptions/sub%201/resourcegroups?api-version=2024-03-01"
/// );
/// # Ok::<(), stencil_core::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct PrepareOptions {
    method: String,
    url: Option<String>,
    path_template: Option<String>,
    base_url: Option<String>,
    path_parameters: Option<Parameters>,
    query_parameters: Option<Parameters>,
    headers: Vec<(String, String)>,
    disable_client_request_id: bool,
    body: Option<Body>,
    serialization_schema: Option<Schema>,
    schema_registry: Option<Arc<dyn SchemaSerializer>>,
    disable_json_text_encoding: bool,
    body_is_stream: bool,
    abort_signal: Option<AbortSignal>,
    on_upload_progress: Option<ProgressCallback>,
    on_download_progress: Option<ProgressCallback>,
    form_data: Option<Arc<Value>>,
    operation_spec: Option<Arc<OperationSpec>>,
    hints: TransportHints,
}

#[derive(Debug, Clone, Copy, Default)]
struct TransportHints {
    raw_response_requested: Option<bool>,
    timeout: Option<Duration>,
    keep_alive: Option<bool>,
    decompress_response: Option<bool>,
    stream_response_body: Option<bool>,
    with_credentials: Option<bool>,
}

impl PrepareOptions {
    /// Options for a request with the given verb, in any letter case.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    /// Use a literal URL. Exclusive with [`PrepareOptions::path_template`].
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Use a path template joined to the base URL. Exclusive with
    /// [`PrepareOptions::url`].
    #[must_use]
    pub fn path_template(mut self, template: impl Into<String>) -> Self {
        self.path_template = Some(template.into());
        self
    }

    /// Override the base URL for this request.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Values for the template placeholders.
    #[must_use]
    pub fn path_parameters(mut self, params: Parameters) -> Self {
        self.path_parameters = Some(params);
        self
    }

    /// Parameters appended to the query string.
    #[must_use]
    pub fn query_parameters(mut self, params: Parameters) -> Self {
        self.query_parameters = Some(params);
        self
    }

    /// Query parameters from the fields of a serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQueryParameters`] if `value` does not
    /// serialize to a mapping.
    pub fn query_parameters_from<T: serde::Serialize>(self, value: &T) -> Result<Self> {
        Ok(self.query_parameters(Parameters::from_serialize(value)?))
    }

    /// Sets a header; later calls overwrite earlier ones case-insensitively.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Do not generate a client request id header.
    #[must_use]
    pub fn disable_client_request_id(mut self, disable: bool) -> Self {
        self.disable_client_request_id = disable;
        self
    }

    /// Request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Schema the body is serialized with before JSON text encoding.
    #[must_use]
    pub fn serialization_schema(mut self, schema: Schema) -> Self {
        self.serialization_schema = Some(schema);
        self
    }

    /// Serializer used with [`PrepareOptions::serialization_schema`].
    #[must_use]
    pub fn schema_registry(mut self, serializer: Arc<dyn SchemaSerializer>) -> Self {
        self.schema_registry = Some(serializer);
        self
    }

    /// Keep the body as-is instead of converting it to JSON text.
    #[must_use]
    pub fn disable_json_text_encoding(mut self, disable: bool) -> Self {
        self.disable_json_text_encoding = disable;
        self
    }

    /// Treat the body as a stream.
    #[must_use]
    pub fn body_is_stream(mut self, is_stream: bool) -> Self {
        self.body_is_stream = is_stream;
        self
    }

    /// Cancellation signal handed to the transport.
    #[must_use]
    pub fn abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort_signal = Some(signal);
        self
    }

    /// Upload progress callback handed to the transport.
    #[must_use]
    pub fn on_upload_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_upload_progress = Some(callback);
        self
    }

    /// Download progress callback handed to the transport.
    #[must_use]
    pub fn on_download_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_download_progress = Some(callback);
        self
    }

    /// Form data handed to the transport.
    #[must_use]
    pub fn form_data(mut self, form_data: Value) -> Self {
        self.form_data = Some(Arc::new(form_data));
        self
    }

    /// Operation metadata handed to the transport.
    #[must_use]
    pub fn operation_spec(mut self, spec: OperationSpec) -> Self {
        self.operation_spec = Some(Arc::new(spec));
        self
    }

    /// Ask the transport for the unparsed response.
    #[must_use]
    pub fn raw_response(mut self, raw: bool) -> Self {
        self.hints.raw_response_requested = Some(raw);
        self
    }

    /// Request timeout hint.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.hints.timeout = Some(timeout);
        self
    }

    /// Connection keep-alive hint.
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.hints.keep_alive = Some(keep_alive);
        self
    }

    /// Ask the transport to decompress the response.
    #[must_use]
    pub fn decompress_response(mut self, decompress: bool) -> Self {
        self.hints.decompress_response = Some(decompress);
        self
    }

    /// Ask the transport to expose the response body as a stream.
    #[must_use]
    pub fn stream_response_body(mut self, stream: bool) -> Self {
        self.hints.stream_response_body = Some(stream);
        self
    }

    /// Send credentials with cross-origin requests.
    #[must_use]
    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.hints.with_credentials = Some(enabled);
        self
    }

    /// The verb as supplied.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The literal URL or path template, whichever was supplied.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.url.as_deref().or(self.path_template.as_deref())
    }

    /// Returns `true` if a schema registry was supplied.
    #[must_use]
    pub fn has_schema_registry(&self) -> bool {
        self.schema_registry.is_some()
    }

    /// Prepare a new descriptor with [`Defaults::default`] and UUID request ids.
    ///
    /// # Errors
    ///
    /// See [`RequestDescriptor::prepare`].
    pub fn prepare(self) -> Result<RequestDescriptor> {
        let mut request = RequestDescriptor::default();
        request.prepare(self, &Defaults::default(), &UuidGenerator)?;
        Ok(request)
    }
}

impl fmt::Debug for PrepareOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrepareOptions")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("path_template", &self.path_template)
            .field("base_url", &self.base_url)
            .field("path_parameters", &self.path_parameters)
            .field("query_parameters", &self.query_parameters)
            .field("headers", &self.headers)
            .field("disable_client_request_id", &self.disable_client_request_id)
            .field("body", &self.body)
            .field("serialization_schema", &self.serialization_schema)
            .field("disable_json_text_encoding", &self.disable_json_text_encoding)
            .field("body_is_stream", &self.body_is_stream)
            .field("hints", &self.hints)
            .finish_non_exhaustive()
    }
}

impl RequestDescriptor {
    /// Run the preparation pipeline over this descriptor.
    ///
    /// Caller headers overwrite headers already on the descriptor; defaults
    /// from `defaults` only fill headers that are still missing. Request ids
    /// come from `ids`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMethod`] for an unknown verb
    /// - [`Error::ConflictingUrlSpec`] / [`Error::MissingUrlSpec`] unless
    ///   exactly one of URL and path template is given
    /// - parameter errors from template resolution and query composition
    /// - [`Error::InvalidHeader`] for malformed caller headers
    /// - [`Error::Serialization`] / [`Error::JsonSerialization`] from body
    ///   encoding
    pub fn prepare(
        &mut self,
        options: PrepareOptions,
        defaults: &Defaults,
        ids: &dyn IdGenerator,
    ) -> Result<&mut Self> {
        let method: Method = options.method.parse()?;

        let url = match (options.url, options.path_template) {
            (Some(_), Some(_)) => return Err(Error::ConflictingUrlSpec),
            (None, None) => return Err(Error::MissingUrlSpec),
            (Some(url), None) => url,
            (None, Some(template)) => {
                let base_url = options
                    .base_url
                    .as_deref()
                    .filter(|base| !base.is_empty())
                    .unwrap_or(&defaults.base_url);
                let params = options.path_parameters.unwrap_or_default();
                PathTemplate::new(template).resolve(base_url, &params)?
            }
        };
        self.method = Some(method);
        self.url = url;

        if let Some(params) = &options.query_parameters {
            self.query = Some(append_query(&mut self.url, params)?);
        }

        for (name, value) in &options.headers {
            self.headers.set(name, value)?;
        }
        self.headers
            .set_if_absent(names::ACCEPT_LANGUAGE, &defaults.accept_language)?;
        if !options.disable_client_request_id
            && !self.headers.contains(&defaults.client_request_id_header)
        {
            self.headers
                .set(&defaults.client_request_id_header, &ids.generate())?;
        }
        self.headers
            .set_if_absent(names::CONTENT_TYPE, &defaults.content_type)?;

        if let Some(body) = options.body {
            let serializer: &dyn SchemaSerializer = match &options.schema_registry {
                Some(registry) => registry.as_ref(),
                None => &PassthroughSerializer,
            };
            let encoding = BodyEncoding {
                is_stream: options.body_is_stream,
                schema: options.serialization_schema.as_ref(),
                serializer,
                json_text: !options.disable_json_text_encoding,
            };
            self.body = Some(encoding.apply(body, &mut self.headers)?);
        }

        if let Some(signal) = options.abort_signal {
            self.abort_signal = Some(signal);
        }
        if let Some(callback) = options.on_upload_progress {
            self.on_upload_progress = Some(callback);
        }
        if let Some(callback) = options.on_download_progress {
            self.on_download_progress = Some(callback);
        }
        if let Some(form_data) = options.form_data {
            self.form_data = Some(form_data);
        }
        if let Some(spec) = options.operation_spec {
            self.operation_spec = Some(spec);
        }
        self.apply_hints(options.hints);

        Ok(self)
    }

    fn apply_hints(&mut self, hints: TransportHints) {
        if let Some(raw) = hints.raw_response_requested {
            self.raw_response_requested = raw;
        }
        if hints.timeout.is_some() {
            self.timeout = hints.timeout;
        }
        if hints.keep_alive.is_some() {
            self.keep_alive = hints.keep_alive;
        }
        if let Some(decompress) = hints.decompress_response {
            self.decompress_response = decompress;
        }
        if let Some(stream) = hints.stream_response_body {
            self.stream_response_body = stream;
        }
        if let Some(enabled) = hints.with_credentials {
            self.with_credentials = enabled;
        }
    }
}
