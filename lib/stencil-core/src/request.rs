//! HTTP request descriptors.
//!
//! A [`RequestDescriptor`] describes a request that has not been sent yet.
//! Build one with [`RequestDescriptor::new`] or through the preparation
//! pipeline ([`RequestDescriptor::prepare`]), then hand it to a transport.
//!
//! # Example
//!
//! ```
//! use stencil_core::{Method, RequestDescriptor};
//!
//! let mut request = RequestDescriptor::new(Method::Get, "https://api.example.com/users");
//! request.headers_mut().set("Accept", "application/json")?;
//! request.validate()?;
//! # Ok::<(), stencil_core::Error>(())
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;

use crate::{
    AbortSignal, Body, Error, Headers, Method, OperationSpec, ProgressCallback, QueryMap, Result,
};

/// An HTTP request that has not been sent.
///
/// Cloning copies the headers and shares everything else: bodies, form
/// data, operation metadata and callbacks are reference counted or plain
/// values, so a clone never observes header changes made to the original.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    pub(crate) url: String,
    pub(crate) method: Option<Method>,
    pub(crate) body: Option<Body>,
    pub(crate) headers: Headers,
    pub(crate) raw_response_requested: bool,
    pub(crate) form_data: Option<Arc<Value>>,
    pub(crate) query: Option<QueryMap>,
    pub(crate) operation_spec: Option<Arc<OperationSpec>>,
    pub(crate) abort_signal: Option<AbortSignal>,
    pub(crate) on_upload_progress: Option<ProgressCallback>,
    pub(crate) on_download_progress: Option<ProgressCallback>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) keep_alive: Option<bool>,
    pub(crate) decompress_response: bool,
    pub(crate) stream_response_body: bool,
    pub(crate) with_credentials: bool,
}

impl RequestDescriptor {
    /// Creates a descriptor for `method` and `url`.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Some(method),
            ..Self::default()
        }
    }

    /// Checks that the descriptor can be sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the method is unset or the URL is
    /// empty.
    pub fn validate(&self) -> Result<()> {
        if self.method.is_none() {
            return Err(Error::MissingField("method"));
        }
        if self.url.is_empty() {
            return Err(Error::MissingField("url"));
        }
        Ok(())
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the request URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Option<Method> {
        self.method
    }

    /// Replace the HTTP method.
    pub fn set_method(&mut self, method: Method) {
        self.method = Some(method);
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Single header value by name, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Replace the request body without encoding it.
    pub fn set_body(&mut self, body: Option<Body>) {
        self.body = body;
    }

    /// Query pairs appended by the last query composition, already encoded.
    #[must_use]
    pub const fn query(&self) -> Option<&QueryMap> {
        self.query.as_ref()
    }

    /// Whether the caller wants the unparsed response.
    #[must_use]
    pub const fn raw_response_requested(&self) -> bool {
        self.raw_response_requested
    }

    /// Form data handed through to the transport.
    #[must_use]
    pub fn form_data(&self) -> Option<&Value> {
        self.form_data.as_deref()
    }

    /// Operation metadata handed through to the transport.
    #[must_use]
    pub fn operation_spec(&self) -> Option<&OperationSpec> {
        self.operation_spec.as_deref()
    }

    /// Cancellation signal.
    #[must_use]
    pub const fn abort_signal(&self) -> Option<&AbortSignal> {
        self.abort_signal.as_ref()
    }

    /// Upload progress callback.
    #[must_use]
    pub const fn on_upload_progress(&self) -> Option<&ProgressCallback> {
        self.on_upload_progress.as_ref()
    }

    /// Download progress callback.
    #[must_use]
    pub const fn on_download_progress(&self) -> Option<&ProgressCallback> {
        self.on_download_progress.as_ref()
    }

    /// Request timeout hint.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Connection keep-alive hint; `None` leaves it to the transport.
    #[must_use]
    pub const fn keep_alive(&self) -> Option<bool> {
        self.keep_alive
    }

    /// Whether the transport should decompress the response.
    #[must_use]
    pub const fn decompress_response(&self) -> bool {
        self.decompress_response
    }

    /// Whether the response body should be exposed as a stream.
    #[must_use]
    pub const fn stream_response_body(&self) -> bool {
        self.stream_response_body
    }

    /// Whether credentials travel with cross-origin requests.
    #[must_use]
    pub const fn with_credentials(&self) -> bool {
        self.with_credentials
    }

    /// Ask for the unparsed response.
    #[must_use]
    pub fn with_raw_response(mut self, raw: bool) -> Self {
        self.raw_response_requested = raw;
        self
    }

    /// Attach form data.
    #[must_use]
    pub fn with_form_data(mut self, form_data: Value) -> Self {
        self.form_data = Some(Arc::new(form_data));
        self
    }

    /// Attach operation metadata.
    #[must_use]
    pub fn with_operation_spec(mut self, spec: OperationSpec) -> Self {
        self.operation_spec = Some(Arc::new(spec));
        self
    }

    /// Set a request timeout hint.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the keep-alive hint.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    /// Ask the transport to decompress the response.
    #[must_use]
    pub fn with_decompress_response(mut self, decompress: bool) -> Self {
        self.decompress_response = decompress;
        self
    }

    /// Ask the transport to stream the response body.
    #[must_use]
    pub fn with_stream_response_body(mut self, stream: bool) -> Self {
        self.stream_response_body = stream;
        self
    }

    /// Send credentials with cross-origin requests.
    #[must_use]
    pub fn with_credentials_enabled(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    /// Convert into an `http::Request` with a buffered body.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] if the descriptor does not validate
    /// - [`Error::InvalidUrl`] if the URL is not absolute and well formed
    /// - [`Error::StreamBody`] for stream bodies
    pub fn into_http_request(self) -> Result<http::Request<Bytes>> {
        self.validate()?;
        let url = url::Url::parse(&self.url)?;
        let method = self.method.ok_or(Error::MissingField("method"))?;
        let body = self.body.map(Body::into_bytes).transpose()?.unwrap_or_default();

        let mut request = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str())
            .body(body)?;
        *request.headers_mut() = self.headers.into_header_map();
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::{ParamLocation, ProgressEvent};

    #[test]
    fn new_descriptor_defaults() {
        let request = RequestDescriptor::new(Method::Get, "https://api.example.com/users");

        check!(request.method() == Some(Method::Get));
        check!(request.url() == "https://api.example.com/users");
        check!(request.headers().is_empty());
        check!(request.body().is_none());
        check!(request.query().is_none());
        check!(!request.raw_response_requested());
        check!(request.timeout().is_none());
        check!(request.keep_alive().is_none());
    }

    #[test]
    fn validate_requires_method() {
        let mut request = RequestDescriptor::default();
        request.set_url("https://api.example.com");
        let_assert!(Err(Error::MissingField(field)) = request.validate());
        check!(field == "method");
    }

    #[test]
    fn validate_requires_url() {
        let mut request = RequestDescriptor::default();
        request.set_method(Method::Post);
        let_assert!(Err(Error::MissingField(field)) = request.validate());
        check!(field == "url");

        let_assert!(Err(Error::MissingField("method")) = RequestDescriptor::default().validate());
    }

    #[test]
    fn validate_accepts_complete_descriptor() {
        let request = RequestDescriptor::new(Method::Delete, "https://api.example.com/users/1");
        check!(request.validate().is_ok());
    }

    #[test]
    fn clone_has_independent_headers() {
        let mut original = RequestDescriptor::new(Method::Get, "https://h")
            .with_form_data(json!({"field": "value"}));
        original.headers_mut().set("Accept", "*/*").expect("valid");
        original.set_body(Some(Body::from("payload")));

        let mut copy = original.clone();
        copy.headers_mut().set("accept", "text/html").expect("valid");
        copy.headers_mut().set("x-extra", "1").expect("valid");

        check!(original.header("Accept") == Some("*/*"));
        check!(original.headers().len() == 1);
        check!(copy.header("accept") == Some("text/html"));
        check!(copy.body().and_then(Body::as_text) == Some("payload"));
        check!(copy.form_data() == Some(&json!({"field": "value"})));
        check!(std::ptr::eq(
            original.form_data().expect("form data"),
            copy.form_data().expect("form data")
        ));
    }

    #[test]
    fn clone_shares_handles() {
        let signal = AbortSignal::new();
        let progress = ProgressCallback::new(|_: ProgressEvent| {});
        let mut original = RequestDescriptor::new(Method::Put, "https://h");
        original.abort_signal = Some(signal.clone());
        original.on_upload_progress = Some(progress.clone());

        let copy = original.clone();
        signal.abort();

        check!(copy.abort_signal().is_some_and(AbortSignal::is_aborted));
        check!(copy.on_upload_progress().is_some_and(|cb| cb.ptr_eq(&progress)));
        check!(copy.on_download_progress().is_none());
    }

    #[test]
    fn transport_hints() {
        static PARAMS: &[crate::ParamMeta] = &[];
        let request = RequestDescriptor::new(Method::Get, "https://h")
            .with_timeout(Duration::from_secs(5))
            .with_keep_alive(false)
            .with_decompress_response(true)
            .with_stream_response_body(true)
            .with_credentials_enabled(true)
            .with_raw_response(true)
            .with_operation_spec(OperationSpec {
                name: "status_get",
                http_method: Method::Get,
                path_template: None,
                parameters: PARAMS,
            });

        check!(request.timeout() == Some(Duration::from_secs(5)));
        check!(request.keep_alive() == Some(false));
        check!(request.decompress_response());
        check!(request.stream_response_body());
        check!(request.with_credentials());
        check!(request.raw_response_requested());
        check!(request.operation_spec().map(|spec| spec.name) == Some("status_get"));
        check!(
            request
                .operation_spec()
                .map(|spec| spec.parameters_in(ParamLocation::Path).count())
                == Some(0)
        );
    }

    #[test]
    fn into_http_request() {
        let mut request = RequestDescriptor::new(Method::Post, "https://api.example.com/users?a=1");
        request.headers_mut().set("Content-Type", "application/json").expect("valid");
        request.set_body(Some(Body::Text(r#"{"name":"test"}"#.to_string())));

        let request = request.into_http_request().expect("http request");
        check!(request.method() == http::Method::POST);
        check!(request.uri() == "https://api.example.com/users?a=1");
        check!(request.headers().get("content-type").map(|v| v.as_bytes()) == Some(&b"application/json"[..]));
        check!(request.body() == &Bytes::from_static(br#"{"name":"test"}"#));
    }

    #[test]
    fn into_http_request_without_body() {
        let request = RequestDescriptor::new(Method::Get, "https://h/").into_http_request();
        let_assert!(Ok(request) = request);
        check!(request.body().is_empty());
    }

    #[test]
    fn into_http_request_rejects_invalid_descriptors() {
        let_assert!(Err(Error::MissingField("url")) = RequestDescriptor::new(Method::Get, "").into_http_request());
        let_assert!(Err(Error::InvalidUrl(_)) = RequestDescriptor::new(Method::Get, "/relative").into_http_request());
    }
}
