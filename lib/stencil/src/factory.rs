//! Configured entry point to the preparation pipeline.

use std::fmt;
use std::sync::Arc;

use stencil_core::{
    Defaults, IdGenerator, PrepareOptions, RequestDescriptor, Result, SchemaSerializer,
    UuidGenerator,
};
use tracing::{Level, debug, span, trace, warn};

/// Prepares [`RequestDescriptor`]s with shared defaults.
///
/// A factory holds the base URL and default headers, the client request id
/// source and an optional schema serializer. It is cheap to clone and can
/// be shared across threads.
///
/// # Example
///
/// ```
/// use stencil::{Parameters, PrepareOptions, RequestFactory};
///
/// let factory = RequestFactory::builder()
///     .base_url("https://api.example.com")
///     .build();
///
/// let request = factory.prepare(
///     PrepareOptions::new("get")
///         .path_template("/users/{id}")
///         .path_parameters(Parameters::new().with("id", "42")),
/// )?;
///
/// assert_eq!(request.url(), "https://api.example.com/users/42");
/// # Ok::<(), stencil::Error>(())
/// ```
#[derive(Clone)]
pub struct RequestFactory {
    defaults: Defaults,
    ids: Arc<dyn IdGenerator>,
    schema_registry: Option<Arc<dyn SchemaSerializer>>,
}

impl Default for RequestFactory {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RequestFactory {
    /// Create a factory with the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new factory builder.
    #[must_use]
    pub fn builder() -> RequestFactoryBuilder {
        RequestFactoryBuilder::default()
    }

    /// The defaults applied to every request.
    #[must_use]
    pub const fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Prepare a new request descriptor.
    ///
    /// The factory's schema serializer is used unless `options` carries its
    /// own.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the pipeline.
    pub fn prepare(&self, options: PrepareOptions) -> Result<RequestDescriptor> {
        let mut request = RequestDescriptor::default();
        self.prepare_into(&mut request, options)?;
        Ok(request)
    }

    /// Run the pipeline over an existing descriptor.
    ///
    /// Headers already on `request` are kept unless the options set them.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the pipeline. `request` may be
    /// partially updated.
    pub fn prepare_into(
        &self,
        request: &mut RequestDescriptor,
        options: PrepareOptions,
    ) -> Result<()> {
        let span = span!(
            Level::DEBUG,
            "prepare_request",
            method = options.method(),
            target = options.target().unwrap_or_default(),
        );
        let _entered = span.enter();

        let options = match &self.schema_registry {
            Some(registry) if !options.has_schema_registry() => {
                options.schema_registry(Arc::clone(registry))
            }
            _ => options,
        };

        match request.prepare(options, &self.defaults, self.ids.as_ref()) {
            Ok(prepared) => {
                debug!(
                    method = ?prepared.method(),
                    url = prepared.url(),
                    has_body = prepared.body().is_some(),
                    "request prepared"
                );
                trace!(headers = ?prepared.headers(), "prepared headers");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "request preparation failed");
                Err(err)
            }
        }
    }

    /// Check that a descriptor can be handed to a transport.
    ///
    /// # Errors
    ///
    /// Returns [`stencil_core::Error::MissingField`] when the method or URL
    /// is missing.
    pub fn validate(&self, request: &RequestDescriptor) -> Result<()> {
        request.validate().inspect_err(|err| {
            warn!(error = %err, url = request.url(), "invalid request descriptor");
        })
    }
}

impl fmt::Debug for RequestFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestFactory")
            .field("defaults", &self.defaults)
            .field("schema_registry", &self.schema_registry.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`RequestFactory`].
#[derive(Default)]
pub struct RequestFactoryBuilder {
    defaults: Option<Defaults>,
    base_url: Option<String>,
    accept_language: Option<String>,
    ids: Option<Arc<dyn IdGenerator>>,
    schema_registry: Option<Arc<dyn SchemaSerializer>>,
}

impl RequestFactoryBuilder {
    /// Replace all defaults at once.
    #[must_use]
    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

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

    /// Set the client request id source.
    #[must_use]
    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    /// Set the serializer used for requests carrying a schema.
    #[must_use]
    pub fn schema_registry(mut self, serializer: impl SchemaSerializer + 'static) -> Self {
        self.schema_registry = Some(Arc::new(serializer));
        self
    }

    /// Build the factory.
    #[must_use]
    pub fn build(self) -> RequestFactory {
        let mut defaults = self.defaults.unwrap_or_default();
        if let Some(base_url) = self.base_url {
            defaults.base_url = base_url;
        }
        if let Some(locale) = self.accept_language {
            defaults.accept_language = locale;
        }
        RequestFactory {
            defaults,
            ids: self.ids.unwrap_or_else(|| Arc::new(UuidGenerator)),
            schema_registry: self.schema_registry,
        }
    }
}

impl fmt::Debug for RequestFactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestFactoryBuilder")
            .field("defaults", &self.defaults)
            .field("base_url", &self.base_url)
            .field("accept_language", &self.accept_language)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use stencil_core::{BoxError, Schema};

    use super::*;

    #[test]
    fn default_factory() {
        let factory = RequestFactory::new();
        assert_eq!(factory.defaults(), &Defaults::default());
        assert!(factory.schema_registry.is_none());
    }

    #[test]
    fn builder_overrides() {
        let factory = RequestFactory::builder()
            .defaults(Defaults::builder().client_request_id_header("x-request-id").build())
            .base_url("https://local.test")
            .accept_language("ja-JP")
            .id_generator(|| "fixed".to_string())
            .build();

        assert_eq!(factory.defaults().base_url, "https://local.test");
        assert_eq!(factory.defaults().accept_language, "ja-JP");
        assert_eq!(factory.defaults().client_request_id_header, "x-request-id");
        assert_eq!(factory.ids.generate(), "fixed");
    }

    #[test]
    fn factory_registry_is_used_when_options_have_none() {
        let upper = |_: &Schema, value: &Value, _: &str| -> std::result::Result<Value, BoxError> {
            Ok(Value::from(value.as_str().unwrap_or_default().to_uppercase()))
        };
        let factory = RequestFactory::builder().schema_registry(upper).build();

        let request = factory
            .prepare(
                PrepareOptions::new("POST")
                    .url("https://h")
                    .body(json!("shout"))
                    .serialization_schema(Schema::new("Word", json!({"type": "string"}))),
            )
            .expect("prepared");
        assert_eq!(request.body().and_then(|b| b.as_text()), Some("\"SHOUT\""));
    }

    #[test]
    fn debug_hides_trait_objects() {
        let factory = RequestFactory::new();
        let rendered = format!("{factory:?}");
        assert!(rendered.contains("RequestFactory"));
        assert!(rendered.contains("schema_registry: false"));
    }
}
