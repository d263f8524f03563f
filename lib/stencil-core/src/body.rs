//! Request bodies and body encoding.

use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use futures_core::Stream;
use serde_json::Value;

use crate::error::BoxError;
use crate::headers::names;
use crate::{Error, Headers, Result};

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json; charset=utf-8`).
    Json,
    /// Plain text content type (`text/plain`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chunked byte stream produced by the caller.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, BoxError>> + Send>>;

/// Shared handle to a caller-provided byte stream.
///
/// Clones share the same stream; the transport takes it exactly once.
#[derive(Clone)]
pub struct BodyStream(Arc<Mutex<Option<ByteStream>>>);

impl BodyStream {
    /// Wrap a stream of byte chunks.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, BoxError>> + Send + 'static,
    {
        Self(Arc::new(Mutex::new(Some(Box::pin(stream)))))
    }

    /// Take the stream out of the handle, leaving it empty for every clone.
    #[must_use]
    pub fn take(&self) -> Option<ByteStream> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Returns `true` once the stream has been taken.
    #[must_use]
    pub fn is_taken(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }

    /// Returns `true` if both handles refer to the same stream.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("taken", &self.is_taken())
            .finish()
    }
}

/// A request body, before or after encoding.
#[derive(Debug, Clone)]
pub enum Body {
    /// A structured value, not yet encoded.
    Json(Value),
    /// Text, e.g. the JSON text produced by encoding.
    Text(String),
    /// Raw bytes, never re-encoded.
    Bytes(Bytes),
    /// A caller-provided stream.
    Stream(BodyStream),
}

impl Body {
    /// Structured body from any serializable value.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Stream body.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, BoxError>> + Send + 'static,
    {
        Self::Stream(BodyStream::new(stream))
    }

    /// Text content, if this is a text body.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Structured content, if this body has not been encoded.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Byte content, if this is a raw body.
    #[must_use]
    pub const fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns `true` for stream bodies.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Buffer the body into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StreamBody`] for stream bodies.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Self::Json(value) => Ok(Bytes::from(serde_json::to_vec(&value)?)),
            Self::Text(text) => Ok(Bytes::from(text)),
            Self::Bytes(bytes) => Ok(bytes),
            Self::Stream(_) => Err(Error::StreamBody),
        }
    }

    /// Canonical JSON text of the body.
    ///
    /// Structured values and text are serialized (text becomes a quoted
    /// JSON string). Raw bytes and streams are already encoded and are
    /// returned unchanged.
    pub fn into_json_text(self) -> Result<Self> {
        match self {
            Self::Json(value) => Ok(Self::Text(serde_json::to_string(&value)?)),
            Self::Text(text) => Ok(Self::Text(serde_json::to_string(&text)?)),
            other @ (Self::Bytes(_) | Self::Stream(_)) => Ok(other),
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<BodyStream> for Body {
    fn from(stream: BodyStream) -> Self {
        Self::Stream(stream)
    }
}

/// Reference to a schema describing a typed body.
///
/// The pipeline never reads the definition; it only hands it to the
/// [`SchemaSerializer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    definition: Value,
}

impl Schema {
    /// Create a schema reference.
    #[must_use]
    pub fn new(name: impl Into<String>, definition: Value) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }

    /// Schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema definition.
    #[must_use]
    pub const fn definition(&self) -> &Value {
        &self.definition
    }
}

/// Schema-driven body serializer.
pub trait SchemaSerializer: Send + Sync {
    /// Serialize `value` according to `schema`.
    ///
    /// `root_name` names the value in error messages (`"requestBody"` for
    /// request bodies).
    fn serialize(
        &self,
        schema: &Schema,
        value: &Value,
        root_name: &str,
    ) -> std::result::Result<Value, BoxError>;
}

impl<F> SchemaSerializer for F
where
    F: Fn(&Schema, &Value, &str) -> std::result::Result<Value, BoxError> + Send + Sync,
{
    fn serialize(
        &self,
        schema: &Schema,
        value: &Value,
        root_name: &str,
    ) -> std::result::Result<Value, BoxError> {
        self(schema, value, root_name)
    }
}

/// Serializer that returns the value unchanged.
///
/// Used when a schema is supplied without a registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSerializer;

impl SchemaSerializer for PassthroughSerializer {
    fn serialize(
        &self,
        _schema: &Schema,
        value: &Value,
        _root_name: &str,
    ) -> std::result::Result<Value, BoxError> {
        Ok(value.clone())
    }
}

/// Name given to the body when reporting schema violations.
pub const REQUEST_BODY_ROOT: &str = "requestBody";

/// Body encoding policy for one request.
pub(crate) struct BodyEncoding<'a> {
    pub(crate) is_stream: bool,
    pub(crate) schema: Option<&'a Schema>,
    pub(crate) serializer: &'a dyn SchemaSerializer,
    pub(crate) json_text: bool,
}

impl BodyEncoding<'_> {
    /// Encode `body`, adjusting companion headers.
    ///
    /// Stream mode keeps the body and forces octet-stream with chunked
    /// transfer. Otherwise the schema serializer runs first, then JSON text
    /// encoding unless disabled. Raw bytes and streams skip the schema step.
    pub(crate) fn apply(&self, body: Body, headers: &mut Headers) -> Result<Body> {
        if self.is_stream {
            headers.set_if_absent(names::TRANSFER_ENCODING, "chunked")?;
            headers.set(names::CONTENT_TYPE, ContentType::OctetStream.as_str())?;
            return Ok(body);
        }

        let body = match (self.schema, body) {
            (Some(schema), Body::Json(value)) => Body::Json(self.serialize(schema, &value)?),
            (Some(schema), Body::Text(text)) => {
                Body::Json(self.serialize(schema, &Value::String(text))?)
            }
            (_, body) => body,
        };

        if self.json_text {
            body.into_json_text()
        } else {
            Ok(body)
        }
    }

    fn serialize(&self, schema: &Schema, value: &Value) -> Result<Value> {
        self.serializer
            .serialize(schema, value, REQUEST_BODY_ROOT)
            .map_err(Error::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use futures_util::stream;
    use serde_json::json;

    use super::*;

    fn chunks() -> BodyStream {
        BodyStream::new(stream::iter(vec![Ok::<_, BoxError>(Bytes::from_static(b"chunk"))]))
    }

    fn policy(schema: Option<&Schema>, json_text: bool) -> BodyEncoding<'_> {
        BodyEncoding {
            is_stream: false,
            schema,
            serializer: &PassthroughSerializer,
            json_text,
        }
    }

    #[test]
    fn content_type_as_str() {
        check!(ContentType::Json.as_str() == "application/json; charset=utf-8");
        check!(ContentType::PlainText.as_str() == "text/plain");
        check!(ContentType::OctetStream.to_string() == "application/octet-stream");
    }

    #[test]
    fn json_text_mode_serializes_values() {
        let mut headers = Headers::new();
        let body = policy(None, true)
            .apply(Body::Json(json!({"name": "Alice", "age": 30})), &mut headers)
            .expect("encoded");
        check!(body.as_text() == Some(r#"{"age":30,"name":"Alice"}"#));
        check!(headers.is_empty());
    }

    #[test]
    fn json_text_mode_quotes_text() {
        let body = policy(None, true)
            .apply(Body::from("hello"), &mut Headers::new())
            .expect("encoded");
        check!(body.as_text() == Some(r#""hello""#));
    }

    #[test]
    fn json_text_mode_keeps_bytes() {
        let body = policy(None, true)
            .apply(Body::from(vec![0_u8, 1, 2]), &mut Headers::new())
            .expect("encoded");
        check!(body.as_bytes().map(|b| b.to_vec()) == Some(vec![0, 1, 2]));
    }

    #[test]
    fn raw_mode_passes_through() {
        let body = policy(None, false)
            .apply(Body::Json(json!([1, 2])), &mut Headers::new())
            .expect("encoded");
        check!(body.as_json() == Some(&json!([1, 2])));

        let body = policy(None, false)
            .apply(Body::from("plain"), &mut Headers::new())
            .expect("encoded");
        check!(body.as_text() == Some("plain"));
    }

    #[test]
    fn schema_mode_runs_before_json_text() {
        let schema = Schema::new("User", json!({"type": "object"}));
        let rename = |schema: &Schema, value: &Value, root: &str| -> std::result::Result<Value, BoxError> {
            Ok(json!({"schema": schema.name(), "root": root, "payload": value}))
        };
        let encoding = BodyEncoding {
            is_stream: false,
            schema: Some(&schema),
            serializer: &rename,
            json_text: true,
        };

        let body = encoding
            .apply(Body::Json(json!({"id": 1})), &mut Headers::new())
            .expect("encoded");
        check!(
            body.as_text() == Some(r#"{"payload":{"id":1},"root":"requestBody","schema":"User"}"#)
        );
    }

    #[test]
    fn schema_mode_without_json_text_keeps_value() {
        let schema = Schema::new("Name", json!({"type": "string"}));
        let upper = |_: &Schema, value: &Value, _: &str| -> std::result::Result<Value, BoxError> {
            Ok(Value::String(value.as_str().unwrap_or_default().to_uppercase()))
        };
        let encoding = BodyEncoding {
            is_stream: false,
            schema: Some(&schema),
            serializer: &upper,
            json_text: false,
        };

        let body = encoding
            .apply(Body::from("abc"), &mut Headers::new())
            .expect("encoded");
        check!(body.as_json() == Some(&json!("ABC")));
    }

    #[test]
    fn schema_errors_propagate() {
        let schema = Schema::new("User", json!({"required": ["name"]}));
        let reject = |_: &Schema, _: &Value, root: &str| -> std::result::Result<Value, BoxError> {
            Err(format!("{root}.name cannot be null or undefined.").into())
        };
        let encoding = BodyEncoding {
            is_stream: false,
            schema: Some(&schema),
            serializer: &reject,
            json_text: true,
        };

        let result = encoding.apply(Body::Json(json!({})), &mut Headers::new());
        let_assert!(Err(Error::Serialization(source)) = result);
        check!(source.to_string() == "requestBody.name cannot be null or undefined.");
    }

    #[test]
    fn stream_mode_sets_headers_and_keeps_body() {
        let stream = chunks();
        let mut headers = Headers::try_from_pairs([("content-type", "application/json")])
            .expect("valid");
        let encoding = BodyEncoding {
            is_stream: true,
            schema: None,
            serializer: &PassthroughSerializer,
            json_text: true,
        };

        let body = encoding
            .apply(Body::Stream(stream.clone()), &mut headers)
            .expect("encoded");
        let_assert!(Body::Stream(kept) = body);
        check!(kept.ptr_eq(&stream));
        check!(headers.get("Content-Type") == Some("application/octet-stream"));
        check!(headers.get("transfer-encoding") == Some("chunked"));
    }

    #[test]
    fn stream_mode_keeps_existing_transfer_encoding() {
        let mut headers = Headers::try_from_pairs([("Transfer-Encoding", "gzip, chunked")])
            .expect("valid");
        let encoding = BodyEncoding {
            is_stream: true,
            schema: None,
            serializer: &PassthroughSerializer,
            json_text: true,
        };
        encoding.apply(Body::Stream(chunks()), &mut headers).expect("encoded");
        check!(headers.get("transfer-encoding") == Some("gzip, chunked"));
    }

    #[test]
    fn stream_mode_beats_schema_mode() {
        let schema = Schema::new("User", json!({}));
        let fail = |_: &Schema, _: &Value, _: &str| -> std::result::Result<Value, BoxError> {
            Err("must not run".into())
        };
        let encoding = BodyEncoding {
            is_stream: true,
            schema: Some(&schema),
            serializer: &fail,
            json_text: true,
        };
        let body = encoding
            .apply(Body::Stream(chunks()), &mut Headers::new())
            .expect("encoded");
        check!(body.is_stream());
    }

    #[test]
    fn stream_handle_is_taken_once() {
        let stream = chunks();
        let copy = stream.clone();
        check!(!copy.is_taken());
        check!(stream.take().is_some());
        check!(copy.is_taken());
        check!(copy.take().is_none());
    }

    #[test]
    fn into_bytes() {
        check!(Body::from("a").into_bytes().ok() == Some(Bytes::from_static(b"a")));
        check!(Body::Json(json!([1])).into_bytes().ok() == Some(Bytes::from_static(b"[1]")));
        let_assert!(Err(Error::StreamBody) = Body::Stream(chunks()).into_bytes());
    }

    #[test]
    fn body_json_from_serialize() {
        #[derive(serde::Serialize)]
        struct User {
            name: String,
        }

        let body = Body::json(&User {
            name: "Alice".to_string(),
        })
        .expect("serialize");
        check!(body.as_json() == Some(&json!({"name": "Alice"})));
    }
}
