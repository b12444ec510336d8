//! Outbound request descriptors

use crate::error::Result;
use reqwest::multipart;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Captured outbound request: method, path, query, header overrides, body.
///
/// The descriptor is immutable once handed to the client; every attempt
/// (including the post-refresh retry) assembles a fresh transport request
/// from it, so the rotated Authorization header is picked up without
/// mutating anything already sent.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: RequestBody,
}

impl ApiRequest {
    /// Start a descriptor for a service-relative path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            method,
            path,
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a per-call header override.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart form body. No content-type header is recorded;
    /// the transport sets one with the correct boundary.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Request body variants.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// One part of a multipart form, kept as plain data so the form can be
/// rebuilt for a retry.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub(crate) name: String,
    pub(crate) kind: FormPartKind,
}

#[derive(Debug, Clone)]
pub(crate) enum FormPartKind {
    Text(String),
    File {
        file_name: String,
        mime: String,
        data: Vec<u8>,
    },
}

impl FormPart {
    /// A plain text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FormPartKind::Text(value.into()),
        }
    }

    /// A file field with an explicit content type.
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FormPartKind::File {
                file_name: file_name.into(),
                mime: mime.into(),
                data,
            },
        }
    }
}

/// Build a transport form from part descriptors. Called once per attempt.
pub(crate) fn to_form(parts: &[FormPart]) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for part in parts {
        form = match &part.kind {
            FormPartKind::Text(value) => form.text(part.name.clone(), value.clone()),
            FormPartKind::File {
                file_name,
                mime,
                data,
            } => {
                let piece = multipart::Part::bytes(data.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)?;
                form.part(part.name.clone(), piece)
            }
        };
    }
    Ok(form)
}

/// A request attempt: the descriptor plus the one-shot retried flag.
///
/// The flag lives here rather than on the shared descriptor, so retry state
/// never leaks between logical requests.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Attempt<'a> {
    pub(crate) request: &'a ApiRequest,
    pub(crate) retried: bool,
}

impl<'a> Attempt<'a> {
    pub(crate) fn first(request: &'a ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    pub(crate) fn into_retry(self) -> Self {
        Self {
            retried: true,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_gains_a_leading_slash() {
        let request = ApiRequest::new(Method::GET, "orders");
        assert_eq!(request.path(), "/orders");
    }

    #[test]
    fn builder_collects_query_and_headers() {
        let request = ApiRequest::new(Method::GET, "/orders")
            .query("page", "2")
            .query("status", "pending")
            .header("X-Request-Id", "abc");

        assert_eq!(request.query.len(), 2);
        assert_eq!(
            request.headers,
            vec![("X-Request-Id".to_string(), "abc".to_string())]
        );
    }

    #[test]
    fn json_body_is_captured_as_value() {
        let request = ApiRequest::new(Method::POST, "/orders")
            .json(&json!({ "item": 3 }))
            .unwrap();
        match &request.body {
            RequestBody::Json(value) => assert_eq!(value, &json!({ "item": 3 })),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn retry_flag_is_one_shot() {
        let request = ApiRequest::new(Method::GET, "/orders");
        let attempt = Attempt::first(&request);
        assert!(!attempt.retried);
        assert!(attempt.into_retry().retried);
    }
}
