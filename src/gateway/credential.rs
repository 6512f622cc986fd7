//! Credential propagation.

use std::fmt;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Header carrying the password, both from the client and to the backend.
pub const PASSWORD_HEADER: HeaderName = HeaderName::from_static("x-password");

/// The opaque password a client sent, passed to the backend byte for byte.
///
/// Never validated here. `Debug` only reveals whether a value is present.
#[derive(Clone, Default)]
pub struct Credential(Option<HeaderValue>);

impl Credential {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(headers.get(PASSWORD_HEADER).cloned())
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Copy the credential onto an outgoing request. Absent stays absent.
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.0 {
            Some(value) => request.header(PASSWORD_HEADER, value.clone()),
            None => request,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Credential(<redacted>)"),
            None => f.write_str("Credential(None)"),
        }
    }
}
