//! Locates the raw access token in an inbound request.
//!
//! Only presence and the optional `Bearer` marker are handled here. Whether the
//! token is well-formed and trusted is decided later by the verifier.

use axum::http::{HeaderMap, Request, Uri, request::Parts};

const BEARER: &str = "Bearer";

/// Minimal view of a request needed to find a token.
pub trait RequestView {
    fn has_header(&self, name: &str) -> bool;

    /// Every value of header `name` in received order.
    /// Values that are not visible ASCII are reported as `""`.
    fn header_values(&self, name: &str) -> Vec<&str>;

    /// URL-decoded query parameter. Present-but-empty is `Some("")`.
    fn query_param(&self, name: &str) -> Option<String>;
}

fn header_values<'a>(headers: &'a HeaderMap, name: &str) -> Vec<&'a str> {
    headers
        .get_all(name)
        .iter()
        .map(|v| v.to_str().unwrap_or_default())
        .collect()
}

fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

impl<B> RequestView for Request<B> {
    fn has_header(&self, name: &str) -> bool {
        self.headers().contains_key(name)
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        header_values(self.headers(), name)
    }

    fn query_param(&self, name: &str) -> Option<String> {
        query_param(self.uri(), name)
    }
}

impl RequestView for Parts {
    fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        header_values(&self.headers, name)
    }

    fn query_param(&self, name: &str) -> Option<String> {
        query_param(&self.uri, name)
    }
}

/// How the header channel treats values without a `Bearer` marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderScheme {
    /// Strip the marker when present, pass anything else through as-is
    /// (`Basic xyz` is handed to the verifier and fails there).
    #[default]
    Optional,
    /// Only `Bearer <token>` values count; anything else is "not found".
    Required,
}

pub trait TokenSource: Send + Sync {
    /// Cheap presence check. Never parses the token.
    fn supports(&self, request: &dyn RequestView) -> bool;

    /// Raw token, or `""` when nothing usable was found.
    fn extract(&self, request: &dyn RequestView) -> String;
}

/// Reads the token from a header first, then from a query parameter.
///
/// An empty channel name disables that channel entirely.
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    header: String,
    parameter: String,
    scheme: HeaderScheme,
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self::new("authorization", "token")
    }
}

impl TokenExtractor {
    pub fn new(header: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            parameter: parameter.into(),
            scheme: HeaderScheme::Optional,
        }
    }

    pub fn with_scheme(mut self, scheme: HeaderScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn scheme(&self) -> HeaderScheme {
        self.scheme
    }

    fn first_header<'a>(&self, request: &'a dyn RequestView) -> Option<&'a str> {
        if self.header.is_empty() {
            return None;
        }

        request.header_values(&self.header).into_iter().next()
    }

    fn from_header(&self, request: &dyn RequestView) -> String {
        let Some(value) = self.first_header(request) else {
            return String::new();
        };

        let token = match (strip_bearer(value), self.scheme) {
            (Some(token), _) => token,
            (None, HeaderScheme::Optional) => value,
            (None, HeaderScheme::Required) => return String::new(),
        };

        token.trim().to_owned()
    }

    fn from_query(&self, request: &dyn RequestView) -> String {
        if self.parameter.is_empty() {
            return String::new();
        }

        request.query_param(&self.parameter).unwrap_or_default()
    }
}

impl TokenSource for TokenExtractor {
    fn supports(&self, request: &dyn RequestView) -> bool {
        let in_header = !self.header.is_empty()
            && match self.scheme {
                HeaderScheme::Optional => request.has_header(&self.header),
                HeaderScheme::Required => self
                    .first_header(request)
                    .is_some_and(|value| strip_bearer(value).is_some()),
            };

        if in_header {
            return true;
        }

        !self.parameter.is_empty() && request.query_param(&self.parameter).is_some()
    }

    fn extract(&self, request: &dyn RequestView) -> String {
        let token = self.from_header(request);
        if !token.is_empty() {
            return token;
        }

        self.from_query(request)
    }
}

/// Returns what follows a leading `Bearer<whitespace>` marker (case-insensitive).
fn strip_bearer(value: &str) -> Option<&str> {
    let value = value.trim_start();
    let (scheme, rest) = value.split_at_checked(BEARER.len())?;

    if !scheme.eq_ignore_ascii_case(BEARER) {
        return None;
    }

    rest.starts_with(char::is_whitespace).then_some(rest)
}
