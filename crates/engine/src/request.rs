//! Per-request decoration hook.
//!
//! Before each network request an engine issues, it runs its configured
//! decorators over a [`RequestMeta`]. The host uses this to inject an
//! authorization header and, for engines that support it, to suggest a
//! chunk size derived from observed throughput.

/// Mutable view of an outgoing request, exposed to decorators.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    headers: Vec<(String, String)>,
    suggested_chunk_size: Option<u64>,
}

impl RequestMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing any previous value for the same name
    /// (case-insensitive).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers
            .retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Looks up a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Suggests a chunk size for this request. Engines configured with a
    /// static chunk size are free to ignore it.
    pub fn suggest_chunk_size(&mut self, bytes: u64) {
        self.suggested_chunk_size = Some(bytes);
    }

    pub fn suggested_chunk_size(&self) -> Option<u64> {
        self.suggested_chunk_size
    }
}

/// Hook invoked before each request an engine issues.
pub trait RequestDecorator: Send + Sync {
    fn decorate(&self, req: &mut RequestMeta);
}

/// Adds an `Authorization: Bearer <token>` header to every request.
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl RequestDecorator for BearerAuth {
    fn decorate(&self, req: &mut RequestMeta) {
        req.set_header("Authorization", format!("Bearer {}", self.token));
    }
}
