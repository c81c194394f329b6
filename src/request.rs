//! Incoming HTTP request type.

use std::collections::HashMap;

use crate::header;
use crate::method::Method;
use crate::negotiate;
use crate::response::Response;

/// Path parameters captured by the matched route.
pub type Params = HashMap<String, String>;

/// An incoming HTTP request, with its body fully read.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: Params,
}

impl Request {
    pub(crate) fn from_parts(method: Method, path: &str, headers: Vec<(String, String)>) -> Self {
        Self {
            method,
            path: path.to_owned(),
            headers,
            body: Vec::new(),
            params: Params::new(),
        }
    }

    pub(crate) fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub(crate) fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Picks the media type to answer with from `offers`, best first.
    ///
    /// ```rust,no_run
    /// # use perch::{Request, Response};
    /// async fn report(req: Request) -> Response {
    ///     match req.accepts(&["application/json", "text/csv"]) {
    ///         "text/csv" => Response::text("id,name\n1,alice\n"),
    ///         _ => Response::json(br#"[{"id":1,"name":"alice"}]"#.to_vec()),
    ///     }
    /// }
    /// ```
    ///
    /// See [`negotiate::offer`] for the matching rules; `""` means nothing fits.
    pub fn accepts<'a>(&self, offers: &[&'a str]) -> &'a str {
        self.negotiate(header::ACCEPT, offers)
    }

    pub fn accepts_charsets<'a>(&self, offers: &[&'a str]) -> &'a str {
        self.negotiate(header::ACCEPT_CHARSET, offers)
    }

    pub fn accepts_encodings<'a>(&self, offers: &[&'a str]) -> &'a str {
        self.negotiate(header::ACCEPT_ENCODING, offers)
    }

    pub fn accepts_languages<'a>(&self, offers: &[&'a str]) -> &'a str {
        self.negotiate(header::ACCEPT_LANGUAGE, offers)
    }

    fn negotiate<'a>(&self, name: &str, offers: &[&'a str]) -> &'a str {
        negotiate::offer(self.header(name).unwrap_or(""), offers)
    }

    /// Whether the client's cached copy of `response` is still usable.
    /// See [`conditional::is_fresh`](crate::conditional::is_fresh).
    pub fn is_fresh(&self, response: &Response) -> bool {
        crate::conditional::is_fresh(self, response)
    }

    pub fn is_stale(&self, response: &Response) -> bool {
        !self.is_fresh(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request {
        Request::from_parts(
            Method::Get,
            "/reports",
            headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
        )
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = request(&[("Accept-Language", "de")]);
        assert_eq!(req.header("accept-language"), Some("de"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn accept_family_reads_its_own_header() {
        let req = request(&[
            ("accept", "text/*"),
            ("accept-charset", "utf-8"),
            ("accept-encoding", "br, gzip"),
            ("accept-language", "fr"),
        ]);
        assert_eq!(req.accepts(&["application/json", "text/csv"]), "text/csv");
        assert_eq!(req.accepts_charsets(&["utf-8", "latin1"]), "utf-8");
        assert_eq!(req.accepts_encodings(&["gzip", "br"]), "br");
        assert_eq!(req.accepts_languages(&["en", "fr-CA"]), "fr-CA");
    }

    #[test]
    fn missing_accept_header_takes_the_first_offer() {
        assert_eq!(request(&[]).accepts(&["application/json", "text/csv"]), "application/json");
    }

    #[test]
    fn params_are_exposed_by_name() {
        let mut params = Params::new();
        params.insert("id".to_owned(), "42".to_owned());
        let req = request(&[]).with_params(params).with_body(b"x".to_vec());
        assert_eq!(req.param("id"), Some("42"));
        assert_eq!(req.param("name"), None);
        assert_eq!(req.body(), b"x");
    }
}
