//! Server configuration.
//!
//! Everything is set in code, before [`Server::serve`](crate::Server::serve)
//! freezes the router. There is no file or environment layer: a service that
//! wants one reads its own settings and passes the result here.
//!
//! ```rust
//! use perch::Config;
//!
//! let config = Config::default()
//!     .strict_routing(true)
//!     .etag(true);
//! ```

/// Routing and response behaviour shared by every request.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub(crate) case_sensitive: bool,
    pub(crate) strict_routing: bool,
    pub(crate) etag: bool,
    pub(crate) etag_weak: bool,
}

impl Config {
    /// When off (the default) `/Users` and `/users` are the same route.
    pub fn case_sensitive(mut self, on: bool) -> Self {
        self.case_sensitive = on;
        self
    }

    /// When off (the default) `/users/` and `/users` are the same route.
    pub fn strict_routing(mut self, on: bool) -> Self {
        self.strict_routing = on;
        self
    }

    /// Attach an `Etag` to every `200 OK` response with a body and answer
    /// matching `If-None-Match` requests with `304 Not Modified`.
    pub fn etag(mut self, on: bool) -> Self {
        self.etag = on;
        self
    }

    /// Emit weak (`W/"…"`) tags instead of strong ones. Implies nothing on
    /// its own; [`etag`](Config::etag) must also be on.
    pub fn etag_weak(mut self, on: bool) -> Self {
        self.etag_weak = on;
        self
    }

    /// Normalises a request path into the form routes are matched against.
    pub(crate) fn detection_path(&self, path: &str) -> String {
        let mut detected = if self.case_sensitive {
            path.to_owned()
        } else {
            path.to_ascii_lowercase()
        };
        if !self.strict_routing {
            while detected.len() > 1 && detected.ends_with('/') {
                detected.pop();
            }
        }
        detected
    }
}
