//! HTTP method as a closed, indexable enum.
//!
//! The route table keeps one slot per method, so every method needs a stable
//! index. The discriminant *is* the index: `Method::Get as usize == 0`, and
//! [`Method::ALL`] maps it back. Anything outside this set fails to parse and
//! is answered with `501 Not Implemented` before it reaches the router.

use std::fmt;
use std::str::FromStr;

/// A known HTTP method. Declaration order defines the table index and the
/// order methods appear in an `Allow` header.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Method {
    Get,     // RFC 9110 §9.3.1
    Head,    // RFC 9110 §9.3.2
    Post,    // RFC 9110 §9.3.3
    Put,     // RFC 9110 §9.3.4
    Delete,  // RFC 9110 §9.3.5
    Connect, // RFC 9110 §9.3.6
    Options, // RFC 9110 §9.3.7
    Trace,   // RFC 9110 §9.3.8
    Patch,   // RFC 5789
}

impl Method {
    /// Every known method, in index order.
    pub const ALL: [Method; 9] = [
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Connect,
        Self::Options,
        Self::Trace,
        Self::Patch,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of this method in the route table.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Delete  => "DELETE",
            Self::Connect => "CONNECT",
            Self::Options => "OPTIONS",
            Self::Trace   => "TRACE",
            Self::Patch   => "PATCH",
        }
    }
}

/// Returned when a request line carries a method outside [`Method::ALL`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown method `{}`", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get     => http::Method::GET,
            Method::Head    => http::Method::HEAD,
            Method::Post    => http::Method::POST,
            Method::Put     => http::Method::PUT,
            Method::Delete  => http::Method::DELETE,
            Method::Connect => http::Method::CONNECT,
            Method::Options => http::Method::OPTIONS,
            Method::Trace   => http::Method::TRACE,
            Method::Patch   => http::Method::PATCH,
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = UnknownMethod;

    fn try_from(m: &http::Method) -> Result<Self, Self::Error> {
        m.as_str().parse()
    }
}
